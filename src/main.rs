use clap::Parser;
use colored::Colorize;
use log::LevelFilter;
use std::process::ExitCode;

use lsb_stream::{
    cli::{Cli, Commands},
    handler::{exit_code_for, handle_capacity, handle_hide, handle_recover},
};

/// 根据 `-v` 的次数设置日志级别，`RUST_LOG` 可以进一步覆盖。
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据指定的子命令（`hide`、`recover` 或 `capacity`）
/// 将执行分派到相应的处理函数。失败时按错误类型返回不同的退出码。
fn main() -> ExitCode {
    // 解析命令行参数
    let cli = Cli::parse();
    init_logger(cli.verbose);

    // 根据子命令调用相应的处理函数
    let result = match cli.command {
        Commands::Hide(args) => handle_hide(args),
        Commands::Recover(args) => handle_recover(args),
        Commands::Capacity(args) => handle_capacity(args).map(|_| ()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:?}", "Error:".red().bold(), err);
            ExitCode::from(exit_code_for(&err))
        }
    }
}
