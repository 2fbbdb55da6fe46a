//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，把字节流逐位隐藏在无损格式图像 (如 PNG, BMP) 的每个像素字节中。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，把字节流逐位隐藏在无损格式图像 (如 PNG, BMP) 的每个像素字节中。\n隐藏的数据以 0 字节结束，因此数据本身不能包含 0 字节。"
)]
pub struct Cli {
    /// 输出更详细的日志 (-v, -vv, -vvv)。也可以通过 RUST_LOG 环境变量控制。
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏)、recover (恢复) 和 capacity (容量)。
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 把数据隐藏到图像中并保存为新图像。
    Hide(HideArgs),

    /// 从经过隐写的图像中恢复隐藏的数据。
    Recover(RecoverArgs),

    /// 显示图像可以隐藏的字节数。
    Capacity(CapacityArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Args, Debug)]
pub struct HideArgs {
    /// 用于隐写的输入图像文件路径 (如 PNG, BMP)。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 直接在命令行上给出要隐藏的数据。
    #[arg(short, long, conflicts_with = "text")]
    pub data: Option<String>,

    /// 要隐藏的数据所在的文件路径。既没有 --data 也没有 --text 时从标准输入读取。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 隐写完成后保存结果图像的路径。默认为输入图像旁的 `doctored_<文件名>`。
    #[arg(short = 'o', long)]
    pub dest: Option<PathBuf>,

    /// 目标文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Args, Debug)]
pub struct RecoverArgs {
    /// 已隐藏数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 保存恢复数据的文件路径。省略时输出到标准输出。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 目标文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Args, Debug)]
pub struct CapacityArgs {
    /// 要查询容量的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,
}
