//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心隐写算法以及向用户报告结果。

use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::constants::{DOCTORED_PREFIX, TERMINATOR, exit_code};
use crate::container::{self, CoverImage};
use crate::error::{ContainerError, StegoError};
use crate::steganography::{Capacity, decode, encode};
use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, info, warn};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 读取图像与待隐藏的数据、把数据写入像素字节的最低有效位，
/// 最后以相同的格式参数保存结果图像。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取输入的图像或数据。
/// * 图像没有足够的空间来容纳数据和结束标记。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args.dest.clone().unwrap_or_else(|| default_dest(&args.image));
    ensure_writable(&dest, args.force)?;

    let mut cover = CoverImage::open(&args.image)?;
    let capacity = Capacity::of_buffer(cover.buffer());
    debug!(
        "loaded {}: {}x{} {:?}, {} bytes per row",
        args.image.display(),
        cover.header().width,
        cover.header().height,
        cover.header().color,
        cover.buffer().row_bytes()
    );

    let payload = read_payload(&args)?;
    if let Some(offset) = payload.iter().position(|&byte| byte == TERMINATOR) {
        warn!(
            "payload contains a zero byte at offset {offset}; only the first {offset} bytes will be recoverable"
        );
    }
    info!(
        "hiding {} bytes, usable capacity is {} bytes",
        payload.len(),
        capacity.usable()
    );

    let written = encode(cover.buffer_mut(), payload.iter().copied()).with_context(|| {
        format!(
            "Failed to hide {} bytes in {}. \nThe image can hold at most {} bytes.",
            payload.len().to_string().red().bold(),
            args.image.to_string_lossy().red().bold(),
            capacity.usable().to_string().green().bold()
        )
    })?;
    debug!("wrote {written} payload bytes and the terminator");

    cover.save(&dest)?;

    println!(
        "{} bytes have been successfully hidden and saved: {}",
        written.to_string().green().bold(),
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 读取经过隐写的图像，从像素字节的最低有效位中恢复数据，直到遇到结束标记或图像末尾。
/// 指定了 `--text` 时写入文件，否则原样写到标准输出。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件。
/// * 目标文件已存在且未指定 `--force`。
/// * 无法写入到目标文件或标准输出。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    if let Some(text) = &args.text {
        ensure_writable(text, args.force)?;
    }

    let cover = CoverImage::open(&args.image)?;
    let data: Vec<u8> = decode(cover.buffer()).collect();
    info!(
        "recovered {} bytes from {}",
        data.len(),
        args.image.display()
    );

    match &args.text {
        Some(text) => {
            fs::write(text, &data).with_context(|| {
                format!(
                    "Unable to write to target text file: {}",
                    text.to_string_lossy().red().bold()
                )
            })?;

            println!(
                "The data has been successfully recovered and saved: {}",
                text.to_string_lossy().green().bold()
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&data)
                .and_then(|()| stdout.flush())
                .context("Unable to write the recovered data to standard output")?;
        }
    }

    Ok(())
}

/// 处理 'Capacity' 命令的执行逻辑。
///
/// 只读取图像文件头，报告可以隐藏的字节数、扣除结束标记后的可用字节数以及多余的位数。
///
/// # Errors
///
/// 无法读取图像文件或文件头损坏时返回错误。
pub fn handle_capacity(args: CapacityArgs) -> Result<Capacity> {
    let header = container::probe(&args.image)?;
    let capacity = header.capacity();
    debug!(
        "probed {}: {}x{} {:?}, {} bytes per row",
        args.image.display(),
        header.width,
        header.height,
        header.color,
        header.row_bytes()
    );

    println!(
        "Capacity: {} bytes, {} spare bits",
        capacity.bytes.to_string().green().bold(),
        capacity.spare_bits
    );
    println!(
        "Usable payload: {} bytes (one byte is reserved for the terminator)",
        capacity.usable().to_string().green().bold()
    );

    Ok(capacity)
}

/// 根据错误链选择进程退出码。
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(StegoError::OutOfSpace { .. }) = cause.downcast_ref::<StegoError>() {
            return exit_code::OUT_OF_SPACE;
        }
        if let Some(failure) = cause.downcast_ref::<ContainerError>() {
            return if failure.is_load() {
                exit_code::LOAD_FAILED
            } else {
                exit_code::SAVE_FAILED
            };
        }
    }
    exit_code::FAILURE
}

/// 输入图像旁的 `doctored_<文件名>`。
fn default_dest(image: &Path) -> PathBuf {
    let file_name = image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    image.with_file_name(format!("{DOCTORED_PREFIX}{file_name}"))
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 依次从 `--data`、`--text` 文件或标准输入读取待隐藏的数据。
fn read_payload(args: &HideArgs) -> Result<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }

    if let Some(text) = &args.text {
        return fs::read(text).with_context(|| {
            format!(
                "Unable to read text file: {}",
                text.to_string_lossy().red().bold()
            )
        });
    }

    let mut payload = Vec::new();
    io::stdin()
        .lock()
        .read_to_end(&mut payload)
        .context("Unable to read the data to hide from standard input")?;
    Ok(payload)
}
