//! # lsb_stream 库
//!
//! 本库包含 LSB 隐写工具的核心逻辑：把以 0 字节结束的字节流逐位写入
//! 无损图像每个像素字节的最低有效位，并在之后恢复。

// 声明库包含的所有模块。

pub mod cli;
pub mod constants;
pub mod container;
pub mod error;
pub mod handler;
pub mod pixel_buffer;
pub mod steganography;
