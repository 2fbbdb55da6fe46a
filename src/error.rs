//! # 错误类型模块
//!
//! 定义隐写核心 (`StegoError`) 与图像容器层 (`ContainerError`) 的错误。
//! 应用层通过 `anyhow` 包装这些错误，并在 `main` 中据此选择退出码。

use std::path::PathBuf;
use thiserror::Error;

/// 隐写核心与像素缓冲区产生的错误。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StegoError {
    /// 负载加上结束标记超出了图像可用的位数。
    #[error(
        "Not enough space in the image: wrote {written} of the payload bytes before running out, capacity is {capacity} bytes including the terminator"
    )]
    OutOfSpace { written: usize, capacity: u64 },

    /// 原始像素数据的长度与 `height * row_bytes` 不一致。
    #[error("Pixel data holds {actual} bytes but {expected} were expected")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// `height * row_bytes` 无法用 `usize` 表示。
    #[error("A buffer of {height} rows of {row_bytes} bytes does not fit in memory")]
    DimensionsOverflow { height: usize, row_bytes: usize },

    /// 某一行的长度与第一行不同。
    #[error("Row {row} holds {actual} bytes but every row must hold {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// 加载或保存图像文件时产生的错误。
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Cannot load image {}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot save image {}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot recognise the image format of {}", path.display())]
    UnknownFormat { path: PathBuf },

    /// 图像的采样格式无法逐字节无损写回 (浮点采样，或解码时被展开的调色板、低位深与透明色)。
    #[error(
        "Image {} uses a sample layout that cannot be written back losslessly",
        path.display()
    )]
    UnsupportedLayout { path: PathBuf },
}

impl ContainerError {
    /// 错误是否发生在读取阶段。
    pub fn is_load(&self) -> bool {
        matches!(
            self,
            Self::Load { .. } | Self::UnknownFormat { .. } | Self::UnsupportedLayout { .. }
        )
    }
}
