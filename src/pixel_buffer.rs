//! # 像素缓冲区模块
//!
//! `PixelBuffer` 以一段连续内存按行存储解码后的像素字节，
//! 每行恰好 `row_bytes` 个字节，通过行跨距定位。

use crate::error::StegoError;

/// 行优先存储的像素字节缓冲区。
///
/// 构造后 `height` 与 `row_bytes` 固定不变，所有行长度相同。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    height: usize,
    row_bytes: usize,
}

impl PixelBuffer {
    /// 创建一个全零的缓冲区。
    ///
    /// # Errors
    ///
    /// `height * row_bytes` 超出 `usize` 时返回 `StegoError::DimensionsOverflow`。
    pub fn new(height: usize, row_bytes: usize) -> Result<Self, StegoError> {
        let len = height
            .checked_mul(row_bytes)
            .ok_or(StegoError::DimensionsOverflow { height, row_bytes })?;

        Ok(Self {
            data: vec![0; len],
            height,
            row_bytes,
        })
    }

    /// 由连续的原始字节创建缓冲区。
    ///
    /// # Errors
    ///
    /// 如果 `data.len()` 不等于 `height * row_bytes`，返回 `StegoError::BufferSizeMismatch`。
    pub fn from_raw(height: usize, row_bytes: usize, data: Vec<u8>) -> Result<Self, StegoError> {
        let expected = height
            .checked_mul(row_bytes)
            .ok_or(StegoError::DimensionsOverflow { height, row_bytes })?;

        if data.len() != expected {
            return Err(StegoError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            height,
            row_bytes,
        })
    }

    /// 由逐行的字节序列创建缓冲区，`row_bytes` 取自第一行。
    ///
    /// # Errors
    ///
    /// 任意一行长度与第一行不同时返回 `StegoError::RaggedRows`。
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, StegoError> {
        let row_bytes = rows.first().map_or(0, |row| row.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * row_bytes);

        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != row_bytes {
                return Err(StegoError::RaggedRows {
                    row: index,
                    expected: row_bytes,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            data,
            height: rows.len(),
            row_bytes,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    /// 缓冲区中可用于隐写的总位数 (每个字节 1 bit)。
    pub fn total_bits(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn row(&self, row: usize) -> Option<&[u8]> {
        if row >= self.height {
            return None;
        }
        let start = row * self.row_bytes;
        Some(&self.data[start..start + self.row_bytes])
    }

    pub fn row_mut(&mut self, row: usize) -> Option<&mut [u8]> {
        if row >= self.height {
            return None;
        }
        let start = row * self.row_bytes;
        Some(&mut self.data[start..start + self.row_bytes])
    }

    /// 按顺序遍历所有行。
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks_exact 不接受 0，空行的缓冲区没有任何字节可遍历
        self.data
            .chunks_exact(self.row_bytes.max(1))
            .take(self.height)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<u8> {
        if column >= self.row_bytes {
            return None;
        }
        self.row(row).map(|r| r[column])
    }

    pub fn cell_mut(&mut self, row: usize, column: usize) -> Option<&mut u8> {
        if column >= self.row_bytes {
            return None;
        }
        self.row_mut(row).map(|r| &mut r[column])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}
