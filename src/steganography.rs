//! # 隐写核心模块
//!
//! 在像素缓冲区每个字节的最低有效位中逐位写入或读取字节流。
//!
//! 遍历顺序：字节内按 MSB 优先 (`128, 64, ..., 1`)，像素字节按列前进，行尾换行。
//! 数据流以一个值为 0 的字节结束，因此负载本身不能包含 0 字节。

use crate::constants::{BITS_PER_BYTE, FIRST_BIT_MASK, PERTURB_DOWN_ABOVE, TERMINATOR};
use crate::error::StegoError;
use crate::pixel_buffer::PixelBuffer;
use std::iter::FusedIterator;

/// 图像的隐写容量。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    /// 可用的总位数 (`height * row_bytes`)。
    pub total_bits: u128,
    /// 可以完整写入的字节数，包含结束标记。
    pub bytes: u64,
    /// 凑不满一个字节的剩余位数。
    pub spare_bits: u8,
}

impl Capacity {
    pub fn of(height: u64, row_bytes: u64) -> Self {
        let total_bits = u128::from(height) * u128::from(row_bytes);
        Self {
            total_bits,
            bytes: capacity(height, row_bytes),
            spare_bits: (total_bits % u128::from(BITS_PER_BYTE)) as u8,
        }
    }

    pub fn of_buffer(buffer: &PixelBuffer) -> Self {
        Self::of(buffer.height() as u64, buffer.row_bytes() as u64)
    }

    /// 扣除结束标记后实际可写入的负载字节数，为 0 表示没有可用空间。
    pub fn usable(&self) -> u64 {
        self.bytes.saturating_sub(1)
    }
}

/// 计算 `floor(height * row_bytes / 8)`。
///
/// 乘积以 `u128` 计算，任何输入都不会溢出；结果不扣除结束标记所需的 1 字节。
pub fn capacity(height: u64, row_bytes: u64) -> u64 {
    let bytes = u128::from(height) * u128::from(row_bytes) / u128::from(BITS_PER_BYTE);
    u64::try_from(bytes).unwrap_or(u64::MAX)
}

/// 编码/解码的进度：当前像素字节的位置以及当前写入字节中的位。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BitCursor {
    row: usize,
    column: usize,
    mask: u8,
}

impl BitCursor {
    fn new() -> Self {
        Self {
            row: 0,
            column: 0,
            mask: FIRST_BIT_MASK,
        }
    }

    /// 前进一个像素字节。返回 `true` 表示刚好完成了一个完整的字节。
    fn advance(&mut self, row_bytes: usize) -> bool {
        self.column += 1;
        if self.column == row_bytes {
            self.column = 0;
            self.row += 1;
        }

        self.mask >>= 1;
        if self.mask == 0 {
            self.mask = FIRST_BIT_MASK;
            return true;
        }
        false
    }

    fn cells_consumed(&self, row_bytes: usize) -> u64 {
        (self.row as u64) * (row_bytes as u64) + self.column as u64
    }
}

/// 以最小扰动把像素字节的奇偶性改为 `bit`。
///
/// 大于 127 的值减 1，否则加 1，因此 0 与 255 都不会越界。
fn embed_bit(cell: &mut u8, bit: bool) {
    if (*cell & 1 == 1) != bit {
        if *cell > PERTURB_DOWN_ABOVE {
            *cell -= 1;
        } else {
            *cell += 1;
        }
    }
}

/// 将字节流写入缓冲区的最低有效位，并在其后写入结束标记。
///
/// `payload` 可以是任意迭代器：迭代结束等同于读到 0。读到 0 字节
/// (无论来自负载还是迭代结束) 并完整写入后立即返回，其后的数据不会被读取。
///
/// 返回写入的负载字节数，不含结束标记。
///
/// # Errors
///
/// 如果在写完当前字节 (包括结束标记) 之前像素字节已经用尽，
/// 返回 `StegoError::OutOfSpace`。此时缓冲区已被部分修改，调用方应丢弃它。
pub fn encode<I>(buffer: &mut PixelBuffer, payload: I) -> Result<usize, StegoError>
where
    I: IntoIterator<Item = u8>,
{
    let row_bytes = buffer.row_bytes();
    let capacity = Capacity::of_buffer(buffer).bytes;
    let mut source = payload.into_iter();
    let mut cursor = BitCursor::new();
    let mut written = 0;

    loop {
        let byte = source.next().unwrap_or(TERMINATOR);

        loop {
            let cell = buffer
                .cell_mut(cursor.row, cursor.column)
                .ok_or(StegoError::OutOfSpace { written, capacity })?;
            embed_bit(cell, byte & cursor.mask != 0);

            if cursor.advance(row_bytes) {
                break;
            }
        }

        if byte == TERMINATOR {
            return Ok(written);
        }
        written += 1;
    }
}

/// 从缓冲区的最低有效位中惰性读取字节流。
///
/// 每次调用都从缓冲区开头重新开始。
pub fn decode(buffer: &PixelBuffer) -> Decoder<'_> {
    Decoder {
        buffer,
        cursor: BitCursor::new(),
        finished: false,
    }
}

/// `decode` 返回的迭代器。
///
/// 读到结束标记 (不输出) 或缓冲区耗尽时停止；末尾不足 8 位的部分被丢弃。
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    buffer: &'a PixelBuffer,
    cursor: BitCursor,
    finished: bool,
}

impl Iterator for Decoder<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.finished {
            return None;
        }

        let row_bytes = self.buffer.row_bytes();
        let mut byte = 0u8;

        loop {
            let Some(cell) = self.buffer.cell(self.cursor.row, self.cursor.column) else {
                self.finished = true;
                return None;
            };
            if cell % 2 == 1 {
                byte |= self.cursor.mask;
            }

            if self.cursor.advance(row_bytes) {
                break;
            }
        }

        if byte == TERMINATOR {
            self.finished = true;
            return None;
        }
        Some(byte)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        let remaining = self
            .buffer
            .total_bits()
            .saturating_sub(self.cursor.cells_consumed(self.buffer.row_bytes()))
            / BITS_PER_BYTE;
        (0, usize::try_from(remaining).ok())
    }
}

impl FusedIterator for Decoder<'_> {}
