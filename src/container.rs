//! # 图像容器模块
//!
//! 负责在图像文件与 `PixelBuffer` 之间转换。读取时保留原始采样字节，
//! 不做任何色彩空间或位深转换；写回时使用相同的颜色类型与尺寸，保证每个字节逐位不变。
//! 只启用了无损格式 (PNG, BMP, TIFF, WebP 无损, QOI)，有损重压缩会破坏隐藏的数据。

use crate::error::ContainerError;
use crate::pixel_buffer::PixelBuffer;
use crate::steganography::Capacity;
use image::{
    ColorType, DynamicImage, ExtendedColorType, ImageDecoder, ImageError, ImageFormat, ImageReader,
};
use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// 仅从文件头读取的图像参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
    pub color: ColorType,
    pub format: ImageFormat,
}

impl ImageHeader {
    /// 每行的像素字节数。
    pub fn row_bytes(&self) -> u64 {
        u64::from(self.width) * u64::from(self.color.bytes_per_pixel())
    }

    pub fn capacity(&self) -> Capacity {
        Capacity::of(u64::from(self.height), self.row_bytes())
    }
}

/// 已解码的载体图像：像素缓冲区以及写回所需的格式参数。
#[derive(Debug, Clone)]
pub struct CoverImage {
    header: ImageHeader,
    buffer: PixelBuffer,
}

fn open_reader(path: &Path) -> Result<ImageReader<BufReader<File>>, ContainerError> {
    let load = |err| ContainerError::Load {
        path: path.to_path_buf(),
        source: ImageError::IoError(err),
    };

    ImageReader::open(path)
        .map_err(load)?
        .with_guessed_format()
        .map_err(load)
}

/// 打开解码器并读取文件头。
///
/// 解码器会展开调色板、低于 8 位的灰度以及 tRNS 透明色，展开后的字节不是文件中的原始采样，
/// 写回时也无法恢复原来的颜色类型与位深，因此这类图像被拒绝。
fn open_decoder(path: &Path) -> Result<(ImageHeader, impl ImageDecoder), ContainerError> {
    let reader = open_reader(path)?;
    let format = reader.format().ok_or_else(|| ContainerError::UnknownFormat {
        path: path.to_path_buf(),
    })?;

    let decoder = reader.into_decoder().map_err(|source| ContainerError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    let (width, height) = decoder.dimensions();
    let color = decoder.color_type();

    let expanded = decoder.original_color_type() != ExtendedColorType::from(color);
    if expanded || matches!(color, ColorType::Rgb32F | ColorType::Rgba32F) {
        return Err(ContainerError::UnsupportedLayout {
            path: path.to_path_buf(),
        });
    }

    let header = ImageHeader {
        width,
        height,
        color,
        format,
    };
    Ok((header, decoder))
}

/// 16 位采样在内存中按本机字节序存放，文件中按大端序存放。
fn is_wide(color: ColorType) -> bool {
    color.bytes_per_pixel() == 2 * color.channel_count()
}

/// 在本机字节序与大端序 (文件顺序) 之间转换每个 16 位采样，转换是自反的。
fn swap_to_file_order(bytes: &mut [u8]) {
    for sample in bytes.chunks_exact_mut(2) {
        let value = u16::from_ne_bytes([sample[0], sample[1]]);
        sample.copy_from_slice(&value.to_be_bytes());
    }
}

/// 只读取图像文件头，不解码像素数据。
///
/// # Errors
///
/// 文件无法打开、格式无法识别、文件头损坏，或者采样无法逐字节写回时返回加载错误。
pub fn probe(path: &Path) -> Result<ImageHeader, ContainerError> {
    open_decoder(path).map(|(header, _)| header)
}

impl CoverImage {
    /// 打开并完整解码一幅图像。
    ///
    /// 16 位采样按文件中的大端字节顺序排列，与其他读取原始扫描行的工具一致。
    ///
    /// # Errors
    ///
    /// * 文件无法打开、格式无法识别或像素数据损坏。
    /// * 图像使用浮点采样，或解码时会展开调色板、低位深或透明色。
    pub fn open(path: &Path) -> Result<Self, ContainerError> {
        let (header, decoder) = open_decoder(path)?;

        let image = DynamicImage::from_decoder(decoder).map_err(|source| ContainerError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let mut bytes = image.into_bytes();
        if is_wide(header.color) {
            swap_to_file_order(&mut bytes);
        }

        let buffer =
            PixelBuffer::from_raw(header.height as usize, header.row_bytes() as usize, bytes)
                .map_err(|_| ContainerError::UnsupportedLayout {
                    path: path.to_path_buf(),
                })?;

        Ok(Self { header, buffer })
    }

    pub fn header(&self) -> &ImageHeader {
        &self.header
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    /// 以原始颜色类型与尺寸写回图像。
    ///
    /// 输出格式由 `path` 的扩展名决定，无法识别时沿用输入图像的格式。
    ///
    /// # Errors
    ///
    /// 目标格式不支持该颜色类型或写入文件失败时返回 `ContainerError::Save`。
    pub fn save(&self, path: &Path) -> Result<(), ContainerError> {
        let format = ImageFormat::from_path(path).unwrap_or(self.header.format);

        let mut bytes = Cow::Borrowed(self.buffer.as_bytes());
        if is_wide(self.header.color) {
            swap_to_file_order(bytes.to_mut());
        }

        image::save_buffer_with_format(
            path,
            &bytes,
            self.header.width,
            self.header.height,
            self.header.color,
            format,
        )
        .map_err(|source| ContainerError::Save {
            path: path.to_path_buf(),
            source,
        })
    }
}
