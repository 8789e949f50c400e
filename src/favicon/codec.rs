//! # 外部协作者模块
//!
//! ## 设计思路
//!
//! 核心链路只依赖两个窄接口：
//! - `RasterCodec`：RGBA 像素 → PNG 载荷
//! - `ArchiveWriter`：多个命名缓冲 → 单个归档缓冲
//!
//! 默认实现分别基于 `image` 与 `zip`；测试可注入固定字节的桩实现。
//! 两者都要求 `Send + Sync`，以便多尺寸并行时跨线程共享。

use std::io::{Cursor, Write};
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};

use super::FaviconError;

/// 像素编码协作者。
pub trait RasterCodec: Send + Sync {
    /// 将 `width x height` 的 RGBA8 像素编码为 PNG 字节。
    fn encode_png(&self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FaviconError>;
}

/// 归档协作者。
pub trait ArchiveWriter: Send + Sync {
    /// 将命名缓冲按给定顺序打包为单个归档。
    fn bundle(&self, files: &[NamedBuffer]) -> Result<Vec<u8>, FaviconError>;
}

impl<T: RasterCodec + ?Sized> RasterCodec for &T {
    fn encode_png(&self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FaviconError> {
        (**self).encode_png(pixels, width, height)
    }
}

impl<T: RasterCodec + ?Sized> RasterCodec for Arc<T> {
    fn encode_png(&self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FaviconError> {
        (**self).encode_png(pixels, width, height)
    }
}

impl<T: ArchiveWriter + ?Sized> ArchiveWriter for &T {
    fn bundle(&self, files: &[NamedBuffer]) -> Result<Vec<u8>, FaviconError> {
        (**self).bundle(files)
    }
}

impl<T: ArchiveWriter + ?Sized> ArchiveWriter for Arc<T> {
    fn bundle(&self, files: &[NamedBuffer]) -> Result<Vec<u8>, FaviconError> {
        (**self).bundle(files)
    }
}

/// 带文件名的输出缓冲。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBuffer {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// 基于 `image` crate 的 PNG 编码器。
#[derive(Debug, Clone, Copy)]
pub struct PngCodec {
    compression: CompressionType,
}

impl PngCodec {
    pub fn new(compression: CompressionType) -> Self {
        Self { compression }
    }
}

impl Default for PngCodec {
    fn default() -> Self {
        Self::new(CompressionType::Default)
    }
}

impl RasterCodec for PngCodec {
    fn encode_png(&self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FaviconError> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(FaviconError::CodecFailure(format!(
                "像素缓冲长度异常：{}（期望：{}）",
                pixels.len(),
                expected
            )));
        }

        let mut cursor = Cursor::new(Vec::new());
        let encoder = PngEncoder::new_with_quality(&mut cursor, self.compression, PngFilter::Adaptive);
        encoder
            .write_image(pixels, width, height, ExtendedColorType::Rgba8)
            .map_err(|e| FaviconError::CodecFailure(format!("PNG 编码失败：{}", e)))?;
        Ok(cursor.into_inner())
    }
}

/// 基于 `zip` crate 的归档写入器（deflate）。
#[derive(Debug, Clone, Copy)]
pub struct ZipArchiveWriter {
    compression_level: i64,
}

impl ZipArchiveWriter {
    pub fn new(compression_level: i64) -> Self {
        Self {
            compression_level: compression_level.clamp(0, 9),
        }
    }
}

impl Default for ZipArchiveWriter {
    fn default() -> Self {
        Self::new(6)
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    fn bundle(&self, files: &[NamedBuffer]) -> Result<Vec<u8>, FaviconError> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(self.compression_level));

        for file in files {
            writer
                .start_file(file.file_name.as_str(), options)
                .map_err(|e| FaviconError::Archive(format!("写入 {} 失败：{}", file.file_name, e)))?;
            writer
                .write_all(&file.bytes)
                .map_err(|e| FaviconError::Archive(format!("写入 {} 失败：{}", file.file_name, e)))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| FaviconError::Archive(format!("归档收尾失败：{}", e)))?;
        Ok(cursor.into_inner())
    }
}

/// 将 PNG 字节包装为可直接用于 `<img src>` 的 Data URL。
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png))
}
