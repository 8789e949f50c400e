//! # 源图加载模块
//!
//! ## 设计思路
//!
//! 解码属于外部协作者职责，这里提供基于 `image` crate 的默认实现，供 CLI 使用。
//! 优先读取头部尺寸做资源检查，再进行完整解码，降低超大输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素上限、内存上限快速拒绝
//! 3. 完整解码并转换为 RGBA8
//! 4. 构造 `SourceImage`（内部校验缓冲长度）

use std::io::Cursor;
use std::path::Path;

use image::{GenericImageView, ImageReader};

use super::source::SourceImage;
use super::{FaviconConfig, FaviconError};

/// 从本地文件加载源图。
pub fn load_from_file(path: &Path, config: &FaviconConfig) -> Result<SourceImage, FaviconError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| FaviconError::Decode(format!("无法读取文件 {}：{}", path.display(), e)))?;
    if !metadata.is_file() {
        return Err(FaviconError::InvalidFormat(format!("不是普通文件：{}", path.display())));
    }

    let bytes = std::fs::read(path)
        .map_err(|e| FaviconError::Decode(format!("读取文件 {} 失败：{}", path.display(), e)))?;
    decode_from_memory(&bytes, config)
}

/// 将内存中的图片字节解码为 RGBA 源图。
pub fn decode_from_memory(bytes: &[u8], config: &FaviconConfig) -> Result<SourceImage, FaviconError> {
    image::guess_format(bytes)
        .map_err(|e| FaviconError::InvalidFormat(format!("不支持的图片格式：{}", e)))?;

    let (header_width, header_height) = inspect_dimensions(bytes)?;
    validate_pixel_limits(config, header_width, header_height)?;
    validate_decoded_memory_limits(config, header_width, header_height)?;

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| FaviconError::Decode(format!("图片解码失败：{}", e)))?;

    let (width, height) = decoded.dimensions();
    validate_pixel_limits(config, width, height)?;
    validate_decoded_memory_limits(config, width, height)?;

    let source = SourceImage::new(width, height, decoded.to_rgba8().into_raw())?;

    log::info!("✅ 源图解码成功 - 尺寸: {}x{}", width, height);

    Ok(source)
}

fn inspect_dimensions(bytes: &[u8]) -> Result<(u32, u32), FaviconError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| FaviconError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| FaviconError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
}

fn validate_pixel_limits(config: &FaviconConfig, width: u32, height: u32) -> Result<(), FaviconError> {
    let pixels = u64::from(width) * u64::from(height);

    if pixels > config.max_decoded_pixels {
        return Err(FaviconError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}

fn validate_decoded_memory_limits(
    config: &FaviconConfig,
    width: u32,
    height: u32,
) -> Result<(), FaviconError> {
    let estimated = (u64::from(width) * u64::from(height))
        .checked_mul(4)
        .ok_or_else(|| FaviconError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

    if estimated > config.max_decoded_bytes {
        return Err(FaviconError::ResourceLimit(format!(
            "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
            estimated as f64 / 1024.0 / 1024.0,
            config.max_decoded_bytes as f64 / 1024.0 / 1024.0
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};

    fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255])
        });

        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    #[test]
    fn decode_from_memory_yields_rgba_source() {
        let png = create_png_bytes(40, 20);
        let source = decode_from_memory(&png, &FaviconConfig::default()).expect("decode");

        assert_eq!((source.width(), source.height()), (40, 20));
        assert_eq!(source.pixels().len(), 40 * 20 * 4);
        assert_eq!(&source.pixels()[..4], &[0, 0, 0, 255]);
    }

    #[test]
    fn decode_rejects_non_image_payload() {
        let result = decode_from_memory(b"Hello, world", &FaviconConfig::default());
        assert!(matches!(result, Err(FaviconError::InvalidFormat(_))));
    }

    #[test]
    fn decode_rejects_too_many_pixels() {
        let mut config = FaviconConfig::default();
        config.max_decoded_pixels = 100;

        let result = decode_from_memory(&create_png_bytes(20, 20), &config);
        assert!(matches!(result, Err(FaviconError::ResourceLimit(_))));
    }

    #[test]
    fn decode_rejects_excessive_memory_estimate() {
        let mut config = FaviconConfig::default();
        config.max_decoded_bytes = 1024;

        let result = decode_from_memory(&create_png_bytes(20, 20), &config);
        assert!(matches!(result, Err(FaviconError::ResourceLimit(_))));
    }

    #[test]
    fn load_from_file_reads_png_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("logo.png");
        std::fs::write(&path, create_png_bytes(8, 8)).expect("write png");

        let source = load_from_file(&path, &FaviconConfig::default()).expect("load");
        assert_eq!((source.width(), source.height()), (8, 8));
    }

    #[test]
    fn load_from_file_rejects_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = load_from_file(dir.path(), &FaviconConfig::default());
        assert!(matches!(result, Err(FaviconError::InvalidFormat(_))));
    }
}
