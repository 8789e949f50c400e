//! # 画布合成模块
//!
//! ## 设计思路
//!
//! 合成是纯函数：`(SourceImage, target_size) -> CompositedImage`。
//! 每个尺寸都新建一块全透明画布，不在尺寸之间共享任何可变绘制状态。
//!
//! ## 实现思路
//!
//! 1. 计算等比缩放比例 `min(t / w, t / h)`，四舍五入得到缩放后宽高
//! 2. 计算居中偏移（整除，奇数余量偏向左上）
//! 3. 使用 `fast_image_resize` 卷积缩放，失败时回退 `image::imageops::resize`
//! 4. 将缩放结果逐行拷贝到透明画布对应位置

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{ImageBuffer, Rgba};

use super::source::{rgba_len, CompositedImage, SourceImage};
use super::FaviconError;

/// 源图在目标画布中的摆放位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub x: u32,
    pub y: u32,
}

/// 计算等比缩放后的尺寸与居中偏移。
///
/// 缩放结果至少为 1 像素，避免极端长宽比下某一轴被舍入为 0。
pub fn fit_placement(width: u32, height: u32, target_size: u32) -> Result<Placement, FaviconError> {
    if width == 0 || height == 0 || target_size == 0 {
        return Err(FaviconError::InvalidDimensions {
            width,
            height,
            target: target_size,
        });
    }

    let target = f64::from(target_size);
    let scale = (target / f64::from(width)).min(target / f64::from(height));

    let scaled_width = ((f64::from(width) * scale).round() as u32).clamp(1, target_size);
    let scaled_height = ((f64::from(height) * scale).round() as u32).clamp(1, target_size);

    Ok(Placement {
        scaled_width,
        scaled_height,
        x: (target_size - scaled_width) / 2,
        y: (target_size - scaled_height) / 2,
    })
}

/// 以默认滤镜合成。
pub fn composite(source: &SourceImage, target_size: u32) -> Result<CompositedImage, FaviconError> {
    composite_with_filter(source, target_size, FilterType::Triangle)
}

/// 将源图等比缩放并居中绘制到 `target_size x target_size` 的透明画布上。
pub fn composite_with_filter(
    source: &SourceImage,
    target_size: u32,
    filter: FilterType,
) -> Result<CompositedImage, FaviconError> {
    let placement = fit_placement(source.width(), source.height(), target_size)?;
    let scaled = resize_rgba(source, placement.scaled_width, placement.scaled_height, filter)?;

    let mut canvas = vec![0_u8; rgba_len(target_size, target_size)?];
    let canvas_stride = target_size as usize * 4;
    let row_len = placement.scaled_width as usize * 4;

    for (row, src_row) in scaled.chunks_exact(row_len).enumerate() {
        let start = (placement.y as usize + row) * canvas_stride + placement.x as usize * 4;
        canvas[start..start + row_len].copy_from_slice(src_row);
    }

    log::debug!(
        "🎯 合成完成：{}x{} -> {}x{}（缩放 {}x{}，偏移 {},{}）",
        source.width(),
        source.height(),
        target_size,
        target_size,
        placement.scaled_width,
        placement.scaled_height,
        placement.x,
        placement.y
    );

    Ok(CompositedImage {
        size: target_size,
        pixels: canvas,
    })
}

fn resize_rgba(
    source: &SourceImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<Vec<u8>, FaviconError> {
    if source.width() == target_width && source.height() == target_height {
        return Ok(source.pixels().to_vec());
    }

    match resize_with_fast_image_resize(source, target_width, target_height, filter) {
        Ok(resized) => Ok(resized),
        Err(err) => {
            log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::imageops::resize：{}", err);
            let view = ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(
                source.width(),
                source.height(),
                source.pixels(),
            )
            .ok_or_else(|| FaviconError::Decode("源图缓冲长度异常".to_string()))?;
            Ok(image::imageops::resize(&view, target_width, target_height, filter).into_raw())
        }
    }
}

fn resize_with_fast_image_resize(
    source: &SourceImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<Vec<u8>, FaviconError> {
    let src_image = fr::images::ImageRef::new(
        source.width(),
        source.height(),
        source.pixels(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| FaviconError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new().resize_alg(resize_alg(filter));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| FaviconError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    Ok(dst_image.into_vec())
}

fn resize_alg(filter: FilterType) -> fr::ResizeAlg {
    match filter {
        FilterType::Nearest => fr::ResizeAlg::Nearest,
        FilterType::Triangle => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
        FilterType::CatmullRom => fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom),
        FilterType::Gaussian => fr::ResizeAlg::Convolution(fr::FilterType::Mitchell),
        FilterType::Lanczos3 => fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3),
    }
}
