//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `FaviconConfig`，保证运行时行为可观测、可调整、可测试。
//! 性能档位（quality / balanced / speed）作为高层语义，映射到底层参数组合。
//!
//! ## 实现思路
//!
//! - `Default` 提供平衡档配置。
//! - `PerformanceProfile` 负责档位字符串解析与反向输出。
//! - `apply_performance_profile` 将档位转换为具体参数。
//! - `infer_performance_profile` 从当前配置反推档位。
//! - PNG / zip 压缩参数属于协作者构造参数，由档位提供，不进入运行时配置。

use image::codecs::png::CompressionType;
use image::imageops::FilterType;

use super::FaviconError;

/// 图标打包配置。
#[derive(Debug, Clone)]
pub struct FaviconConfig {
    /// 缩放滤镜（最终映射到 `fast_image_resize` 卷积核）。
    pub resize_filter: FilterType,
    /// 多尺寸时是否并行执行“合成 + 编码”。
    pub parallel_sizes: bool,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
}

impl Default for FaviconConfig {
    fn default() -> Self {
        Self {
            resize_filter: FilterType::Triangle,
            parallel_sizes: true,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
        }
    }
}

/// 性能档位。
///
/// - `Quality`：尽量保真
/// - `Balanced`：质量与性能平衡
/// - `Speed`：优先生成速度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceProfile {
    Quality,
    Balanced,
    Speed,
}

impl PerformanceProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use favicon_packager::favicon::PerformanceProfile;
    ///
    /// let p = PerformanceProfile::from_str("Balanced")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), favicon_packager::favicon::FaviconError>(())
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(profile: &str) -> Result<Self, FaviconError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(FaviconError::InvalidFormat(format!(
                "未知性能档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }

    /// 该档位下构造 `PngCodec` 使用的压缩策略。
    pub fn png_compression(self) -> CompressionType {
        match self {
            Self::Quality => CompressionType::Best,
            Self::Balanced => CompressionType::Default,
            Self::Speed => CompressionType::Fast,
        }
    }

    /// 该档位下构造 `ZipArchiveWriter` 使用的 deflate 等级。
    pub fn archive_compression_level(self) -> i64 {
        match self {
            Self::Quality => 9,
            Self::Balanced => 6,
            Self::Speed => 1,
        }
    }
}

impl FaviconConfig {
    /// 基于当前参数反推性能档位。
    pub fn infer_performance_profile(&self) -> PerformanceProfile {
        match self.resize_filter {
            FilterType::Lanczos3 | FilterType::CatmullRom => PerformanceProfile::Quality,
            FilterType::Nearest => PerformanceProfile::Speed,
            FilterType::Triangle | FilterType::Gaussian => PerformanceProfile::Balanced,
        }
    }

    /// 应用指定性能档位到实际参数。
    pub fn apply_performance_profile(&mut self, profile: PerformanceProfile) {
        match profile {
            PerformanceProfile::Quality => self.resize_filter = FilterType::Lanczos3,
            PerformanceProfile::Balanced => self.resize_filter = FilterType::Triangle,
            PerformanceProfile::Speed => self.resize_filter = FilterType::Nearest,
        }
    }
}
