//! 设置文件模块
//!
//! # 设计思路
//!
//! 允许用 JSON 文件覆盖默认打包参数，所有字段都是可选的，缺省即沿用 `FaviconConfig::default()`。
//!
//! ```json
//! { "profile": "quality", "parallel_sizes": false, "sizes": [16, 32, 48] }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::favicon::{FaviconConfig, PerformanceProfile, TargetSizes};

const MIN_DECODED_BYTES: u64 = 8 * 1024 * 1024;

/// 用户设置（全部可选）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppSettings {
    pub profile: Option<String>,
    pub parallel_sizes: Option<bool>,
    pub max_decoded_pixels: Option<u64>,
    pub max_decoded_bytes: Option<u64>,
    pub sizes: Option<Vec<u32>>,
}

impl AppSettings {
    /// 解析档位字段。
    pub fn performance_profile(&self) -> Result<Option<PerformanceProfile>, AppError> {
        self.profile
            .as_deref()
            .map(PerformanceProfile::from_str)
            .transpose()
            .map_err(|e| AppError::Settings(e.to_string()))
    }

    /// 解析尺寸字段；显式给出空数组时返回空集合，由打包阶段报 `NoSizeSelected`。
    pub fn target_sizes(&self) -> Result<Option<TargetSizes>, AppError> {
        self.sizes
            .as_ref()
            .map(|sizes| TargetSizes::new(sizes.iter().copied()))
            .transpose()
            .map_err(|e| AppError::Settings(e.to_string()))
    }

    /// 校验并应用到配置上。
    pub fn apply(&self, config: &mut FaviconConfig) -> Result<(), AppError> {
        if let Some(profile) = self.performance_profile()? {
            config.apply_performance_profile(profile);
        }
        if let Some(parallel) = self.parallel_sizes {
            config.parallel_sizes = parallel;
        }
        if let Some(pixels) = self.max_decoded_pixels {
            if pixels == 0 {
                return Err(AppError::Settings("max_decoded_pixels 必须大于 0".to_string()));
            }
            config.max_decoded_pixels = pixels;
        }
        if let Some(bytes) = self.max_decoded_bytes {
            if bytes < MIN_DECODED_BYTES {
                return Err(AppError::Settings("max_decoded_bytes 不能小于 8MB".to_string()));
            }
            config.max_decoded_bytes = bytes;
        }
        Ok(())
    }
}

/// 读取设置文件；文件不存在时返回 `None`。
pub fn load_settings(path: &Path) -> Result<Option<AppSettings>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let parsed = serde_json::from_str::<AppSettings>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;

    Ok(Some(parsed))
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), AppError> {
    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

    fs::write(path, content)?;
    Ok(())
}
