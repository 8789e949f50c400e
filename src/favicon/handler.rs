//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `FaviconHandler` 只负责流程编排与配置管理，合成与组装本身都是纯函数。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 校验尺寸集合非空（在任何合成之前）
//! 3. 每个尺寸独立执行“合成 → PNG 编码 → 单条目 ICO 组装”
//! 4. 单尺寸直接输出 `.ico`；多尺寸交给归档协作者打包一次
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<FaviconConfig>>` 支持运行时切档，单次请求只用一份快照。
//! - 多尺寸时可用 `rayon` 并行，各尺寸互不读取对方缓冲，结果按升序收集。
//! - 任一尺寸失败即整体失败，不产出缺尺寸的归档。
//! - 记录 `render/archive/total` 阶段耗时，便于性能诊断。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use rayon::prelude::*;

use super::codec::{png_data_url, ArchiveWriter, NamedBuffer, PngCodec, RasterCodec, ZipArchiveWriter};
use super::compositor::composite_with_filter;
use super::container::{build, IconEntry};
use super::source::{archive_file_name, file_stem, icon_file_name, SourceImage, TargetSizes};
use super::{FaviconConfig, FaviconError, PerformanceProfile};

/// 一次打包请求的输出。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOutput {
    /// 单尺寸：直接下载的 `.ico`。
    Single { size: u32, file: NamedBuffer },
    /// 多尺寸：由归档协作者打包的 `.zip`，`entries` 为归档内文件名（按尺寸升序）。
    Archive { file: NamedBuffer, entries: Vec<String> },
}

impl PackageOutput {
    pub fn file_name(&self) -> &str {
        match self {
            Self::Single { file, .. } | Self::Archive { file, .. } => &file.file_name,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Single { file, .. } | Self::Archive { file, .. } => &file.bytes,
        }
    }

    pub fn into_file(self) -> NamedBuffer {
        match self {
            Self::Single { file, .. } | Self::Archive { file, .. } => file,
        }
    }
}

/// 单个尺寸的预览图。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub size: u32,
    pub data_url: String,
}

/// 图标打包处理器。
pub struct FaviconHandler<C = PngCodec, A = ZipArchiveWriter> {
    config: Arc<RwLock<FaviconConfig>>,
    codec: C,
    archiver: A,
}

impl FaviconHandler<PngCodec, ZipArchiveWriter> {
    /// 使用默认 PNG 编码器与 zip 写入器创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use favicon_packager::favicon::{FaviconConfig, FaviconHandler};
    ///
    /// let handler = FaviconHandler::new(FaviconConfig::default());
    /// assert_eq!(handler.get_performance_profile()?.as_str(), "balanced");
    /// # Ok::<(), favicon_packager::favicon::FaviconError>(())
    /// ```
    pub fn new(config: FaviconConfig) -> Self {
        Self::with_collaborators(config, PngCodec::default(), ZipArchiveWriter::default())
    }
}

impl<C, A> FaviconHandler<C, A>
where
    C: RasterCodec,
    A: ArchiveWriter,
{
    pub fn with_collaborators(config: FaviconConfig, codec: C, archiver: A) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            codec,
            archiver,
        }
    }

    /// 获取配置快照，保证单次请求链路使用一致参数。
    pub fn config_snapshot(&self) -> Result<FaviconConfig, FaviconError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| FaviconError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    pub fn set_performance_profile(&self, profile: PerformanceProfile) -> Result<(), FaviconError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| FaviconError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.apply_performance_profile(profile);

        log::info!(
            "⚙️ 已切换性能档位：{:?}（filter={:?}, parallel={}）",
            profile,
            config.resize_filter,
            config.parallel_sizes
        );

        Ok(())
    }

    pub fn get_performance_profile(&self) -> Result<PerformanceProfile, FaviconError> {
        let config = self
            .config
            .read()
            .map_err(|_| FaviconError::ResourceLimit("配置读取锁已中毒".to_string()))?;
        Ok(config.infer_performance_profile())
    }

    pub fn set_parallel_sizes(&self, parallel: bool) -> Result<(), FaviconError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| FaviconError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.parallel_sizes = parallel;
        Ok(())
    }

    /// 处理主入口：按尺寸数量输出单个 `.ico` 或一个 `.zip`。
    ///
    /// `file_name` 为上传的原始文件名，用于推导输出文件名前缀。
    pub fn package(
        &self,
        source: &SourceImage,
        file_name: &str,
        sizes: &TargetSizes,
    ) -> Result<PackageOutput, FaviconError> {
        if sizes.is_empty() {
            return Err(FaviconError::NoSizeSelected);
        }

        let config = self.config_snapshot()?;
        let stem = file_stem(file_name);
        let total_start = Instant::now();

        let render_start = Instant::now();
        let entries = self.render_entries(source, sizes, &config)?;
        let render_elapsed = render_start.elapsed();

        if let [entry] = entries.as_slice() {
            let size = entry.size;
            let bytes = build(std::slice::from_ref(entry))?;
            log::info!(
                "✅ 单尺寸 ICO 生成完成 - size={} bytes={} render={}ms total={}ms",
                size,
                bytes.len(),
                render_elapsed.as_millis(),
                total_start.elapsed().as_millis()
            );
            return Ok(PackageOutput::Single {
                size,
                file: NamedBuffer {
                    file_name: icon_file_name(stem, size),
                    bytes,
                },
            });
        }

        let files = entries
            .into_iter()
            .map(|entry| {
                let file_name = icon_file_name(stem, entry.size);
                build(&[entry]).map(|bytes| NamedBuffer { file_name, bytes })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let archive_start = Instant::now();
        let bytes = self.archiver.bundle(&files)?;
        let archive_elapsed = archive_start.elapsed();

        log::info!(
            "✅ 多尺寸打包完成 - sizes={:?} bytes={} render={}ms archive={}ms total={}ms",
            sizes.as_slice(),
            bytes.len(),
            render_elapsed.as_millis(),
            archive_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(PackageOutput::Archive {
            file: NamedBuffer {
                file_name: archive_file_name(stem),
                bytes,
            },
            entries: files.into_iter().map(|file| file.file_name).collect(),
        })
    }

    /// 将所有选中尺寸合并为一个多条目 `.ico`，输出 `<stem>.ico`。
    pub fn package_combined(
        &self,
        source: &SourceImage,
        file_name: &str,
        sizes: &TargetSizes,
    ) -> Result<NamedBuffer, FaviconError> {
        if sizes.is_empty() {
            return Err(FaviconError::NoSizeSelected);
        }

        let config = self.config_snapshot()?;
        let start = Instant::now();
        let entries = self.render_entries(source, sizes, &config)?;
        let bytes = build(&entries)?;

        log::info!(
            "✅ 合并 ICO 生成完成 - sizes={:?} bytes={} total={}ms",
            sizes.as_slice(),
            bytes.len(),
            start.elapsed().as_millis()
        );

        Ok(NamedBuffer {
            file_name: format!("{}.ico", file_stem(file_name)),
            bytes,
        })
    }

    /// 为每个选中尺寸生成 PNG Data URL 预览。
    pub fn previews(
        &self,
        source: &SourceImage,
        sizes: &TargetSizes,
    ) -> Result<Vec<Preview>, FaviconError> {
        let config = self.config_snapshot()?;
        Ok(self
            .render_entries(source, sizes, &config)?
            .into_iter()
            .map(|entry| Preview {
                size: entry.size,
                data_url: png_data_url(&entry.payload),
            })
            .collect())
    }

    /// 对每个尺寸执行合成与编码，结果按尺寸升序排列。
    fn render_entries(
        &self,
        source: &SourceImage,
        sizes: &TargetSizes,
        config: &FaviconConfig,
    ) -> Result<Vec<IconEntry>, FaviconError> {
        if config.parallel_sizes && sizes.len() > 1 {
            sizes
                .as_slice()
                .par_iter()
                .map(|&size| self.render_entry(source, size, config))
                .collect()
        } else {
            sizes
                .iter()
                .map(|size| self.render_entry(source, size, config))
                .collect()
        }
    }

    fn render_entry(
        &self,
        source: &SourceImage,
        size: u32,
        config: &FaviconConfig,
    ) -> Result<IconEntry, FaviconError> {
        let composited = composite_with_filter(source, size, config.resize_filter)?;
        let payload = self
            .codec
            .encode_png(composited.pixels(), composited.size(), composited.size())?;

        log::debug!("🧩 尺寸 {}x{} 编码完成 - payload={}B", size, size, payload.len());

        Ok(IconEntry::new(size, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favicon::IconDirectory;

    fn gradient_source(width: u32, height: u32) -> SourceImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, 128, 255]);
            }
        }
        SourceImage::new(width, height, pixels).expect("valid source")
    }

    #[test]
    fn package_single_size_returns_direct_ico() {
        let handler = FaviconHandler::new(FaviconConfig::default());
        let sizes = TargetSizes::new([32]).expect("sizes");

        let output = handler
            .package(&gradient_source(64, 40), "logo.png", &sizes)
            .expect("package");

        assert!(matches!(output, PackageOutput::Single { size: 32, .. }));
        assert_eq!(output.file_name(), "logo-32x32.ico");

        let dir = IconDirectory::parse(output.bytes()).expect("parse");
        assert_eq!(dir.len(), 1);
        let png = dir.payload(output.bytes(), 0).expect("payload");
        let decoded = image::load_from_memory(png).expect("decode").to_rgba8();
        assert_eq!(decoded.dimensions(), (32, 32));
    }

    #[test]
    fn package_parallel_and_sequential_agree() {
        let handler = FaviconHandler::new(FaviconConfig::default());
        let source = gradient_source(50, 30);
        let sizes = TargetSizes::new([16, 24, 48, 256]).expect("sizes");

        let config = handler.config_snapshot().expect("snapshot");
        let parallel = handler.render_entries(&source, &sizes, &config).expect("parallel");

        handler.set_parallel_sizes(false).expect("set");
        let config = handler.config_snapshot().expect("snapshot");
        let sequential = handler.render_entries(&source, &sizes, &config).expect("sequential");

        assert_eq!(parallel, sequential);
        let order: Vec<u32> = parallel.iter().map(|entry| entry.size).collect();
        assert_eq!(order, vec![16, 24, 48, 256]);
    }

    #[test]
    fn package_combined_holds_every_size() {
        let handler = FaviconHandler::new(FaviconConfig::default());
        let sizes = TargetSizes::new([16, 32, 256]).expect("sizes");

        let file = handler
            .package_combined(&gradient_source(20, 20), "app.icon.png", &sizes)
            .expect("combined");

        assert_eq!(file.file_name, "app.icon.ico");
        let dir = IconDirectory::parse(&file.bytes).expect("parse");
        let widths: Vec<u32> = dir.records.iter().map(|r| r.width).collect();
        assert_eq!(widths, vec![16, 32, 256]);
    }

    #[test]
    fn previews_are_png_data_urls() {
        let handler = FaviconHandler::new(FaviconConfig::default());
        let previews = handler
            .previews(&gradient_source(10, 10), &TargetSizes::default_selection())
            .expect("previews");

        assert_eq!(previews.len(), 3);
        assert!(previews
            .iter()
            .all(|p| p.data_url.starts_with("data:image/png;base64,iVBORw0KGgo")));
    }

    #[test]
    fn profile_switch_is_reflected_in_snapshot() {
        let handler = FaviconHandler::new(FaviconConfig::default());
        handler
            .set_performance_profile(PerformanceProfile::Speed)
            .expect("switch");

        assert_eq!(
            handler.get_performance_profile().expect("profile"),
            PerformanceProfile::Speed
        );
        assert_eq!(
            handler.config_snapshot().expect("snapshot").resize_filter,
            image::imageops::FilterType::Nearest
        );
    }
}
