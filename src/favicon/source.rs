//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“流水线中间结果”解耦：
//! - `SourceImage` 表示已解码的源图（只读）
//! - `TargetSizes` 表示用户选择的目标尺寸集合（去重、升序）
//! - `CompositedImage` 表示某一尺寸下合成完毕的正方形 RGBA 画布
//!
//! 三者均按请求创建，互不共享缓冲区。

use super::FaviconError;

/// 参考配置下提供给用户选择的标准 ICO 尺寸。
pub const STANDARD_SIZES: [u32; 7] = [16, 24, 32, 48, 64, 128, 256];

/// 初始默认勾选的尺寸。
pub const DEFAULT_SELECTION: [u32; 3] = [16, 32, 48];

/// ICO 目录宽高字段可表示的最大尺寸（256 以 0 表示）。
pub const MAX_ICON_SIZE: u32 = 256;

/// 解码后的源图。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl SourceImage {
    /// 由宽高与 RGBA8 缓冲构造，缓冲长度必须为 `width * height * 4`。
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, FaviconError> {
        let expected = rgba_len(width, height)?;
        if pixels.len() != expected {
            return Err(FaviconError::InvalidFormat(format!(
                "RGBA 缓冲长度不匹配：{}（期望：{}）",
                pixels.len(),
                expected
            )));
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// 合成阶段输出：`size x size` 的 RGBA 画布。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositedImage {
    pub(crate) size: u32,
    pub(crate) pixels: Vec<u8>,
}

impl CompositedImage {
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// 读取 `(x, y)` 处的 RGBA 像素，越界返回 `None`。
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size || y >= self.size {
            return None;
        }
        let idx = ((y as usize) * (self.size as usize) + x as usize) * 4;
        let px = self.pixels.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// 目标尺寸集合。
///
/// 始终保持去重且严格升序；允许为空（对应用户取消全部勾选的状态），
/// 空集合在打包时以 `NoSizeSelected` 拒绝。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSizes {
    sizes: Vec<u32>,
}

impl TargetSizes {
    /// 从任意顺序、可能重复的尺寸列表构造。
    ///
    /// # 示例
    /// ```rust
    /// use favicon_packager::favicon::TargetSizes;
    ///
    /// let sizes = TargetSizes::new([48, 16, 32, 16])?;
    /// assert_eq!(sizes.as_slice(), &[16, 32, 48]);
    /// # Ok::<(), favicon_packager::favicon::FaviconError>(())
    /// ```
    pub fn new<I>(sizes: I) -> Result<Self, FaviconError>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut collected = Vec::new();
        for size in sizes {
            validate_size(size)?;
            collected.push(size);
        }
        collected.sort_unstable();
        collected.dedup();
        Ok(Self { sizes: collected })
    }

    /// 参考配置下的默认勾选。
    pub fn default_selection() -> Self {
        Self {
            sizes: DEFAULT_SELECTION.to_vec(),
        }
    }

    /// 切换某个尺寸的勾选状态：已存在则移除，否则插入到有序位置。
    pub fn toggle(&mut self, size: u32) -> Result<(), FaviconError> {
        validate_size(size)?;
        match self.sizes.binary_search(&size) {
            Ok(idx) => {
                self.sizes.remove(idx);
            }
            Err(idx) => self.sizes.insert(idx, size),
        }
        Ok(())
    }

    pub fn contains(&self, size: u32) -> bool {
        self.sizes.binary_search(&size).is_ok()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.sizes
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.sizes.iter().copied()
    }
}

pub(crate) fn validate_size(size: u32) -> Result<(), FaviconError> {
    if size == 0 || size > MAX_ICON_SIZE {
        return Err(FaviconError::InvalidSize(size));
    }
    Ok(())
}

pub(crate) fn rgba_len(width: u32, height: u32) -> Result<usize, FaviconError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| FaviconError::ResourceLimit("图片尺寸导致内存溢出风险".to_string()))
}

/// 取上传文件名中最后一个 `.` 之前的部分作为输出文件名前缀。
///
/// 结果为空（无扩展名或以 `.` 开头）时回退为完整文件名。
pub fn file_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    }
}

/// 单尺寸 ICO 的下载文件名：`<stem>-<size>x<size>.ico`。
pub fn icon_file_name(stem: &str, size: u32) -> String {
    format!("{stem}-{size}x{size}.ico")
}

/// 多尺寸打包的下载文件名：`<stem>-favicons.zip`。
pub fn archive_file_name(stem: &str) -> String {
    format!("{stem}-favicons.zip")
}
