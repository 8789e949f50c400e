//! # 图标打包模块（favicon）
//!
//! ## 设计思路
//!
//! 该模块将“源图加载 → 画布合成 → PNG 编码 → ICO 组装 → 归档打包”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `handler`：编排整条处理流水线
//! - `compositor`：等比缩放、居中、透明填充（纯函数）
//! - `container`：ICO 头 / 目录 / 载荷的二进制布局（纯函数）
//! - `codec`：PNG 编码与 zip 归档两个外部协作者接口及默认实现
//! - `loader`：图片字节解码与资源限制
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! main.rs（参数适配）
//!    ↓
//! loader.rs（解码 + 像素限制）→ SourceImage
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ compositor.rs（每个尺寸一块新画布）
//!    ├─ codec.rs（RasterCodec::encode_png）
//!    ├─ container.rs（build → 单条目 / 多条目 ICO）
//!    └─ codec.rs（ArchiveWriter::bundle，仅多尺寸时调用一次）
//!    ↓
//! PackageOutput::Single / PackageOutput::Archive
//! ```

mod codec;
mod compositor;
mod config;
mod container;
mod error;
mod handler;
mod loader;
mod source;

pub use codec::{png_data_url, ArchiveWriter, NamedBuffer, PngCodec, RasterCodec, ZipArchiveWriter};
pub use compositor::{composite, composite_with_filter, fit_placement, Placement};
pub use config::{FaviconConfig, PerformanceProfile};
pub use container::{
    build, payload_offsets, DirectoryRecord, IconDirectory, IconEntry, DIR_ENTRY_LEN, HEADER_LEN,
    MAX_ENTRIES,
};
pub use error::FaviconError;
pub use handler::{FaviconHandler, PackageOutput, Preview};
pub use loader::{decode_from_memory, load_from_file};
pub use source::{
    archive_file_name, file_stem, icon_file_name, CompositedImage, SourceImage, TargetSizes,
    DEFAULT_SELECTION, MAX_ICON_SIZE, STANDARD_SIZES,
};
