//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载“合成 → 编码 → 组装 → 打包”链路中的所有错误来源，
//! 调用侧可按分支匹配，而不是解析字符串。
//! 所有错误对相同输入都是确定性的，因此链路内不做自动重试。

/// 图标打包统一错误类型。
///
/// 该类型会在应用层被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum FaviconError {
    /// 源图宽/高为 0，或目标尺寸为 0。
    #[error("尺寸无效：源图 {width}x{height}，目标尺寸 {target}")]
    InvalidDimensions { width: u32, height: u32, target: u32 },

    /// 目标尺寸超出 ICO 可表示范围 `[1, 256]`。
    #[error("不支持的图标尺寸：{0}（允许范围：1~256）")]
    InvalidSize(u32),

    #[error("图标条目为空，无法生成 ICO 容器")]
    EmptyEntrySet,

    /// 目录计数字段为 16 位。
    #[error("图标条目过多：{0}（上限：65535）")]
    TooManyEntries(usize),

    #[error("未选择任何图标尺寸")]
    NoSizeSelected,

    /// 载荷长度或偏移超出 32 位字段表示范围。
    #[error("图标载荷过大：{0}")]
    PayloadTooLarge(String),

    /// 外部编码器失败，原样透传。
    #[error("编码错误：{0}")]
    CodecFailure(String),

    #[error("打包错误：{0}")]
    Archive(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("ICO 结构损坏：{0}")]
    MalformedContainer(String),
}

impl From<FaviconError> for String {
    fn from(error: FaviconError) -> Self {
        error.to_string()
    }
}
