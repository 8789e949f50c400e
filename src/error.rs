//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义应用级 `AppError` 枚举，CLI 各子命令统一返回 `Result<T, AppError>`，
//! 避免各处 `.map_err(|e| e.to_string())` 的不一致写法。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `FaviconError` 与 `std::io::Error` 提供 `From` 转换，无需手动 map。

use crate::favicon::FaviconError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图标打包流水线错误（解码 / 合成 / 编码 / 组装 / 打包）
    #[error("{0}")]
    Favicon(#[from] FaviconError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件读取或校验失败
    #[error("设置错误: {0}")]
    Settings(String),

    /// 命令行参数不合法
    #[error("参数错误: {0}")]
    InvalidArgument(String),
}
