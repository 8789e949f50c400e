//! # Favicon 打包工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  main.rs (clap CLI: generate / inspect)                  │
//! │       │                                                  │
//! │       ├─ settings ── JSON 设置文件 → FaviconConfig        │
//! │       ↓                                                  │
//! │  favicon                                                 │
//! │   ├─ loader       字节 → SourceImage（资源限制）          │
//! │   ├─ compositor   等比缩放 + 居中 + 透明填充              │
//! │   ├─ codec        PNG 编码 / zip 归档（协作者接口）       │
//! │   ├─ container    ICO 头 + 目录 + 载荷                    │
//! │   └─ handler      编排：Single(.ico) / Archive(.zip)      │
//! │                                                          │
//! │  error ── AppError (统一错误类型)                         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，CLI 各子命令的返回类型 |
//! | [`favicon`] | 源图合成、PNG 编码、ICO 组装与多尺寸归档 |
//! | [`settings`] | JSON 设置文件的读取、校验与应用 |

pub mod error;
pub mod favicon;
pub mod settings;
