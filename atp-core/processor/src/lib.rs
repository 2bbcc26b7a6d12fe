//! ATP 测试处理器接口
//!
//! 定义测试框架与各执行后端之间的契约：
//! - `Request` / `Response` 请求响应模型
//! - `TestProcessor` 执行后端 trait
//! - `ProcessorRegistry` 处理器注册表
//! - `PropertyStore` 测试属性读取接口（`TestProperties` 为默认实现）
//! - `Logger` 日志接口（`TracingLogger` 为默认实现）

pub mod logger;
pub mod properties;
pub mod registry;
pub mod traits;

pub use logger::{Logger, TracingLogger};
pub use properties::{PropertyStore, TestProperties};
pub use registry::ProcessorRegistry;
pub use traits::{Request, Response, TestProcessor};

use thiserror::Error;

/// 处理器层错误
#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("处理器 {0} 不存在")]
    ProcessorNotFound(String),

    #[error("处理器 {0} 已注册")]
    ProcessorAlreadyRegistered(String),

    #[error("属性文件解析失败: {0}")]
    PropertiesParseError(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProcessorError>;
