//! ATP SSH 执行器
//!
//! 在远程主机上执行命令块并捕获标准输出，作为 ATP 的一个测试处理器后端：
//! - 端点解析（`USERNAME:PASSWORD@HOST:PORT`）
//! - 密码认证会话（不校验主机密钥）
//! - exec 通道执行与首字节超时
//!
//! # 示例
//!
//! ```ignore
//! use std::sync::Arc;
//! use atp_processor::{Request, TestProcessor, TestProperties, TracingLogger};
//! use atp_ssh_executor::{RusshTransport, SshTestProcessor};
//!
//! let processor = SshTestProcessor::new(
//!     Arc::new(RusshTransport::new()),
//!     Arc::new(TestProperties::load()?),
//!     Arc::new(TracingLogger),
//! );
//! let response = processor
//!     .execute_test(&Request::new("root:password@192.168.1.100:22", "hostname\nuptime"))
//!     .await;
//! println!("{:?}", response.text());
//! ```

mod client;
mod config;
mod endpoint;
mod error;
mod executor;
mod processor;
mod transport;

pub use client::RusshTransport;
pub use config::{
    ExecutorConfig, DEFAULT_COMMAND_SEPARATOR, DEFAULT_POLL_INTERVAL, DEFAULT_RESPONSE_TIMEOUT,
    RESPONSE_TIMEOUT_KEY,
};
pub use endpoint::Endpoint;
pub use error::{Result, SshError};
pub use executor::{join_commands, CommandExecutor};
pub use processor::{SshTestProcessor, COMPONENT_NAME, SERVICE_NAME};
pub use transport::{CommandChannel, RemoteSession, Transport};
