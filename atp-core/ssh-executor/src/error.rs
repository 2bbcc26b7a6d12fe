//! SSH 错误定义

use thiserror::Error;

/// SSH 操作结果类型
pub type Result<T> = std::result::Result<T, SshError>;

/// SSH 错误类型
///
/// 每种错误对单次请求都是终止性的，执行器内部不重试。
#[derive(Error, Debug)]
pub enum SshError {
    /// 端点格式错误
    #[error("{0}")]
    MalformedEndpoint(String),

    /// 连接或认证失败
    #[error("SSH 连接失败: {0}")]
    ConnectError(String),

    /// 通道打开失败
    #[error("SSH 通道错误: {0}")]
    ChannelError(String),

    /// 读取输出被中断
    #[error("读取响应被中断: {0}")]
    ReadInterrupted(String),
}

impl SshError {
    /// 错误类别名称（用于日志和 CLI 输出）
    pub fn kind(&self) -> &'static str {
        match self {
            SshError::MalformedEndpoint(_) => "MalformedEndpoint",
            SshError::ConnectError(_) => "ConnectError",
            SshError::ChannelError(_) => "ChannelError",
            SshError::ReadInterrupted(_) => "ReadInterrupted",
        }
    }
}

impl From<std::io::Error> for SshError {
    fn from(err: std::io::Error) -> Self {
        SshError::ReadInterrupted(err.to_string())
    }
}
