//! 传输抽象
//!
//! `Transport` 建立会话，`RemoteSession` 打开命令通道，`CommandChannel` 以字节流形式暴露远程标准输出。
//! 生产实现见 `client` 模块（russh），测试可替换为模拟实现。

use async_trait::async_trait;

use crate::endpoint::Endpoint;
use crate::error::Result;

/// 会话工厂
#[async_trait]
pub trait Transport: Send + Sync {
    /// 连接并完成密码认证
    ///
    /// 返回的会话尚未打开任何通道。
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn RemoteSession>>;
}

/// 已认证的会话
#[async_trait]
pub trait RemoteSession: Send {
    /// 打开 exec 通道并开始执行命令
    async fn open_exec(&mut self, command: &str) -> Result<Box<dyn CommandChannel>>;

    /// 断开会话，可重复调用
    async fn disconnect(&mut self);
}

/// 单次命令执行的通道
#[async_trait]
pub trait CommandChannel: Send {
    /// 不阻塞时可读取的字节数
    async fn available(&mut self) -> Result<usize>;

    /// 远端已关闭输出且缓冲区已读空
    fn is_eof(&self) -> bool;

    /// 读取一个字节，`None` 表示流结束
    async fn read_byte(&mut self) -> Result<Option<u8>>;

    /// 断开通道，可重复调用
    async fn disconnect(&mut self);
}
