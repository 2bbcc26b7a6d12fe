//! 命令执行器
//!
//! 在已建立的会话上打开 exec 通道，等待首字节（有超时），然后读取到流结束（无超时）。
//!
//! 状态流转：
//!
//! ```text
//! Idle -> ChannelOpening -> ChannelFailed -> Failure
//!                        -> ChannelOpen -> AwaitingFirstByte -> TimedOutEmpty -> 空响应
//!                                                            -> DataAvailable -> Draining -> Closed -> Success
//! ```

use std::sync::Arc;
use std::time::Duration;

use atp_processor::Logger;

use crate::config::ExecutorConfig;
use crate::error::Result;
use crate::transport::{CommandChannel, RemoteSession};

/// 命令执行器
pub struct CommandExecutor {
    config: ExecutorConfig,
    logger: Arc<dyn Logger>,
    component: String,
}

impl CommandExecutor {
    pub fn new(config: ExecutorConfig, logger: Arc<dyn Logger>, component: impl Into<String>) -> Self {
        Self {
            config,
            logger,
            component: component.into(),
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// 把多行命令块连接为一条命令
    pub fn join_commands(&self, command_block: &str) -> String {
        join_commands(command_block, &self.config.command_separator)
    }

    /// 执行命令块并返回标准输出文本
    ///
    /// 通道在返回前总是被断开；会话的断开由调用方负责。
    pub async fn execute(
        &self,
        session: &mut dyn RemoteSession,
        command_block: &str,
        timeout: Duration,
    ) -> Result<String> {
        let command = self.join_commands(command_block);
        self.logger
            .debug(&format!("SSH Command: {}", command), &self.component);

        let mut channel = match session.open_exec(&command).await {
            Ok(channel) => channel,
            Err(e) => {
                self.logger.error("SSH channel not set", &self.component);
                return Err(e);
            }
        };

        let result = self.collect(&mut *channel, timeout).await;
        channel.disconnect().await;
        result
    }

    async fn collect(&self, channel: &mut dyn CommandChannel, timeout: Duration) -> Result<String> {
        if !self.await_first_byte(channel, timeout).await? {
            return Ok(String::new());
        }
        self.drain(channel).await
    }

    /// 按轮询间隔等待输出可读
    ///
    /// 返回 `false` 表示超时仍无数据。远端已关闭输出时立即返回 `true`。
    async fn await_first_byte(
        &self,
        channel: &mut dyn CommandChannel,
        timeout: Duration,
    ) -> Result<bool> {
        let poll_interval = self.config.poll_interval;
        let mut waited = Duration::ZERO;

        let mut available = channel.available().await?;
        while available == 0 && !channel.is_eof() && waited < timeout {
            tokio::time::sleep(poll_interval).await;
            waited += poll_interval;
            available = channel.available().await?;
        }

        self.logger.debug(
            &format!("Waited {} milliseconds for response", waited.as_millis()),
            &self.component,
        );

        Ok(available > 0 || channel.is_eof())
    }

    /// 逐字节读取直到流结束，无超时
    async fn drain(&self, channel: &mut dyn CommandChannel) -> Result<String> {
        let mut buf = Vec::new();
        while let Some(byte) = channel.read_byte().await? {
            buf.push(byte);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// 把多行命令块连接为一条命令，空行被忽略
pub fn join_commands(command_block: &str, separator: &str) -> String {
    command_block
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}
