//! SSH 客户端实现
//!
//! 基于 russh：密码认证，接受任意主机密钥，每个通道执行一条命令，读取标准输出直到流结束。

use std::collections::VecDeque;
use std::sync::Arc;
use std::task::Poll;

use async_trait::async_trait;
use futures_util::FutureExt;
use russh::client::{self, Handle, Msg};
use russh::keys::ssh_key::PublicKey;
use russh::{Channel, ChannelMsg, Disconnect};
use tracing::{debug, info, warn};

use crate::endpoint::Endpoint;
use crate::error::{Result, SshError};
use crate::transport::{CommandChannel, RemoteSession, Transport};

/// 会话处理器：不校验主机密钥
struct AcceptAnyHostKey;

impl client::Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        debug!("跳过主机密钥校验: {}", server_public_key.algorithm());
        Ok(true)
    }
}

/// russh 传输
pub struct RusshTransport {
    config: Arc<client::Config>,
}

impl RusshTransport {
    /// 使用 russh 默认配置创建
    pub fn new() -> Self {
        Self::with_config(client::Config::default())
    }

    /// 使用自定义 russh 配置创建
    pub fn with_config(config: client::Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl Default for RusshTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for RusshTransport {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn RemoteSession>> {
        info!("正在连接 SSH: {}", endpoint);

        let handle = client::connect(
            Arc::clone(&self.config),
            (endpoint.host.as_str(), endpoint.port),
            AcceptAnyHostKey,
        )
        .await
        .map_err(|e| SshError::ConnectError(e.to_string()))?;

        let mut session = RusshSession {
            handle: Some(handle),
            address: endpoint.address(),
        };

        let auth = match session.handle.as_mut() {
            Some(handle) => handle
                .authenticate_password(endpoint.username.clone(), endpoint.password.clone())
                .await
                .map_err(|e| SshError::ConnectError(e.to_string())),
            None => Err(SshError::ConnectError("会话已断开".to_string())),
        };

        match auth {
            Ok(result) if result.success() => {
                info!("SSH 认证成功: {}", endpoint);
                Ok(Box::new(session))
            }
            Ok(_) => {
                session.disconnect().await;
                Err(SshError::ConnectError(format!(
                    "Auth fail: password rejected for user {}",
                    endpoint.username
                )))
            }
            Err(e) => {
                session.disconnect().await;
                Err(e)
            }
        }
    }
}

/// 已认证的 russh 会话
struct RusshSession {
    handle: Option<Handle<AcceptAnyHostKey>>,
    address: String,
}

#[async_trait]
impl RemoteSession for RusshSession {
    async fn open_exec(&mut self, command: &str) -> Result<Box<dyn CommandChannel>> {
        let handle = self
            .handle
            .as_ref()
            .ok_or_else(|| SshError::ChannelError("session is not connected".to_string()))?;

        let channel = handle
            .channel_open_session()
            .await
            .map_err(|e| SshError::ChannelError(e.to_string()))?;

        if let Err(e) = channel.exec(true, command).await {
            let _ = channel.close().await;
            return Err(SshError::ChannelError(e.to_string()));
        }

        debug!("exec 通道已打开: {}", self.address);
        Ok(Box::new(RusshChannel::new(channel)))
    }

    async fn disconnect(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle
                .disconnect(Disconnect::ByApplication, "", "English")
                .await
            {
                warn!("断开 SSH 会话失败 {}: {}", self.address, e);
            }
            info!("SSH 会话已关闭: {}", self.address);
        }
    }
}

impl Drop for RusshSession {
    fn drop(&mut self) {
        // 未显式断开时（例如请求被取消）在后台断开
        if let Some(handle) = self.handle.take() {
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                let address = self.address.clone();
                runtime.spawn(async move {
                    let _ = handle
                        .disconnect(Disconnect::ByApplication, "", "English")
                        .await;
                    debug!("SSH 会话已在后台关闭: {}", address);
                });
            }
        }
    }
}

/// 输出流状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Open,
    /// 远端发送了 EOF 或 CLOSE
    Closed,
    /// 会话在远端关闭输出前消失
    Interrupted,
}

/// exec 通道的标准输出缓冲
///
/// 只有 `Eof`/`Close` 算正常结束；消息流在此之前中断时，缓冲中的数据作废。
struct OutputBuffer {
    pending: VecDeque<u8>,
    state: StreamState,
    exit_status: Option<u32>,
}

impl OutputBuffer {
    fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            state: StreamState::Open,
            exit_status: None,
        }
    }

    fn is_open(&self) -> bool {
        self.state == StreamState::Open
    }

    fn is_eof(&self) -> bool {
        self.state == StreamState::Closed && self.pending.is_empty()
    }

    fn push(&mut self, msg: Option<ChannelMsg>) {
        match msg {
            Some(ChannelMsg::Data { ref data }) => {
                if self.is_open() {
                    self.pending.extend(data.iter());
                }
            }
            Some(ChannelMsg::ExtendedData { ref data, ext }) => {
                debug!("忽略扩展数据 (ext={}): {} 字节", ext, data.len());
            }
            Some(ChannelMsg::ExitStatus { exit_status }) => {
                self.exit_status = Some(exit_status);
            }
            Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) => {
                if self.is_open() {
                    self.state = StreamState::Closed;
                }
            }
            None => {
                if self.is_open() {
                    self.state = StreamState::Interrupted;
                }
            }
            Some(_) => {}
        }
    }

    fn check(&self) -> Result<()> {
        if self.state == StreamState::Interrupted {
            return Err(SshError::ReadInterrupted(
                "session closed before end of output".to_string(),
            ));
        }
        Ok(())
    }

    fn available(&self) -> Result<usize> {
        self.check()?;
        Ok(self.pending.len())
    }

    /// `Pending` 表示需要等待更多消息
    fn poll_byte(&mut self) -> Result<Poll<Option<u8>>> {
        self.check()?;
        if let Some(byte) = self.pending.pop_front() {
            return Ok(Poll::Ready(Some(byte)));
        }
        if self.state == StreamState::Closed {
            return Ok(Poll::Ready(None));
        }
        Ok(Poll::Pending)
    }
}

/// exec 通道，把 russh 消息转换为字节流
struct RusshChannel {
    channel: Option<Channel<Msg>>,
    output: OutputBuffer,
}

impl RusshChannel {
    fn new(channel: Channel<Msg>) -> Self {
        Self {
            channel: Some(channel),
            output: OutputBuffer::new(),
        }
    }
}

#[async_trait]
impl CommandChannel for RusshChannel {
    async fn available(&mut self) -> Result<usize> {
        while self.output.is_open() {
            let Some(channel) = self.channel.as_mut() else {
                self.output.push(None);
                break;
            };
            match channel.wait().now_or_never() {
                Some(msg) => self.output.push(msg),
                None => break,
            }
        }
        self.output.available()
    }

    fn is_eof(&self) -> bool {
        self.output.is_eof()
    }

    async fn read_byte(&mut self) -> Result<Option<u8>> {
        loop {
            if let Poll::Ready(byte) = self.output.poll_byte()? {
                return Ok(byte);
            }
            let msg = match self.channel.as_mut() {
                Some(channel) => channel.wait().await,
                None => None,
            };
            self.output.push(msg);
        }
    }

    async fn disconnect(&mut self) {
        if let Some(channel) = self.channel.take() {
            if let Err(e) = channel.close().await {
                debug!("关闭 exec 通道失败: {}", e);
            }
            debug!("exec 通道已关闭, 退出码: {:?}", self.output.exit_status);
        }
    }
}
