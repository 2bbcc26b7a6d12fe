//! 测试公共模块
//! 提供模拟传输、记录型日志和处理器构造函数

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use atp_processor::{Logger, TestProperties};
use atp_ssh_executor::*;
use tokio::time::Instant;

/// 打开/关闭计数
#[derive(Default)]
pub struct Tracker {
    pub connects: AtomicUsize,
    pub sessions_opened: AtomicUsize,
    pub sessions_closed: AtomicUsize,
    pub channels_opened: AtomicUsize,
    pub channels_closed: AtomicUsize,
    pub commands: Mutex<Vec<String>>,
}

impl Tracker {
    pub fn open_sessions(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst) - self.sessions_closed.load(Ordering::SeqCst)
    }

    pub fn open_channels(&self) -> usize {
        self.channels_opened.load(Ordering::SeqCst) - self.channels_closed.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

/// 模拟远端在通道上的行为
#[derive(Clone)]
pub struct ChannelScript {
    /// 标准输出内容
    pub output: Vec<u8>,
    /// 输出在通道打开多久后可读，`None` 表示永不输出
    pub ready_after: Option<Duration>,
    /// 输出读完后是否关闭
    pub closes: bool,
    /// 读取时是否报错
    pub fail_read: bool,
}

impl ChannelScript {
    /// 立即输出并关闭
    pub fn echo(output: &str) -> Self {
        Self {
            output: output.as_bytes().to_vec(),
            ready_after: Some(Duration::ZERO),
            closes: true,
            fail_read: false,
        }
    }

    /// 延迟输出并关闭
    pub fn delayed(output: &str, delay: Duration) -> Self {
        Self {
            ready_after: Some(delay),
            ..Self::echo(output)
        }
    }

    /// 永不输出、永不关闭
    pub fn silent() -> Self {
        Self {
            output: Vec::new(),
            ready_after: None,
            closes: false,
            fail_read: false,
        }
    }

    /// 读取时被中断
    pub fn interrupted() -> Self {
        Self {
            fail_read: true,
            ..Self::echo("partial")
        }
    }
}

/// 模拟传输
pub struct MockTransport {
    pub tracker: Arc<Tracker>,
    pub fail_connect: bool,
    pub fail_channel: bool,
    pub script: ChannelScript,
}

impl MockTransport {
    pub fn new(script: ChannelScript) -> Self {
        Self {
            tracker: Arc::new(Tracker::default()),
            fail_connect: false,
            fail_channel: false,
            script,
        }
    }

    pub fn failing_connect() -> Self {
        Self {
            fail_connect: true,
            ..Self::new(ChannelScript::echo(""))
        }
    }

    pub fn failing_channel() -> Self {
        Self {
            fail_channel: true,
            ..Self::new(ChannelScript::echo(""))
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, _endpoint: &Endpoint) -> Result<Box<dyn RemoteSession>> {
        self.tracker.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect {
            return Err(SshError::ConnectError("Auth fail".to_string()));
        }
        self.tracker.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            tracker: Arc::clone(&self.tracker),
            fail_channel: self.fail_channel,
            script: self.script.clone(),
            closed: false,
        }))
    }
}

struct MockSession {
    tracker: Arc<Tracker>,
    fail_channel: bool,
    script: ChannelScript,
    closed: bool,
}

#[async_trait]
impl RemoteSession for MockSession {
    async fn open_exec(&mut self, command: &str) -> Result<Box<dyn CommandChannel>> {
        self.tracker.commands.lock().unwrap().push(command.to_string());
        if self.fail_channel {
            return Err(SshError::ChannelError("channel is not opened".to_string()));
        }
        self.tracker.channels_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockChannel {
            tracker: Arc::clone(&self.tracker),
            script: self.script.clone(),
            opened_at: Instant::now(),
            pos: 0,
            closed: false,
        }))
    }

    async fn disconnect(&mut self) {
        if !self.closed {
            self.closed = true;
            self.tracker.sessions_closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

struct MockChannel {
    tracker: Arc<Tracker>,
    script: ChannelScript,
    opened_at: Instant,
    pos: usize,
    closed: bool,
}

impl MockChannel {
    fn ready(&self) -> bool {
        match self.script.ready_after {
            Some(delay) => self.opened_at.elapsed() >= delay,
            None => false,
        }
    }
}

#[async_trait]
impl CommandChannel for MockChannel {
    async fn available(&mut self) -> Result<usize> {
        if self.script.fail_read {
            return Err(SshError::ReadInterrupted("stream interrupted".to_string()));
        }
        if self.ready() {
            Ok(self.script.output.len() - self.pos)
        } else {
            Ok(0)
        }
    }

    fn is_eof(&self) -> bool {
        self.ready() && self.script.closes && self.pos >= self.script.output.len()
    }

    async fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.script.fail_read {
            return Err(SshError::ReadInterrupted("stream interrupted".to_string()));
        }
        if self.ready() && self.pos < self.script.output.len() {
            let byte = self.script.output[self.pos];
            self.pos += 1;
            return Ok(Some(byte));
        }
        if self.ready() && self.script.closes {
            return Ok(None);
        }
        std::future::pending::<()>().await;
        Ok(None)
    }

    async fn disconnect(&mut self) {
        if !self.closed {
            self.closed = true;
            self.tracker.channels_closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// 记录型日志
#[derive(Default)]
pub struct RecordingLogger {
    pub errors: Mutex<Vec<String>>,
    pub debugs: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn has_error(&self, needle: &str) -> bool {
        self.errors.lock().unwrap().iter().any(|m| m.contains(needle))
    }

    pub fn has_debug(&self, needle: &str) -> bool {
        self.debugs.lock().unwrap().iter().any(|m| m.contains(needle))
    }
}

impl Logger for RecordingLogger {
    fn error(&self, message: &str, _component: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn debug(&self, message: &str, _component: &str) {
        self.debugs.lock().unwrap().push(message.to_string());
    }
}

/// 构造处理器
pub fn processor(
    transport: MockTransport,
    properties: TestProperties,
) -> (SshTestProcessor, Arc<Tracker>, Arc<RecordingLogger>) {
    let tracker = Arc::clone(&transport.tracker);
    let logger = Arc::new(RecordingLogger::default());
    let processor = SshTestProcessor::new(
        Arc::new(transport),
        Arc::new(properties),
        Arc::clone(&logger) as Arc<dyn Logger>,
    );
    (processor, tracker, logger)
}

pub const ENDPOINT: &str = "root:secret@10.0.0.1:22";
