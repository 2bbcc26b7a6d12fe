//! 执行器配置

use std::time::Duration;

use atp_processor::{Logger, PropertyStore};

/// 响应超时属性键（毫秒）
pub const RESPONSE_TIMEOUT_KEY: &str = "jschtestprocessor.response.timeout";

/// 默认响应超时（30 秒）
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(30_000);

/// 默认轮询间隔（1 秒）
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1_000);

/// 命令分隔符
pub const DEFAULT_COMMAND_SEPARATOR: &str = ";";

/// 执行器配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// 属性未设置时的首字节超时
    pub default_timeout: Duration,
    /// 等待首字节时的轮询间隔
    pub poll_interval: Duration,
    /// 多行命令的连接符
    pub command_separator: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_RESPONSE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            command_separator: DEFAULT_COMMAND_SEPARATOR.to_string(),
        }
    }
}

impl ExecutorConfig {
    /// 设置默认超时
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// 设置轮询间隔
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// 设置命令分隔符
    pub fn command_separator(mut self, separator: impl Into<String>) -> Self {
        self.command_separator = separator.into();
        self
    }

    /// 从测试属性解析首字节超时
    ///
    /// 属性存在且为数字时使用属性值，否则回退到 `default_timeout`。
    pub fn resolve_response_timeout(
        &self,
        properties: &dyn PropertyStore,
        logger: &dyn Logger,
        component: &str,
    ) -> Duration {
        let default_ms = self.default_timeout.as_millis();

        match properties.first_value(RESPONSE_TIMEOUT_KEY) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => {
                    logger.debug(&format!("Timeout set to {} milliseconds", ms), component);
                    Duration::from_millis(ms)
                }
                Err(_) => {
                    logger.debug(
                        &format!(
                            "Timeout property {} is not a number ('{}'). Defaulting to {} milliseconds",
                            RESPONSE_TIMEOUT_KEY, raw, default_ms
                        ),
                        component,
                    );
                    self.default_timeout
                }
            },
            None => {
                logger.debug(
                    &format!(
                        "Timeout not set in properties file. Defaulting to {} milliseconds",
                        default_ms
                    ),
                    component,
                );
                logger.debug(
                    &format!("To set timeout, add property {}", RESPONSE_TIMEOUT_KEY),
                    component,
                );
                self.default_timeout
            }
        }
    }
}
