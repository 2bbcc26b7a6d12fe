//! 日志接口
//!
//! 处理器通过注入的 `Logger` 输出日志，不直接查找全局日志对象。

/// 日志接口
pub trait Logger: Send + Sync {
    fn error(&self, message: &str, component: &str);

    fn debug(&self, message: &str, component: &str);
}

/// 基于 tracing 的日志实现
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn error(&self, message: &str, component: &str) {
        tracing::error!(component = %component, "{}", message);
    }

    fn debug(&self, message: &str, component: &str) {
        tracing::debug!(component = %component, "{}", message);
    }
}
