//! 测试处理器抽象接口

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 测试请求
///
/// `endpoint` 的格式由具体处理器解释，`test_block` 为待执行的测试内容。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// 目标端点（原始字符串）
    pub endpoint: String,

    /// 测试内容（可包含多行）
    pub test_block: String,
}

impl Request {
    pub fn new(endpoint: impl Into<String>, test_block: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            test_block: test_block.into(),
        }
    }
}

/// 测试响应
///
/// `text` 为 `None` 表示执行失败，失败原因只通过日志体现。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// 响应文本
    pub text: Option<String>,
}

impl Response {
    /// 成功响应（文本可为空）
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// 失败响应
    pub fn failure() -> Self {
        Self { text: None }
    }

    pub fn is_failure(&self) -> bool {
        self.text.is_none()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// 测试处理器 trait
///
/// 所有执行后端必须实现此 trait，框架只通过它调用后端。
#[async_trait]
pub trait TestProcessor: Send + Sync {
    /// 执行一次测试请求
    ///
    /// 任何失败都转换为 `Response::failure()`，不会向调用方返回错误。
    async fn execute_test(&self, request: &Request) -> Response;

    /// 处理器名称（用于日志中的组件名）
    fn name(&self) -> &str;
}
