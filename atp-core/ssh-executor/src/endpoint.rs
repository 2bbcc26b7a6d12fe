//! 端点解析
//!
//! 端点格式为 `USERNAME:PASSWORD@HOST:PORT`，形状不符即解析失败，不返回部分结果。

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SshError};

const ENDPOINT_FORMAT_MSG: &str = "SSH endpoint must be in this format: USERNAME:PASSWORD@IP:PORT";
const PASSWORD_HOST_MSG: &str = "PASSWORD and IP in endpoint must be separated by @";

/// SSH 连接端点
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// 解析 `USERNAME:PASSWORD@HOST:PORT`
    pub fn parse(raw: &str) -> Result<Self> {
        let segments: Vec<&str> = raw.split(':').collect();
        if segments.len() != 3 {
            return Err(SshError::MalformedEndpoint(ENDPOINT_FORMAT_MSG.to_string()));
        }

        let username = segments[0];
        let port = segments[2].parse::<u16>().map_err(|_| {
            SshError::MalformedEndpoint(format!(
                "PORT in endpoint must be a number between 0 and 65535, got '{}'",
                segments[2]
            ))
        })?;

        let pass_host: Vec<&str> = segments[1].split('@').collect();
        if pass_host.len() != 2 || pass_host[1].is_empty() {
            return Err(SshError::MalformedEndpoint(PASSWORD_HOST_MSG.to_string()));
        }

        Ok(Self {
            username: username.to_string(),
            password: pass_host[0].to_string(),
            host: pass_host[1].to_string(),
            port,
        })
    }

    /// 获取 SSH 地址字符串（host:port 格式）
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = SshError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// 密码不出现在日志中
impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:***@{}:{}", self.username, self.host, self.port)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("username", &self.username)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_malformed(raw: &str) {
        assert!(
            matches!(Endpoint::parse(raw), Err(SshError::MalformedEndpoint(_))),
            "expected '{}' to be rejected",
            raw
        );
    }

    #[test]
    fn test_parse_well_formed() {
        let endpoint = Endpoint::parse("root:secret@192.168.1.100:22").unwrap();
        assert_eq!(endpoint.username, "root");
        assert_eq!(endpoint.password, "secret");
        assert_eq!(endpoint.host, "192.168.1.100");
        assert_eq!(endpoint.port, 22);
        assert_eq!(endpoint.address(), "192.168.1.100:22");
    }

    #[test]
    fn test_parse_hostname_and_high_port() {
        let endpoint: Endpoint = "admin:p4ss@build-01.lab:2222".parse().unwrap();
        assert_eq!(endpoint.host, "build-01.lab");
        assert_eq!(endpoint.port, 2222);
    }

    #[test]
    fn test_empty_password_allowed() {
        let endpoint = Endpoint::parse("guest:@10.0.0.1:22").unwrap();
        assert_eq!(endpoint.password, "");
        assert_eq!(endpoint.host, "10.0.0.1");
    }

    #[test]
    fn test_wrong_segment_count() {
        assert_malformed("root@10.0.0.1:22");
        assert_malformed("root:secret@10.0.0.1");
        assert_malformed("root:secret@10.0.0.1:22:extra");
        assert_malformed("");
    }

    #[test]
    fn test_wrong_at_count() {
        assert_malformed("root:secret10.0.0.1:22");
        assert_malformed("root:se@cret@10.0.0.1:22");
        assert_malformed("root:secret@:22");
    }

    #[test]
    fn test_segment_count_message() {
        let err = Endpoint::parse("nonsense").unwrap_err();
        assert!(err.to_string().contains("USERNAME:PASSWORD@IP:PORT"));
    }

    #[test]
    fn test_at_separator_message() {
        let err = Endpoint::parse("root:secret:22").unwrap_err();
        assert!(err.to_string().contains("separated by @"));
    }

    #[test]
    fn test_non_numeric_port() {
        assert_malformed("root:secret@10.0.0.1:ssh");
        assert_malformed("root:secret@10.0.0.1:");
        assert_malformed("root:secret@10.0.0.1:70000");
        assert_malformed("root:secret@10.0.0.1:-1");
    }

    #[test]
    fn test_port_with_whitespace() {
        assert_malformed("root:secret@10.0.0.1: 22");
        assert_malformed("root:secret@10.0.0.1:22 ");
    }

    #[test]
    fn test_display_masks_password() {
        let endpoint = Endpoint::parse("root:secret@10.0.0.1:22").unwrap();
        assert_eq!(endpoint.to_string(), "root:***@10.0.0.1:22");
        assert!(!format!("{:?}", endpoint).contains("secret"));
    }
}
