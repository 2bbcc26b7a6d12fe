//! 测试属性
//!
//! 测试属性是框架级的多值键值存储，处理器只通过 `PropertyStore` 读取。
//!
//! 属性文件为 TOML 格式，嵌套表展开为点分键：
//!
//! ```toml
//! [jschtestprocessor.response]
//! timeout = 5000
//! ```
//!
//! 等价于键 `jschtestprocessor.response.timeout` 的值 `"5000"`。数组展开为同一键的多个值。
//!
//! 属性文件搜索路径 (按优先级):
//! 1. `ATP_TEST_PROPERTIES` 环境变量指定的路径
//! 2. `./test.toml` (当前目录)
//! 3. `./tests/config.toml` (tests 目录)
//! 4. `~/.config/atp/test.toml` (用户配置目录)
//! 5. `/etc/atp/test.toml` (系统配置目录)

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::debug;

use crate::{ProcessorError, Result};

/// 测试属性读取接口
pub trait PropertyStore: Send + Sync {
    /// 获取键对应的第一个值
    fn first_value(&self, key: &str) -> Option<String>;

    /// 检查键是否存在
    fn property_exists(&self, key: &str) -> bool {
        self.first_value(key).is_some()
    }
}

/// 测试属性（默认实现）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestProperties {
    values: HashMap<String, Vec<String>>,
}

impl TestProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个值
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// 追加一个值（builder 形式）
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// 覆盖一个键的全部值
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), vec![value.into()]);
    }

    /// 获取键对应的全部值
    pub fn values(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: Table = content
            .parse()
            .map_err(|e: toml::de::Error| ProcessorError::PropertiesParseError(e.to_string()))?;

        let mut properties = Self::new();
        properties.flatten_table("", &table);
        Ok(properties)
    }

    /// 从指定文件加载
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ProcessorError::PropertiesParseError(msg) => {
                ProcessorError::PropertiesParseError(format!("{:?}: {}", path, msg))
            }
            other => other,
        })
    }

    /// 按搜索路径加载，找不到属性文件时返回空属性
    pub fn load() -> Result<Self> {
        match Self::find_properties_file() {
            Some(path) => {
                debug!("Loading test properties from: {:?}", path);
                Self::load_from_file(&path)
            }
            None => {
                debug!("No test properties file found, using empty properties");
                Ok(Self::new())
            }
        }
    }

    /// 查找属性文件 (按优先级搜索)
    fn find_properties_file() -> Option<PathBuf> {
        // 1. 环境变量指定的路径
        if let Ok(path) = env::var("ATP_TEST_PROPERTIES") {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }

        // 2. 当前目录
        let mut paths = vec![
            PathBuf::from("./test.toml"),
            PathBuf::from("./tests/config.toml"),
        ];

        // 3. 用户配置目录
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config/atp/test.toml"));
        }

        // 4. 系统配置目录 (Linux)
        #[cfg(target_os = "linux")]
        paths.push(PathBuf::from("/etc/atp/test.toml"));

        paths.into_iter().find(|path| path.exists())
    }

    fn flatten_table(&mut self, prefix: &str, table: &Table) {
        for (key, value) in table {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            self.flatten_value(&full_key, value);
        }
    }

    fn flatten_value(&mut self, key: &str, value: &Value) {
        match value {
            Value::Table(table) => self.flatten_table(key, table),
            Value::Array(items) => {
                for item in items {
                    self.flatten_value(key, item);
                }
            }
            Value::String(s) => self.insert(key, s.as_str()),
            Value::Integer(i) => self.insert(key, i.to_string()),
            Value::Float(f) => self.insert(key, f.to_string()),
            Value::Boolean(b) => self.insert(key, b.to_string()),
            Value::Datetime(d) => self.insert(key, d.to_string()),
        }
    }
}

impl PropertyStore for TestProperties {
    fn first_value(&self, key: &str) -> Option<String> {
        self.values.get(key).and_then(|values| values.first().cloned())
    }
}
