//! 序列化引擎配置。
//!
//! 配置以 TOML 表达，例如：
//!
//! ```toml
//! [decode]
//! max_collection_len = 100000
//! max_byte_len = 16777216
//! max_depth = 128
//! ```
//!
//! 缺省时不设任何上限，此时唯一的约束是“声明长度不能超过剩余字节所能容纳的元素数”。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Result, SerializationError};

/// 顶层配置。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphBinaryConfig {
    /// 解码预算。
    pub decode: DecodeLimits,
}

impl GraphBinaryConfig {
    /// 解析并校验 TOML 文本。
    pub fn from_toml_str(text: &str) -> core::result::Result<Self, ConfigError> {
        let config: GraphBinaryConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验取值范围：上限必须落在 `1..=i32::MAX`。
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        check_limit("decode.max_collection_len", self.decode.max_collection_len)?;
        check_limit("decode.max_byte_len", self.decode.max_byte_len)?;
        check_limit("decode.max_depth", self.decode.max_depth)
    }
}

fn check_limit(field: &'static str, limit: Option<usize>) -> core::result::Result<(), ConfigError> {
    match limit {
        Some(0) => Err(ConfigError::Invalid {
            field,
            reason: "limit must be greater than zero".to_owned(),
        }),
        Some(value) if value > i32::MAX as usize => Err(ConfigError::Invalid {
            field,
            reason: format!("limit {value} exceeds the signed 32-bit length range"),
        }),
        _ => Ok(()),
    }
}

/// 解码预算：限制单个长度前缀可声明的最大值。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeLimits {
    /// List/Set/Map 的最大元素数。
    pub max_collection_len: Option<usize>,
    /// String/Binary 的最大字节数。
    pub max_byte_len: Option<usize>,
    /// 值树的最大嵌套深度：顶层标量为 1，`[1]` 为 2。
    ///
    /// 缺省不设上限，此时深度只受调用栈约束；解码不可信输入时应显式配置。
    pub max_depth: Option<usize>,
}

impl DecodeLimits {
    /// 不设上限。
    pub const UNLIMITED: Self = Self {
        max_collection_len: None,
        max_byte_len: None,
        max_depth: None,
    };

    pub(crate) fn check_collection(&self, what: &'static str, declared: usize) -> Result<()> {
        check_budget(what, declared, self.max_collection_len)
    }

    pub(crate) fn check_bytes(&self, what: &'static str, declared: usize) -> Result<()> {
        check_budget(what, declared, self.max_byte_len)
    }

    pub(crate) fn check_depth(&self, depth: usize) -> Result<()> {
        check_budget("nesting depth", depth, self.max_depth)
    }
}

fn check_budget(what: &'static str, declared: usize, limit: Option<usize>) -> Result<()> {
    match limit {
        Some(limit) if declared > limit => Err(SerializationError::BudgetExceeded {
            what,
            declared,
            limit,
        }),
        _ => Ok(()),
    }
}

/// 配置加载错误。
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML 语法或字段错误。
    #[error("failed to parse graphbin configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// 字段取值非法。
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// 字段路径。
        field: &'static str,
        /// 原因。
        reason: String,
    },
}
