//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义序列化引擎对外暴露的全部失败语义，任何一层递归帧产生的错误都原样向上传播；
//! - 每个变体都映射到 [`codes`] 中的稳定错误码，便于日志与指标按码聚合。
//!
//! ## 设计要求（What）
//! - 错误类型派生 `thiserror::Error`，兼容 `std::error::Error`；
//! - 变体满足 `Clone + PartialEq`，测试可以直接断言具体错误；
//! - 核心从不内部重试，是否重新拉取数据由调用方决定。

use std::borrow::Cow;

use thiserror::Error;

use crate::marker::TypeMarker;

/// 稳定错误码常量。
///
/// 命名沿用 `<领域>.<语义>` 的点分格式，跨版本保持不变。
pub mod codes {
    /// 线上出现了注册表中不存在的类型标记。
    pub const PROTOCOL_UNKNOWN_TYPE: &str = "protocol.unknown_type";
    /// 待写入的值在注册表中没有对应编解码器。
    pub const PROTOCOL_UNREGISTERED_TYPE: &str = "protocol.unregistered_type";
    /// 负载违反结构约束：长度为负、缓冲提前耗尽、标志非法等。
    pub const PROTOCOL_DECODE: &str = "protocol.decode";
    /// 声明长度超过解码预算。
    pub const PROTOCOL_BUDGET_EXCEEDED: &str = "protocol.budget_exceeded";
    /// 编解码器收到了不属于自己的值变体。
    pub const PROTOCOL_TYPE_MISMATCH: &str = "protocol.type_mismatch";
    /// 写入长度超出 4 字节有符号前缀的表示范围。
    pub const PROTOCOL_LENGTH_OVERFLOW: &str = "protocol.length_overflow";
    /// 注册表构建阶段的冲突。
    pub const REGISTRY_CONFLICT: &str = "registry.conflict";
    /// 分配器无法提供所需缓冲。
    pub const BUFFER_ALLOCATION_FAILED: &str = "buffer.allocation_failed";
}

/// 序列化引擎的错误域。
///
/// # 契约说明（What）
/// - `UnknownType`/`UnregisteredType`/`MalformedPayload` 对应协议定义的三类致命错误；
/// - 其余变体覆盖预算、注册与分配等周边失败；
/// - 所有变体都只描述“本次调用”失败，不残留任何跨调用状态。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SerializationError {
    /// 读取到的类型标记没有注册编解码器（流损坏或协议版本不匹配）。
    #[error("no codec registered for type marker {marker}")]
    UnknownType {
        /// 线上读到的标记。
        marker: TypeMarker,
    },

    /// 待写入值的运行时类型没有注册编解码器（调用方或配置错误）。
    #[error("value of kind `{kind}` (marker {marker}) has no registered codec")]
    UnregisteredType {
        /// 值的类型名称。
        kind: &'static str,
        /// 值对应的类型标记。
        marker: TypeMarker,
    },

    /// 负载违反结构约束。
    #[error("malformed payload: {reason}")]
    MalformedPayload {
        /// 人类可读的失败原因。
        reason: Cow<'static, str>,
    },

    /// 声明长度超出解码预算。
    #[error("{what} length {declared} exceeds decode budget {limit}")]
    BudgetExceeded {
        /// 触发预算检查的结构名称。
        what: &'static str,
        /// 线上声明的长度。
        declared: usize,
        /// 配置的上限。
        limit: usize,
    },

    /// 编解码器收到了不属于自己的值变体。
    #[error("codec `{codec}` cannot encode a `{actual}` value")]
    TypeMismatch {
        /// 编解码器名称。
        codec: &'static str,
        /// 实际收到的值类型。
        actual: &'static str,
    },

    /// 元素数或字节数无法用 4 字节有符号整数表示。
    #[error("length {len} does not fit a signed 32-bit prefix")]
    LengthOverflow {
        /// 实际长度。
        len: usize,
    },

    /// 同一类型标记被注册了两次。
    #[error("type marker {marker} is already registered")]
    DuplicateRegistration {
        /// 冲突的标记。
        marker: TypeMarker,
    },

    /// 试图为上下文保留的标记注册编解码器。
    #[error("type marker {marker} is reserved by the serialization context")]
    ReservedMarker {
        /// 被保留的标记。
        marker: TypeMarker,
    },

    /// 分配器未能提供缓冲。
    #[error("failed to allocate {requested} bytes: {detail}")]
    Allocation {
        /// 请求的最小容量。
        requested: usize,
        /// 分配器给出的原因。
        detail: String,
    },
}

impl SerializationError {
    /// 构造 `MalformedPayload`。
    pub fn malformed(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }

    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownType { .. } => codes::PROTOCOL_UNKNOWN_TYPE,
            Self::UnregisteredType { .. } => codes::PROTOCOL_UNREGISTERED_TYPE,
            Self::MalformedPayload { .. } => codes::PROTOCOL_DECODE,
            Self::BudgetExceeded { .. } => codes::PROTOCOL_BUDGET_EXCEEDED,
            Self::TypeMismatch { .. } => codes::PROTOCOL_TYPE_MISMATCH,
            Self::LengthOverflow { .. } => codes::PROTOCOL_LENGTH_OVERFLOW,
            Self::DuplicateRegistration { .. } | Self::ReservedMarker { .. } => {
                codes::REGISTRY_CONFLICT
            }
            Self::Allocation { .. } => codes::BUFFER_ALLOCATION_FAILED,
        }
    }
}

/// 默认错误类型为 [`SerializationError`] 的结果别名。
pub type Result<T, E = SerializationError> = core::result::Result<T, E>;
