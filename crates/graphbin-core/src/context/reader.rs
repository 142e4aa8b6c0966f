use std::sync::Arc;

use bytes::{Buf, Bytes};
use tracing::trace;

use crate::buffer::cursor;
use crate::codec::TypeRegistry;
use crate::config::DecodeLimits;
use crate::error::{Result, SerializationError};
use crate::marker::{TypeMarker, ValueFlag};
use crate::value::Value;

/// 读路径上下文：把“完整值”解析为 [`Value`]。
///
/// # 流程（How）
/// 1. 读取 1 字节类型标记，立即向注册表解析编解码器；未知标记在读取空值标志之前就报告 `UnknownType`；
/// 2. 读取 1 字节空值标志，`0x01` 直接返回 [`Value::Null`]，其余非 `0x00` 取值为畸形负载；
/// 3. 否则把剩余缓冲交给编解码器读取负载。
///
/// 无类型空值标记 `0xFE` 不经注册表：后随 `0x01` 时为空值，后随 `0x00` 时为畸形负载。
///
/// # 递归帧
/// 每个非空值的负载在深度加一的子上下文中读取，子上下文共享注册表与预算。
/// 配置了 [`DecodeLimits::max_depth`] 时，进入超出上限的帧返回 `BudgetExceeded`，
/// 嵌套深度因此不会把调用栈耗尽。
///
/// # 契约（What）
/// - 成功时缓冲恰好前进一个完整值的长度；
/// - 失败时缓冲位置未定义，调用方应丢弃整个消息，不得尝试在同一缓冲上恢复。
#[derive(Clone, Debug)]
pub struct GraphBinaryReader {
    registry: Arc<TypeRegistry>,
    limits: DecodeLimits,
    depth: usize,
}

impl GraphBinaryReader {
    /// 依据声明长度预分配的元素上限，超出部分随读取增长。
    pub const MAX_PREALLOCATION: usize = 1024;

    /// 使用给定注册表、不设解码上限。
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_limits(registry, DecodeLimits::UNLIMITED)
    }

    /// 使用给定注册表与解码预算。
    pub fn with_limits(registry: Arc<TypeRegistry>, limits: DecodeLimits) -> Self {
        Self {
            registry,
            limits,
            depth: 0,
        }
    }

    /// 注册表。
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// 解码预算。
    pub fn limits(&self) -> DecodeLimits {
        self.limits
    }

    /// 当前帧的嵌套深度；顶层上下文为 0，顶层值的负载在深度 1 读取。
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 按声明的元素数给出预分配容量。
    ///
    /// 声明值只通过了“剩余字节足够”的粗检，嵌套的每一层都能据此声明接近整个输入的元素数；
    /// 容量因此截断到 [`Self::MAX_PREALLOCATION`]，真实元素更多时由集合自行扩容。
    pub fn capacity_hint(&self, declared: usize) -> usize {
        declared.min(Self::MAX_PREALLOCATION)
    }

    /// 读取一个完整值。
    pub fn read(&self, buf: &mut Bytes) -> Result<Value> {
        let marker = TypeMarker::new(cursor::read_u8(buf, "type marker")?);
        if marker == TypeMarker::UNSPECIFIED_NULL {
            return match ValueFlag::from_wire(cursor::read_u8(buf, "value flag")?)? {
                ValueFlag::Absent => Ok(Value::Null),
                ValueFlag::Present => Err(SerializationError::malformed(
                    "unspecified null marker must carry the absent flag",
                )),
            };
        }

        let codec = self.registry.resolve(marker)?;
        match ValueFlag::from_wire(cursor::read_u8(buf, "value flag")?)? {
            ValueFlag::Absent => {
                trace!(%marker, "typed null");
                Ok(Value::Null)
            }
            ValueFlag::Present => {
                let frame = self.enter_frame()?;
                trace!(
                    %marker,
                    codec = codec.type_name(),
                    depth = frame.depth,
                    "decoding payload"
                );
                codec.read_value(buf, &frame)
            }
        }
    }

    /// 读取复合类型的元素数前缀。
    ///
    /// `min_element_size` 为单个元素在线上至少占用的字节数；
    /// 声明的元素数乘以该值超过剩余字节时，提前判定为畸形负载，避免按伪造的长度预分配。
    pub fn read_length(
        &self,
        buf: &mut Bytes,
        min_element_size: usize,
        what: &'static str,
    ) -> Result<usize> {
        let len = read_non_negative(buf, what)?;
        self.limits.check_collection(what, len)?;
        let required = len.saturating_mul(min_element_size);
        if required > buf.remaining() {
            return Err(SerializationError::malformed(format!(
                "{what} declares {len} elements but only {} bytes remain",
                buf.remaining()
            )));
        }
        Ok(len)
    }

    /// 读取 String/Binary 的字节长度前缀。
    pub fn read_byte_length(&self, buf: &mut Bytes, what: &'static str) -> Result<usize> {
        let len = read_non_negative(buf, what)?;
        self.limits.check_bytes(what, len)?;
        Ok(len)
    }

    fn enter_frame(&self) -> Result<Self> {
        let depth = self.depth + 1;
        self.limits.check_depth(depth)?;
        Ok(Self {
            registry: Arc::clone(&self.registry),
            limits: self.limits,
            depth,
        })
    }
}

impl Default for GraphBinaryReader {
    fn default() -> Self {
        Self::new(TypeRegistry::standard())
    }
}

fn read_non_negative(buf: &mut Bytes, what: &'static str) -> Result<usize> {
    let raw = cursor::read_i32(buf, what)?;
    usize::try_from(raw)
        .map_err(|_| SerializationError::malformed(format!("negative {what} length {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes;

    #[test]
    fn unknown_marker_is_reported_before_the_flag() {
        let reader = GraphBinaryReader::default();
        let mut buf = Bytes::from_static(&[0x99]);
        let err = reader.read(&mut buf).expect_err("0x99 未注册");
        assert_eq!(err.code(), codes::PROTOCOL_UNKNOWN_TYPE);
    }

    #[test]
    fn typed_and_untyped_nulls_decode_to_null() {
        let reader = GraphBinaryReader::default();
        let mut buf = Bytes::from_static(&[0x0A, 0x01, 0xFE, 0x01]);
        assert_eq!(reader.read(&mut buf), Ok(Value::Null));
        assert_eq!(reader.read(&mut buf), Ok(Value::Null));
        assert!(buf.is_empty());
    }

    #[test]
    fn unspecified_null_with_present_flag_is_malformed() {
        let reader = GraphBinaryReader::default();
        let mut buf = Bytes::from_static(&[0xFE, 0x00]);
        let err = reader.read(&mut buf).expect_err("0xFE 只能表示空值");
        assert_eq!(err.code(), codes::PROTOCOL_DECODE);
    }

    #[test]
    fn invalid_flag_is_malformed() {
        let reader = GraphBinaryReader::default();
        let mut buf = Bytes::from_static(&[0x01, 0x07, 0, 0, 0, 1]);
        let err = reader.read(&mut buf).expect_err("0x07 不是合法空值标志");
        assert_eq!(err.code(), codes::PROTOCOL_DECODE);
    }

    #[test]
    fn collection_budget_is_enforced_before_remaining_bytes() {
        let reader = GraphBinaryReader::with_limits(
            TypeRegistry::standard(),
            DecodeLimits {
                max_collection_len: Some(1),
                ..DecodeLimits::UNLIMITED
            },
        );
        let mut buf = Bytes::from_static(&[0, 0, 0, 2]);
        let err = reader.read_length(&mut buf, 2, "list").expect_err("超出预算");
        assert_eq!(
            err,
            SerializationError::BudgetExceeded {
                what: "list",
                declared: 2,
                limit: 1,
            }
        );
    }

    #[test]
    fn negative_byte_length_is_malformed() {
        let reader = GraphBinaryReader::default();
        let mut buf = Bytes::from_static(&[0xFF, 0xFF, 0xFF, 0xFE]);
        let err = reader
            .read_byte_length(&mut buf, "string")
            .expect_err("长度为 -2");
        assert!(err.to_string().contains("negative string length -2"));
    }

    fn nested_lists(levels: usize) -> Bytes {
        let mut bytes = Vec::with_capacity(levels * 6 + 2);
        for _ in 0..levels {
            bytes.extend_from_slice(&[0x09, 0x00, 0, 0, 0, 1]);
        }
        bytes.extend_from_slice(&[0xFE, 0x01]);
        Bytes::from(bytes)
    }

    #[test]
    fn depth_limit_counts_each_present_frame() {
        let limits = DecodeLimits {
            max_depth: Some(3),
            ..DecodeLimits::UNLIMITED
        };
        let reader = GraphBinaryReader::with_limits(TypeRegistry::standard(), limits);
        assert_eq!(reader.depth(), 0);

        // [[[null]]]：三层 List 负载，空值不进入新帧。
        let mut buf = nested_lists(3);
        assert!(reader.read(&mut buf).is_ok());
        assert!(buf.is_empty());

        let mut buf = nested_lists(4);
        let err = reader.read(&mut buf).expect_err("第 4 层超出上限");
        assert_eq!(
            err,
            SerializationError::BudgetExceeded {
                what: "nesting depth",
                declared: 4,
                limit: 3,
            }
        );
    }

    #[test]
    fn deep_nesting_stops_at_the_limit_instead_of_the_stack() {
        let limits = DecodeLimits {
            max_depth: Some(64),
            ..DecodeLimits::UNLIMITED
        };
        let reader = GraphBinaryReader::with_limits(TypeRegistry::standard(), limits);
        let mut buf = nested_lists(5000);
        let err = reader.read(&mut buf).expect_err("5000 层超出上限");
        assert_eq!(err.code(), codes::PROTOCOL_BUDGET_EXCEEDED);
    }

    #[test]
    fn capacity_hint_is_capped() {
        let reader = GraphBinaryReader::default();
        assert_eq!(reader.capacity_hint(3), 3);
        assert_eq!(
            reader.capacity_hint(usize::MAX),
            GraphBinaryReader::MAX_PREALLOCATION
        );
    }
}
