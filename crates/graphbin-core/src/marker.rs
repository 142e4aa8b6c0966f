//! 类型标记与空值标志：每个线上值的两字节头部。

use core::fmt;

use crate::error::{Result, SerializationError};

/// 一字节类型标记。
///
/// # 设计说明
/// - 采用 `u8` 新类型而非封闭枚举，扩展类型可以占用任意未使用的标记，无需修改本模块；
/// - 关联常量覆盖内置编解码器使用的标记，取值与 GraphBinary v1 对齐。
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeMarker(u8);

impl TypeMarker {
    /// 32 位有符号整数。
    pub const INT: Self = Self(0x01);
    /// 64 位有符号整数。
    pub const LONG: Self = Self(0x02);
    /// UTF-8 字符串。
    pub const STRING: Self = Self(0x03);
    /// 自 Unix 纪元起的毫秒数。
    pub const DATE: Self = Self(0x04);
    /// IEEE-754 双精度浮点。
    pub const DOUBLE: Self = Self(0x07);
    /// IEEE-754 单精度浮点。
    pub const FLOAT: Self = Self(0x08);
    /// 有序列表。
    pub const LIST: Self = Self(0x09);
    /// 键值映射。
    pub const MAP: Self = Self(0x0A);
    /// 集合。
    pub const SET: Self = Self(0x0B);
    /// 128 位 UUID。
    pub const UUID: Self = Self(0x0C);
    /// 8 位有符号整数。
    pub const BYTE: Self = Self(0x24);
    /// 原始字节序列。
    pub const BINARY: Self = Self(0x25);
    /// 16 位有符号整数。
    pub const SHORT: Self = Self(0x26);
    /// 布尔值。
    pub const BOOLEAN: Self = Self(0x27);
    /// 无类型空值，只能与“缺失”标志一同出现。
    pub const UNSPECIFIED_NULL: Self = Self(0xFE);

    /// 由原始字节构造标记。
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// 返回原始字节。
    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for TypeMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeMarker({:#04x})", self.0)
    }
}

impl fmt::Display for TypeMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

impl From<u8> for TypeMarker {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

/// 紧随类型标记的空值标志。
///
/// - `Present`（`0x00`）：随后跟随负载；
/// - `Absent`（`0x01`）：值缺失，之后不再有任何负载字节。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueFlag {
    /// 值存在。
    Present,
    /// 值缺失。
    Absent,
}

impl ValueFlag {
    /// 线上字节。
    pub const fn as_u8(self) -> u8 {
        match self {
            ValueFlag::Present => 0x00,
            ValueFlag::Absent => 0x01,
        }
    }

    /// 解析线上字节，除 `0x00`/`0x01` 以外的取值均视为畸形负载。
    pub fn from_wire(raw: u8) -> Result<Self> {
        match raw {
            0x00 => Ok(ValueFlag::Present),
            0x01 => Ok(ValueFlag::Absent),
            other => Err(SerializationError::malformed(format!(
                "invalid nullability flag {other:#04x}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_rejects_unknown_bytes() {
        assert_eq!(ValueFlag::from_wire(0x00), Ok(ValueFlag::Present));
        assert_eq!(ValueFlag::from_wire(0x01), Ok(ValueFlag::Absent));
        let err = ValueFlag::from_wire(0x02).expect_err("0x02 不是合法标志");
        assert!(matches!(err, SerializationError::MalformedPayload { .. }));
    }

    #[test]
    fn marker_formats_as_hex() {
        assert_eq!(TypeMarker::MAP.to_string(), "0x0a");
        assert_eq!(format!("{:?}", TypeMarker::UNSPECIFIED_NULL), "TypeMarker(0xfe)");
    }
}
