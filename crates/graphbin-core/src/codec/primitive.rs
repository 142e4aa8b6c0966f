//! 定宽基本类型编解码器：负载为固定字节数的大端编码。

use bytes::{Buf, BufMut, Bytes};

use super::{TypeCodec, mismatch};
use crate::buffer::SerializedBuffer;
use crate::buffer::cursor;
use crate::context::{GraphBinaryReader, GraphBinaryWriter};
use crate::error::{Result, SerializationError};
use crate::marker::TypeMarker;
use crate::value::Value;

macro_rules! fixed_width_codec {
    (
        $(#[$doc:meta])*
        $codec:ident => $marker:ident, $name:literal, $variant:ident, $width:expr, $get:ident, $put:ident
    ) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $codec;

        impl TypeCodec for $codec {
            fn marker(&self) -> TypeMarker {
                TypeMarker::$marker
            }

            fn type_name(&self) -> &'static str {
                $name
            }

            fn read_value(&self, buf: &mut Bytes, _ctx: &GraphBinaryReader) -> Result<Value> {
                cursor::ensure(buf, $width, $name)?;
                Ok(Value::$variant(buf.$get()))
            }

            fn write_value(
                &self,
                value: &Value,
                ctx: &GraphBinaryWriter,
            ) -> Result<SerializedBuffer> {
                let Value::$variant(inner) = value else {
                    return Err(mismatch(self, value));
                };
                let mut out = ctx.allocate($width)?;
                out.$put(*inner);
                Ok(out.into())
            }
        }
    };
}

fixed_width_codec! {
    /// 8 位有符号整数。
    ByteCodec => BYTE, "byte", Byte, 1, get_i8, put_i8
}

fixed_width_codec! {
    /// 16 位有符号整数。
    ShortCodec => SHORT, "short", Short, 2, get_i16, put_i16
}

fixed_width_codec! {
    /// 32 位有符号整数。
    IntCodec => INT, "int", Int, 4, get_i32, put_i32
}

fixed_width_codec! {
    /// 64 位有符号整数。
    LongCodec => LONG, "long", Long, 8, get_i64, put_i64
}

fixed_width_codec! {
    /// IEEE-754 单精度浮点，按位保留（包括 `NaN` 载荷）。
    FloatCodec => FLOAT, "float", Float, 4, get_f32, put_f32
}

fixed_width_codec! {
    /// IEEE-754 双精度浮点，按位保留（包括 `NaN` 载荷）。
    DoubleCodec => DOUBLE, "double", Double, 8, get_f64, put_f64
}

fixed_width_codec! {
    /// 自 Unix 纪元起的毫秒数，编码同 64 位整数。
    DateCodec => DATE, "date", Date, 8, get_i64, put_i64
}

fixed_width_codec! {
    /// 128 位 UUID，高位字节在前。
    UuidCodec => UUID, "uuid", Uuid, 16, get_u128, put_u128
}

/// 布尔值：`0x00` 为假，`0x01` 为真，其余字节视为畸形负载。
#[derive(Clone, Copy, Debug, Default)]
pub struct BooleanCodec;

impl TypeCodec for BooleanCodec {
    fn marker(&self) -> TypeMarker {
        TypeMarker::BOOLEAN
    }

    fn type_name(&self) -> &'static str {
        "boolean"
    }

    fn read_value(&self, buf: &mut Bytes, _ctx: &GraphBinaryReader) -> Result<Value> {
        match cursor::read_u8(buf, "boolean")? {
            0x00 => Ok(Value::Boolean(false)),
            0x01 => Ok(Value::Boolean(true)),
            other => Err(SerializationError::malformed(format!(
                "invalid boolean byte {other:#04x}"
            ))),
        }
    }

    fn write_value(&self, value: &Value, ctx: &GraphBinaryWriter) -> Result<SerializedBuffer> {
        let Value::Boolean(flag) = value else {
            return Err(mismatch(self, value));
        };
        let mut out = ctx.allocate(1)?;
        out.put_u8(u8::from(*flag));
        Ok(out.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(codec: &dyn TypeCodec, value: &Value) -> Vec<u8> {
        let writer = GraphBinaryWriter::default();
        codec
            .write_value(value, &writer)
            .expect("写入负载")
            .to_bytes()
            .to_vec()
    }

    #[test]
    fn integers_are_big_endian() {
        assert_eq!(payload(&IntCodec, &Value::Int(1)), [0, 0, 0, 1]);
        assert_eq!(payload(&ShortCodec, &Value::Short(-2)), [0xFF, 0xFE]);
        assert_eq!(
            payload(&LongCodec, &Value::Long(0x0102_0304_0506_0708)),
            [1, 2, 3, 4, 5, 6, 7, 8]
        );
        assert_eq!(payload(&ByteCodec, &Value::Byte(-1)), [0xFF]);
    }

    #[test]
    fn uuid_writes_most_significant_byte_first() {
        let bytes = payload(&UuidCodec, &Value::Uuid(0x0011_2233_4455_6677_8899_AABB_CCDD_EEFF));
        assert_eq!(bytes[0], 0x00);
        assert_eq!(bytes[15], 0xFF);
        assert_eq!(bytes.len(), 16);
    }

    #[test]
    fn truncated_payload_is_malformed() {
        let reader = GraphBinaryReader::default();
        let mut buf = Bytes::from_static(&[0, 0, 1]);
        let err = IntCodec.read_value(&mut buf, &reader).expect_err("只有 3 字节");
        assert!(matches!(err, SerializationError::MalformedPayload { .. }));
    }

    #[test]
    fn boolean_rejects_non_canonical_bytes() {
        let reader = GraphBinaryReader::default();
        let mut buf = Bytes::from_static(&[0x02]);
        let err = BooleanCodec
            .read_value(&mut buf, &reader)
            .expect_err("0x02 不是合法布尔值");
        assert_eq!(err.code(), crate::codes::PROTOCOL_DECODE);
    }

    #[test]
    fn wrong_variant_is_a_type_mismatch() {
        let writer = GraphBinaryWriter::default();
        let err = IntCodec
            .write_value(&Value::Long(1), &writer)
            .expect_err("Long 不能交给 IntCodec");
        assert_eq!(
            err,
            SerializationError::TypeMismatch {
                codec: "int",
                actual: "long",
            }
        );
    }
}
