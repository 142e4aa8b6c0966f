//! 变长字节类编解码器：负载为 `[i32 字节长度][字节]`。

use bytes::{BufMut, Bytes};

use super::{TypeCodec, mismatch};
use crate::buffer::{CompositeBuffer, SerializedBuffer, cursor};
use crate::context::{GraphBinaryReader, GraphBinaryWriter};
use crate::error::{Result, SerializationError};
use crate::marker::TypeMarker;
use crate::value::Value;

/// UTF-8 字符串。
///
/// 写入时长度前缀与正文共用一个区段；读取时非法 UTF-8 视为畸形负载。
#[derive(Clone, Copy, Debug, Default)]
pub struct StringCodec;

impl TypeCodec for StringCodec {
    fn marker(&self) -> TypeMarker {
        TypeMarker::STRING
    }

    fn type_name(&self) -> &'static str {
        "string"
    }

    fn read_value(&self, buf: &mut Bytes, ctx: &GraphBinaryReader) -> Result<Value> {
        let len = ctx.read_byte_length(buf, "string")?;
        let raw = cursor::split(buf, len, "string")?;
        let text = std::str::from_utf8(&raw).map_err(|err| {
            SerializationError::malformed(format!("string payload is not valid UTF-8: {err}"))
        })?;
        Ok(Value::String(text.to_owned()))
    }

    fn write_value(&self, value: &Value, ctx: &GraphBinaryWriter) -> Result<SerializedBuffer> {
        let Value::String(text) = value else {
            return Err(mismatch(self, value));
        };
        let len = ctx.checked_length(text.len())?;
        let mut out = ctx.allocate(4 + text.len())?;
        out.put_i32(len);
        out.put_slice(text.as_bytes());
        Ok(out.into())
    }
}

/// 原始字节。
///
/// 写入时调用方的 `Bytes` 句柄作为独立区段追加，读取时直接切分输入缓冲，两端都不复制字节。
#[derive(Clone, Copy, Debug, Default)]
pub struct BinaryCodec;

impl TypeCodec for BinaryCodec {
    fn marker(&self) -> TypeMarker {
        TypeMarker::BINARY
    }

    fn type_name(&self) -> &'static str {
        "binary"
    }

    fn read_value(&self, buf: &mut Bytes, ctx: &GraphBinaryReader) -> Result<Value> {
        let len = ctx.read_byte_length(buf, "binary")?;
        Ok(Value::Binary(cursor::split(buf, len, "binary")?))
    }

    fn write_value(&self, value: &Value, ctx: &GraphBinaryWriter) -> Result<SerializedBuffer> {
        let Value::Binary(bytes) = value else {
            return Err(mismatch(self, value));
        };
        let mut out = CompositeBuffer::with_capacity(2);
        out.push(ctx.write_length(bytes.len())?);
        out.push(bytes.clone());
        Ok(out.into())
    }
}
