//! 列表与集合编解码器：负载为 `[i32 元素数][元素数 × 完整值]`。
//!
//! 与 [`MapCodec`](super::MapCodec) 同构：长度前缀单独成段，每个元素经上下文的通用入口写成独立组件。

use bytes::Bytes;

use super::{TypeCodec, mismatch};
use crate::buffer::{CompositeBuffer, SerializedBuffer};
use crate::context::{GraphBinaryReader, GraphBinaryWriter};
use crate::error::Result;
use crate::marker::TypeMarker;
use crate::value::{Value, ValueSet};

/// 完整值至少包含类型标记与空值标志两字节。
const MIN_VALUE_SIZE: usize = 2;

fn write_elements<'a>(
    len: usize,
    items: impl Iterator<Item = &'a Value>,
    ctx: &GraphBinaryWriter,
) -> Result<SerializedBuffer> {
    let mut out = CompositeBuffer::with_capacity(1 + len);
    out.push(ctx.write_length(len)?);
    for item in items {
        out.push(ctx.write(item)?);
    }
    Ok(out.into())
}

/// 有序列表。
#[derive(Clone, Copy, Debug, Default)]
pub struct ListCodec;

impl TypeCodec for ListCodec {
    fn marker(&self) -> TypeMarker {
        TypeMarker::LIST
    }

    fn type_name(&self) -> &'static str {
        "list"
    }

    fn read_value(&self, buf: &mut Bytes, ctx: &GraphBinaryReader) -> Result<Value> {
        let len = ctx.read_length(buf, MIN_VALUE_SIZE, "list")?;
        let mut items = Vec::with_capacity(ctx.capacity_hint(len));
        for _ in 0..len {
            items.push(ctx.read(buf)?);
        }
        Ok(Value::List(items))
    }

    fn write_value(&self, value: &Value, ctx: &GraphBinaryWriter) -> Result<SerializedBuffer> {
        let Value::List(items) = value else {
            return Err(mismatch(self, value));
        };
        write_elements(items.len(), items.iter(), ctx)
    }
}

/// 集合；解码时重复元素只保留首次出现。
#[derive(Clone, Copy, Debug, Default)]
pub struct SetCodec;

impl TypeCodec for SetCodec {
    fn marker(&self) -> TypeMarker {
        TypeMarker::SET
    }

    fn type_name(&self) -> &'static str {
        "set"
    }

    fn read_value(&self, buf: &mut Bytes, ctx: &GraphBinaryReader) -> Result<Value> {
        let len = ctx.read_length(buf, MIN_VALUE_SIZE, "set")?;
        let mut items = ValueSet::with_capacity(ctx.capacity_hint(len));
        for _ in 0..len {
            items.insert(ctx.read(buf)?);
        }
        Ok(Value::Set(items))
    }

    fn write_value(&self, value: &Value, ctx: &GraphBinaryWriter) -> Result<SerializedBuffer> {
        let Value::Set(items) = value else {
            return Err(mismatch(self, value));
        };
        write_elements(items.len(), items.iter(), ctx)
    }
}
