//! 编解码契约、类型注册表与内置编解码器。
//!
//! # 分层（How）
//! - 头部（类型标记 + 空值标志）由 [`context`](crate::context) 统一处理，对所有类型一致；
//! - 负载由各 [`TypeCodec`] 负责，复合类型通过上下文的通用入口递归读写子值，
//!   因此空值与类型标记的处理只存在一份实现。

use bytes::Bytes;

use crate::buffer::SerializedBuffer;
use crate::context::{GraphBinaryReader, GraphBinaryWriter};
use crate::error::{Result, SerializationError};
use crate::marker::TypeMarker;
use crate::value::Value;

pub mod collection;
pub mod map;
pub mod primitive;
pub mod registry;
pub mod text;

pub use collection::{ListCodec, SetCodec};
pub use map::MapCodec;
pub use primitive::{
    BooleanCodec, ByteCodec, DateCodec, DoubleCodec, FloatCodec, IntCodec, LongCodec, ShortCodec,
    UuidCodec,
};
pub use registry::{TypeRegistry, TypeRegistryBuilder};
pub use text::{BinaryCodec, StringCodec};

/// `TypeCodec` 描述恰好一种逻辑类型的负载读写。
///
/// # 契约说明（What）
/// - `read_value`：调用时类型标记与空值标志已被上下文消费，只读取负载；
///   嵌套值必须通过 [`GraphBinaryReader::read`] 读取；缓冲提前耗尽时返回 `MalformedPayload`；
/// - `write_value`：只产出负载，不写类型标记与空值标志；嵌套值必须通过
///   [`GraphBinaryWriter::write`] 写出；不得修改输入值；
/// - 收到不属于本类型的值变体时返回 `TypeMismatch`；
/// - 实现不得持有逐次调用的可变状态，同一实例会被并发使用。
pub trait TypeCodec: Send + Sync + 'static {
    /// 本编解码器负责的类型标记。
    fn marker(&self) -> TypeMarker;

    /// 类型名称。
    fn type_name(&self) -> &'static str;

    /// 读取负载。
    fn read_value(&self, buf: &mut Bytes, ctx: &GraphBinaryReader) -> Result<Value>;

    /// 写出负载。
    fn write_value(&self, value: &Value, ctx: &GraphBinaryWriter) -> Result<SerializedBuffer>;
}

/// 构造 `TypeMismatch`。
pub(crate) fn mismatch(codec: &dyn TypeCodec, value: &Value) -> SerializationError {
    SerializationError::TypeMismatch {
        codec: codec.type_name(),
        actual: value.kind_name(),
    }
}
