use core::fmt;
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::buffer::{BufferAllocator, CompositeBuffer, HeapAllocator, SerializedBuffer};
use crate::codec::TypeRegistry;
use crate::error::{Result, SerializationError};
use crate::marker::{TypeMarker, ValueFlag};
use crate::value::Value;

const fn header_table(flag: ValueFlag) -> [[u8; 2]; 256] {
    let mut table = [[0u8; 2]; 256];
    let mut marker = 0;
    while marker < 256 {
        table[marker] = [marker as u8, flag.as_u8()];
        marker += 1;
    }
    table
}

/// 所有可能的两字节头部，写出时直接引用静态内存。
static PRESENT_HEADERS: [[u8; 2]; 256] = header_table(ValueFlag::Present);
static ABSENT_HEADERS: [[u8; 2]; 256] = header_table(ValueFlag::Absent);

/// 写路径上下文：把 [`Value`] 写成“完整值”。
///
/// # 输出结构
/// - [`Value::Null`]：单个两字节区段 `0xFE 0x01`；
/// - 其余值：`Composite[头部区段, 负载]`，负载由注册表按值的运行时类型选出的编解码器产出。
///
/// 头部区段引用静态内存，负载区段经 [`BufferAllocator`] 租借，子输出只转移所有权，不复制。
#[derive(Clone)]
pub struct GraphBinaryWriter {
    registry: Arc<TypeRegistry>,
    allocator: Arc<dyn BufferAllocator>,
}

impl GraphBinaryWriter {
    /// 使用给定注册表与分配器。
    pub fn new(registry: Arc<TypeRegistry>, allocator: Arc<dyn BufferAllocator>) -> Self {
        Self {
            registry,
            allocator,
        }
    }

    /// 注册表。
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// 写出一个完整值。
    ///
    /// 值的运行时类型没有注册编解码器时返回 `UnregisteredType`；子值的任何失败原样向上传播。
    pub fn write(&self, value: &Value) -> Result<SerializedBuffer> {
        if value.is_null() {
            return Ok(header(&ABSENT_HEADERS, TypeMarker::UNSPECIFIED_NULL));
        }
        let codec = self.registry.resolve_for(value)?;
        trace!(marker = %codec.marker(), codec = codec.type_name(), "encoding payload");
        let payload = codec.write_value(value, self)?;
        let mut out = CompositeBuffer::with_capacity(2);
        out.push(header(&PRESENT_HEADERS, codec.marker()));
        out.push(payload);
        Ok(out.into())
    }

    /// 写出带类型的空值 `[marker, 0x01]`。
    ///
    /// 标记必须已注册，否则返回 `UnknownType`；`0xFE` 等价于无类型空值。
    pub fn write_null(&self, marker: TypeMarker) -> Result<SerializedBuffer> {
        if marker != TypeMarker::UNSPECIFIED_NULL {
            self.registry.resolve(marker)?;
        }
        Ok(header(&ABSENT_HEADERS, marker))
    }

    /// 向分配器租借至少 `min_capacity` 字节的可写区段。
    pub fn allocate(&self, min_capacity: usize) -> Result<BytesMut> {
        self.allocator.acquire(min_capacity)
    }

    /// 把长度转换为线上的有符号 32 位表示。
    pub fn checked_length(&self, len: usize) -> Result<i32> {
        i32::try_from(len).map_err(|_| SerializationError::LengthOverflow { len })
    }

    /// 写出 4 字节长度前缀区段。
    pub fn write_length(&self, len: usize) -> Result<SerializedBuffer> {
        let len = self.checked_length(len)?;
        let mut out = self.allocate(4)?;
        out.put_i32(len);
        Ok(out.into())
    }
}

impl Default for GraphBinaryWriter {
    fn default() -> Self {
        Self::new(TypeRegistry::standard(), Arc::new(HeapAllocator))
    }
}

impl fmt::Debug for GraphBinaryWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphBinaryWriter")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

fn header(table: &'static [[u8; 2]; 256], marker: TypeMarker) -> SerializedBuffer {
    Bytes::from_static(&table[usize::from(marker.as_u8())]).into()
}
