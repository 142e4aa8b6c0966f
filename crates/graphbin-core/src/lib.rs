#![deny(unsafe_code)]
#![warn(missing_docs)]
#![doc = "graphbin-core: 自描述二进制序列化协议的类型分派引擎。"]
#![doc = ""]
#![doc = "== 线格式 =="]
#![doc = "每个值都以 `[类型标记 u8][空值标志 u8][负载]` 的形式出现在线上；空值标志为 `0x01` 时不再携带负载。"]
#![doc = "复合类型（Map/List/Set）的负载以 4 字节有符号大端长度前缀开头，随后递归写入完整的子值。"]
#![doc = ""]
#![doc = "== 模块划分 =="]
#![doc = "- [`codec`]：编解码契约 [`TypeCodec`]、类型注册表 [`TypeRegistry`] 与内置编解码器；"]
#![doc = "- [`context`]：递归分派上下文 [`GraphBinaryReader`]/[`GraphBinaryWriter`]，统一处理类型标记与空值标志；"]
#![doc = "- [`buffer`]：零拷贝拼接缓冲 [`SerializedBuffer`] 与分配器契约 [`BufferAllocator`]；"]
#![doc = "- [`value`]：动态类型值 [`Value`] 及其有序集合；"]
#![doc = "- [`serializer`]：面向调用方的门面 [`GraphBinarySerializer`]。"]

pub mod buffer;
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod marker;
pub mod serializer;
pub mod value;

pub use buffer::{BufferAllocator, Chunks, CompositeBuffer, HeapAllocator, SerializedBuffer};
pub use codec::{TypeCodec, TypeRegistry, TypeRegistryBuilder};
pub use config::{ConfigError, DecodeLimits, GraphBinaryConfig};
pub use context::{GraphBinaryReader, GraphBinaryWriter};
pub use error::{Result, SerializationError, codes};
pub use marker::{TypeMarker, ValueFlag};
pub use serializer::GraphBinarySerializer;
pub use value::{CustomType, CustomValue, Value, ValueMap, ValueSet};
