//! 面向调用方的序列化门面。

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::buffer::{BufferAllocator, HeapAllocator, SerializedBuffer};
use crate::codec::TypeRegistry;
use crate::config::GraphBinaryConfig;
use crate::context::{GraphBinaryReader, GraphBinaryWriter};
use crate::error::{Result, SerializationError};
use crate::value::Value;

/// `GraphBinarySerializer` 把一对读写上下文组合为“整条消息”的入口。
///
/// # 契约说明（What）
/// - [`serialize`](Self::serialize)：写出完整值后做一次拷贝，得到连续字节；
/// - [`serialize_segments`](Self::serialize_segments)：保留拼接结构，交给支持分散写的传输层；
/// - [`deserialize`](Self::deserialize)：输入必须恰好是一个完整值，残留字节视为畸形负载。
///
/// 实例可克隆，克隆体共享注册表与分配器。
#[derive(Clone, Debug)]
pub struct GraphBinarySerializer {
    reader: GraphBinaryReader,
    writer: GraphBinaryWriter,
}

impl GraphBinarySerializer {
    /// 内置注册表、堆分配器、无解码上限。
    pub fn new() -> Self {
        Self::with_parts(
            TypeRegistry::standard(),
            Arc::new(HeapAllocator),
            &GraphBinaryConfig::default(),
        )
    }

    /// 由注册表、分配器与配置组装。
    pub fn with_parts(
        registry: Arc<TypeRegistry>,
        allocator: Arc<dyn BufferAllocator>,
        config: &GraphBinaryConfig,
    ) -> Self {
        Self {
            reader: GraphBinaryReader::with_limits(Arc::clone(&registry), config.decode),
            writer: GraphBinaryWriter::new(registry, allocator),
        }
    }

    /// 读上下文。
    pub fn reader(&self) -> &GraphBinaryReader {
        &self.reader
    }

    /// 写上下文。
    pub fn writer(&self) -> &GraphBinaryWriter {
        &self.writer
    }

    /// 序列化为连续字节。
    pub fn serialize(&self, value: &Value) -> Result<Bytes> {
        Ok(self.serialize_segments(value)?.to_bytes())
    }

    /// 序列化为拼接缓冲，不做拷贝。
    pub fn serialize_segments(&self, value: &Value) -> Result<SerializedBuffer> {
        self.writer.write(value).inspect_err(|err| {
            debug!(code = err.code(), error = %err, "graphbin encode failed");
        })
    }

    /// 从字节反序列化一个完整值。
    pub fn deserialize(&self, input: impl Into<Bytes>) -> Result<Value> {
        let mut buf = input.into();
        let result = self.reader.read(&mut buf).and_then(|value| {
            if buf.is_empty() {
                Ok(value)
            } else {
                Err(SerializationError::malformed(format!(
                    "{} trailing bytes after value",
                    buf.len()
                )))
            }
        });
        result.inspect_err(|err| {
            debug!(code = err.code(), error = %err, "graphbin decode failed");
        })
    }
}

impl Default for GraphBinarySerializer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueMap;
    use tracing_test::traced_test;

    #[test]
    fn serialize_then_deserialize_restores_nested_value() {
        let serializer = GraphBinarySerializer::new();
        let mut inner = ValueMap::new();
        inner.insert("k".into(), Value::List(vec![1.into(), Value::Null]));
        let value = Value::Map(inner);

        let bytes = serializer.serialize(&value).expect("序列化");
        assert_eq!(serializer.deserialize(bytes), Ok(value));
    }

    #[test]
    #[traced_test]
    fn trailing_bytes_are_rejected_and_logged() {
        let serializer = GraphBinarySerializer::new();
        let err = serializer
            .deserialize(vec![0x01u8, 0x00, 0, 0, 0, 1, 0xAA])
            .expect_err("多出 1 字节");
        assert!(err.to_string().contains("1 trailing bytes"));
        assert!(logs_contain("graphbin decode failed"));
        assert!(logs_contain("protocol.decode"));
    }
}
