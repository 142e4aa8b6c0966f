use bytes::Bytes;
use tracing::debug;

use super::{TypeCodec, mismatch};
use crate::buffer::{CompositeBuffer, SerializedBuffer};
use crate::context::{GraphBinaryReader, GraphBinaryWriter};
use crate::error::Result;
use crate::marker::TypeMarker;
use crate::value::{Value, ValueMap};

/// 每个条目至少包含键、值两个完整值，各 2 字节头部。
const MIN_ENTRY_SIZE: usize = 4;

/// 键值映射编解码器，复合类型的代表实现。
///
/// # 线格式
/// `[i32 条目数 N][N × (完整键, 完整值)]`，键与值各自带类型标记与空值标志，
/// 不要求各条目类型一致，也不要求键为基本类型。
///
/// # 读取
/// 1. 读取并校验条目数：负数、超出剩余字节可容纳的条目数均为畸形负载，超出配置上限为超预算；
/// 2. 以条目数为容量提示创建映射；
/// 3. 依次经上下文读取完整键与完整值并插入，重复键后写者胜出；
/// 4. 任一子值失败即通过 `?` 返回，已构建的部分映射随之丢弃，调用方拿不到残缺结果。
///
/// # 写入
/// 输出由 `1 + 2k` 个组件构成：首个组件为 4 字节条目数，随后每个条目贡献完整键、完整值各一个组件。
/// 子输出以所有权转移的方式拼接，不复制其字节。条目按映射的迭代顺序（即插入顺序）写出。
#[derive(Clone, Copy, Debug, Default)]
pub struct MapCodec;

impl TypeCodec for MapCodec {
    fn marker(&self) -> TypeMarker {
        TypeMarker::MAP
    }

    fn type_name(&self) -> &'static str {
        "map"
    }

    fn read_value(&self, buf: &mut Bytes, ctx: &GraphBinaryReader) -> Result<Value> {
        let len = ctx.read_length(buf, MIN_ENTRY_SIZE, "map")?;
        let mut map = ValueMap::with_capacity(ctx.capacity_hint(len));
        for _ in 0..len {
            let key = ctx.read(buf)?;
            let value = ctx.read(buf)?;
            if map.insert(key, value).is_some() {
                debug!(declared = len, "duplicate map key replaced by later entry");
            }
        }
        Ok(Value::Map(map))
    }

    fn write_value(&self, value: &Value, ctx: &GraphBinaryWriter) -> Result<SerializedBuffer> {
        let Value::Map(map) = value else {
            return Err(mismatch(self, value));
        };
        let mut out = CompositeBuffer::with_capacity(1 + map.len() * 2);
        out.push(ctx.write_length(map.len())?);
        for (key, item) in map {
            out.push(ctx.write(key)?);
            out.push(ctx.write(item)?);
        }
        Ok(out.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SerializationError;
    use tracing_test::traced_test;

    fn sample() -> Value {
        let mut map = ValueMap::new();
        map.insert("a".into(), 1.into());
        map.insert("b".into(), 2.into());
        Value::Map(map)
    }

    #[test]
    fn empty_map_is_a_zero_length_prefix() {
        let writer = GraphBinaryWriter::default();
        let out = MapCodec
            .write_value(&Value::Map(ValueMap::new()), &writer)
            .expect("写入空映射");
        assert_eq!(out.to_bytes().as_ref(), &[0, 0, 0, 0]);

        let reader = GraphBinaryReader::default();
        let mut buf = Bytes::from_static(&[0, 0, 0, 0]);
        let value = MapCodec.read_value(&mut buf, &reader).expect("读取空映射");
        assert_eq!(value, Value::Map(ValueMap::new()));
        assert!(buf.is_empty());
    }

    #[test]
    fn payload_is_count_then_full_key_value_pairs() {
        let writer = GraphBinaryWriter::default();
        let out = MapCodec.write_value(&sample(), &writer).expect("写入映射");
        assert_eq!(out.segment_count(), 5);
        assert_eq!(
            out.to_bytes().as_ref(),
            &[
                0, 0, 0, 2, //
                0x03, 0x00, 0, 0, 0, 1, b'a', //
                0x01, 0x00, 0, 0, 0, 1, //
                0x03, 0x00, 0, 0, 0, 1, b'b', //
                0x01, 0x00, 0, 0, 0, 2,
            ]
        );
    }

    #[test]
    fn count_larger_than_remaining_bytes_is_malformed() {
        let reader = GraphBinaryReader::default();
        // 声明 1000 个条目，但只剩 4 字节。
        let mut buf = Bytes::from_static(&[0, 0, 0x03, 0xE8, 0x01, 0x00, 0, 0]);
        let err = MapCodec.read_value(&mut buf, &reader).expect_err("条目数不可能满足");
        assert!(matches!(err, SerializationError::MalformedPayload { .. }));
    }

    #[test]
    #[traced_test]
    fn duplicate_keys_overwrite_and_are_logged() {
        let reader = GraphBinaryReader::default();
        let mut buf = Bytes::from_static(&[
            0, 0, 0, 2, //
            0x01, 0x00, 0, 0, 0, 7, 0x27, 0x00, 0x00, //
            0x01, 0x00, 0, 0, 0, 7, 0x27, 0x00, 0x01,
        ]);
        let value = MapCodec.read_value(&mut buf, &reader).expect("读取映射");
        let map = value.as_map().expect("Map 变体");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&Value::Int(7)), Some(&Value::Boolean(true)));
        assert!(logs_contain("duplicate map key replaced"));
    }
}
