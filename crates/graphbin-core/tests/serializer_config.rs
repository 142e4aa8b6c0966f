//! 门面与配置的集成：TOML 预算生效、分配失败传播、实例跨线程共享。

use std::sync::Arc;
use std::thread;

use bytes::{Bytes, BytesMut};
use graphbin_core::{
    BufferAllocator, GraphBinaryConfig, GraphBinarySerializer, HeapAllocator, Result,
    SerializationError, TypeRegistry, Value, ValueMap, codes,
};

/// 只允许小区段的分配器，用于验证分配失败沿递归帧原样传播。
struct CappedAllocator {
    cap: usize,
}

impl BufferAllocator for CappedAllocator {
    fn acquire(&self, min_capacity: usize) -> Result<BytesMut> {
        if min_capacity > self.cap {
            return Err(SerializationError::Allocation {
                requested: min_capacity,
                detail: format!("capped at {} bytes", self.cap),
            });
        }
        Ok(BytesMut::with_capacity(min_capacity))
    }
}

fn limited(toml: &str) -> GraphBinarySerializer {
    let config = GraphBinaryConfig::from_toml_str(toml).expect("合法配置");
    GraphBinarySerializer::with_parts(
        TypeRegistry::standard(),
        Arc::new(HeapAllocator),
        &config,
    )
}

#[test]
fn collection_budget_from_toml_rejects_large_maps() {
    let serializer = limited("[decode]\nmax_collection_len = 2\n");
    let unlimited = GraphBinarySerializer::new();

    let map: ValueMap = (0..3).map(|idx| (Value::Int(idx), Value::Null)).collect();
    let bytes = unlimited.serialize(&Value::Map(map)).expect("写出不受预算限制");

    let err = serializer.deserialize(bytes).expect_err("3 个条目超出预算");
    assert_eq!(
        err,
        SerializationError::BudgetExceeded {
            what: "map",
            declared: 3,
            limit: 2,
        }
    );
}

#[test]
fn byte_budget_from_toml_rejects_long_strings() {
    let serializer = limited("[decode]\nmax_byte_len = 4\n");
    assert_eq!(
        serializer.deserialize(serializer.serialize(&"four".into()).expect("写出")),
        Ok(Value::from("four"))
    );

    let long = serializer.serialize(&"fives".into()).expect("写出");
    let err = serializer.deserialize(long).expect_err("5 字节超出预算");
    assert_eq!(err.code(), codes::PROTOCOL_BUDGET_EXCEEDED);
}

#[test]
fn forged_length_is_rejected_without_a_budget() {
    let serializer = GraphBinarySerializer::new();
    // List 声明 i32::MAX 个元素，实际没有任何负载。
    let err = serializer
        .deserialize(Bytes::from_static(&[0x09, 0x00, 0x7F, 0xFF, 0xFF, 0xFF]))
        .expect_err("长度不可能满足");
    assert_eq!(err.code(), codes::PROTOCOL_DECODE);
}

#[test]
fn serializer_is_shared_across_threads() {
    let serializer = GraphBinarySerializer::new();
    thread::scope(|scope| {
        for worker in 0..4 {
            let serializer = &serializer;
            scope.spawn(move || {
                for idx in 0..64 {
                    let mut map = ValueMap::new();
                    map.insert(Value::Int(worker), Value::Long(idx));
                    let value = Value::Map(map);
                    let bytes = serializer.serialize(&value).expect("写出");
                    assert_eq!(serializer.deserialize(bytes), Ok(value));
                }
            });
        }
    });
}

#[test]
fn allocation_failure_in_a_nested_value_reaches_the_caller() {
    let serializer = GraphBinarySerializer::with_parts(
        TypeRegistry::standard(),
        Arc::new(CappedAllocator { cap: 10 }),
        &GraphBinaryConfig::default(),
    );
    let mut map = ValueMap::new();
    map.insert("short".into(), Value::Long(1));
    assert!(serializer.serialize(&Value::Map(map.clone())).is_ok());

    map.insert("long".into(), Value::from("does not fit"));
    let err = serializer
        .serialize(&Value::Map(map))
        .expect_err("16 字节的字符串区段超出上限");
    assert_eq!(err.code(), codes::BUFFER_ALLOCATION_FAILED);
    assert_eq!(
        err,
        SerializationError::Allocation {
            requested: 16,
            detail: "capped at 10 bytes".to_owned(),
        }
    );
}
