#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use graphbin_core::{
    DecodeLimits, GraphBinaryConfig, GraphBinarySerializer, HeapAllocator, TypeRegistry,
};
use libfuzzer_sys::fuzz_target;

/// Fuzz 用例：任意字节加上可选的解码预算。
///
/// - **Why**：解码路径直接面对不可信输入，任何字节序列都只能得到 `Ok` 或 `Err`，不得 panic 或按伪造长度预分配；
/// - **How**：解码成功时再写出并解码一次，两次得到的值必须相等（空值、重复键等在首次解码时已规范化）；
/// - **What**：预算为 0 时视为不设上限，保证配置始终合法。
#[derive(Debug, Arbitrary)]
struct DecodeCase {
    input: Vec<u8>,
    max_collection_len: u16,
    max_byte_len: u16,
    max_depth: u8,
}

fn limit(raw: u16) -> Option<usize> {
    (raw != 0).then_some(usize::from(raw))
}

fuzz_target!(|case: DecodeCase| {
    let config = GraphBinaryConfig {
        decode: DecodeLimits {
            max_collection_len: limit(case.max_collection_len),
            max_byte_len: limit(case.max_byte_len),
            max_depth: limit(u16::from(case.max_depth)),
        },
    };
    let serializer = GraphBinarySerializer::with_parts(
        TypeRegistry::standard(),
        Arc::new(HeapAllocator),
        &config,
    );

    let Ok(value) = serializer.deserialize(case.input) else {
        return;
    };
    let encoded = serializer.serialize(&value).expect("已解码的值必须可以写出");
    let decoded = serializer
        .deserialize(encoded)
        .expect("重新写出的字节必须在同一预算下可解码");
    assert_eq!(decoded, value);
});
