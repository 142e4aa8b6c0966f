//! 缓冲区契约模块。
//!
//! # 模块架构（Why）
//! - 写路径上每个嵌套值都产出独立的字节区段，父级只转移所有权进行拼接，
//!   因此把“分配区段”与“拼接区段”拆成两项职责：[`BufferAllocator`] 与 [`composite`]；
//! - 读路径直接消费调用方交来的 `bytes::Bytes`，[`cursor`] 提供带边界检查的读取原语。
//!
//! # 设计总览（How）
//! - [`BufferAllocator`] 是唯一的分配入口，核心从不自行决定内存策略；
//! - [`HeapAllocator`] 为默认实现，每次请求独立分配；池化实现位于 `graphbin-buffer`。

use bytes::BytesMut;

use crate::error::Result;

pub mod composite;
pub(crate) mod cursor;

pub use composite::{Chunks, CompositeBuffer, SerializedBuffer};

/// `BufferAllocator` 为写路径提供可写字节区段。
///
/// # 契约说明（What）
/// - `acquire(min_capacity)` 返回容量不小于 `min_capacity`、长度为 0 的 `BytesMut`；
/// - 返回区段的所有权完全移交调用方，冻结后作为只读区段加入拼接缓冲；
/// - 实现必须满足 `Send + Sync`，同一实例会被多个线程上的写入器共享；
/// - 分配失败时返回 [`SerializationError::Allocation`](crate::SerializationError::Allocation)。
pub trait BufferAllocator: Send + Sync + 'static {
    /// 租借至少 `min_capacity` 字节的可写区段。
    fn acquire(&self, min_capacity: usize) -> Result<BytesMut>;
}

/// 每次请求都向全局分配器申请新内存的默认实现。
#[derive(Clone, Copy, Debug, Default)]
pub struct HeapAllocator;

impl BufferAllocator for HeapAllocator {
    fn acquire(&self, min_capacity: usize) -> Result<BytesMut> {
        Ok(BytesMut::with_capacity(min_capacity))
    }
}
