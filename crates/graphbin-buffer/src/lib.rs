#![deny(unsafe_code)]

//! `graphbin-buffer` 提供 [`BufferAllocator`](graphbin_core::BufferAllocator) 的池化实现。
//!
//! # 模块定位（Why）
//! - 写路径为每个长度前缀、每个标量负载各租借一个小区段，逐个向堆申请会放大分配次数；
//! - [`SlabAllocator`] 从共享的大块内存中顺序切出区段，只在大块耗尽时才触发一次堆分配。
//!
//! # 设计概要（How）
//! - 当前大块由 `spin::Mutex` 保护，统计使用原子计数，实例满足 `Send + Sync + 'static`；
//! - 切出的区段与大块共享底层分配，冻结为 `Bytes` 后交给拼接缓冲，
//!   全部区段释放时整块内存随之归还。

mod slab;

pub use slab::{SlabAllocator, SlabConfig, SlabStats};
