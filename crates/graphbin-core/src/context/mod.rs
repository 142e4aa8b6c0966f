//! 递归序列化上下文。
//!
//! # 设计动机（Why）
//! - 每个值的头部 `[类型标记][空值标志]` 只在这里读写，编解码器只关心负载；
//! - 复合编解码器通过 [`GraphBinaryReader::read`]/[`GraphBinaryWriter::write`] 回到上下文，
//!   因此嵌套值的分派、空值处理与错误传播都复用同一条路径。
//!
//! # 并发（Concurrency）
//! 上下文只持有不可变的注册表与分配器句柄，满足 `Send + Sync`，可在任意线程间共享；
//! 单次调用的全部状态都位于调用栈或输入缓冲内。

mod reader;
mod writer;

pub use reader::GraphBinaryReader;
pub use writer::GraphBinaryWriter;
