//! 读路径的边界检查原语。
//!
//! `bytes::Buf` 的 `get_*` 在字节不足时直接 panic；这里先比较剩余长度，
//! 不足时返回 `MalformedPayload`，对应传输层“缓冲欠载”的信号。

use bytes::{Buf, Bytes};

use crate::error::{Result, SerializationError};

/// 确认至少还有 `needed` 字节可读。
pub(crate) fn ensure(buf: &Bytes, needed: usize, what: &'static str) -> Result<()> {
    let remaining = buf.remaining();
    if remaining < needed {
        return Err(SerializationError::malformed(format!(
            "buffer exhausted while reading {what}: need {needed} bytes, {remaining} remaining"
        )));
    }
    Ok(())
}

pub(crate) fn read_u8(buf: &mut Bytes, what: &'static str) -> Result<u8> {
    ensure(buf, 1, what)?;
    Ok(buf.get_u8())
}

pub(crate) fn read_i32(buf: &mut Bytes, what: &'static str) -> Result<i32> {
    ensure(buf, 4, what)?;
    Ok(buf.get_i32())
}

/// 零拷贝地切出 `len` 字节。
pub(crate) fn split(buf: &mut Bytes, len: usize, what: &'static str) -> Result<Bytes> {
    ensure(buf, len, what)?;
    Ok(buf.split_to(len))
}
