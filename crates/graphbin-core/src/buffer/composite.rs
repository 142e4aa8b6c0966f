use core::slice;
use std::io;

use bytes::{BufMut, Bytes, BytesMut};

/// 一段序列化输出：单个只读区段，或由若干子输出拼接而成的复合缓冲。
///
/// # 设计背景（Why）
/// - 递归写入时，每一层都独立产出自己的字节；若父级把子级字节复制进一块连续内存，
///   嵌套深度为 `d` 的值会被复制 `d` 次；
/// - 借鉴 Netty `CompositeByteBuf` 的组件模型：父级只持有子级的所有权，
///   逻辑上把它们视为一条连续字节序列。
///
/// # 契约说明（What）
/// - 区段一旦加入便不可再修改（只追加、一次写入）；
/// - [`chunks`](Self::chunks) 按写入顺序遍历所有字节块，不做任何物化；
/// - 只有 [`to_bytes`](Self::to_bytes)/[`write_to`](Self::write_to) 在传输边界复制，且只复制一次。
#[derive(Clone, Debug)]
pub enum SerializedBuffer {
    /// 单个只读区段。
    Region(Bytes),
    /// 复合缓冲。
    Composite(CompositeBuffer),
}

impl SerializedBuffer {
    /// 逻辑字节长度。
    pub fn len(&self) -> usize {
        match self {
            SerializedBuffer::Region(bytes) => bytes.len(),
            SerializedBuffer::Composite(composite) => composite.len(),
        }
    }

    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 顶层组件数：单个区段计为 1。
    pub fn segment_count(&self) -> usize {
        match self {
            SerializedBuffer::Region(_) => 1,
            SerializedBuffer::Composite(composite) => composite.component_count(),
        }
    }

    /// 叶子区段总数。
    pub fn region_count(&self) -> usize {
        match self {
            SerializedBuffer::Region(_) => 1,
            SerializedBuffer::Composite(composite) => composite
                .components()
                .iter()
                .map(SerializedBuffer::region_count)
                .sum(),
        }
    }

    /// 若为复合缓冲则返回其引用。
    pub fn as_composite(&self) -> Option<&CompositeBuffer> {
        match self {
            SerializedBuffer::Composite(composite) => Some(composite),
            SerializedBuffer::Region(_) => None,
        }
    }

    /// 按写入顺序遍历全部字节块，空区段被跳过。
    pub fn chunks(&self) -> Chunks<'_> {
        Chunks {
            stack: vec![slice::from_ref(self).iter()],
        }
    }

    /// 展平为区段列表，仅移动 `Bytes` 句柄，不复制字节。
    pub fn into_regions(self) -> Vec<Bytes> {
        let mut regions = Vec::new();
        self.collect_regions(&mut regions);
        regions
    }

    fn collect_regions(self, regions: &mut Vec<Bytes>) {
        match self {
            SerializedBuffer::Region(bytes) => regions.push(bytes),
            SerializedBuffer::Composite(composite) => {
                for component in composite.components {
                    component.collect_regions(regions);
                }
            }
        }
    }

    /// 物化为一块连续内存。
    ///
    /// 单个区段直接返回原句柄；复合缓冲按总长度一次分配并逐块复制。
    pub fn to_bytes(&self) -> Bytes {
        if let SerializedBuffer::Region(bytes) = self {
            return bytes.clone();
        }
        let mut out = BytesMut::with_capacity(self.len());
        for chunk in self.chunks() {
            out.put_slice(chunk);
        }
        out.freeze()
    }

    /// 逐块写入 `sink`，适用于直接对接阻塞式传输。
    pub fn write_to<W: io::Write>(&self, sink: &mut W) -> io::Result<()> {
        for chunk in self.chunks() {
            sink.write_all(chunk)?;
        }
        Ok(())
    }
}

impl From<Bytes> for SerializedBuffer {
    fn from(bytes: Bytes) -> Self {
        SerializedBuffer::Region(bytes)
    }
}

impl From<BytesMut> for SerializedBuffer {
    fn from(bytes: BytesMut) -> Self {
        SerializedBuffer::Region(bytes.freeze())
    }
}

impl From<CompositeBuffer> for SerializedBuffer {
    fn from(composite: CompositeBuffer) -> Self {
        SerializedBuffer::Composite(composite)
    }
}

/// 有序的子输出列表及其总长度。
#[derive(Clone, Debug, Default)]
pub struct CompositeBuffer {
    components: Vec<SerializedBuffer>,
    len: usize,
}

impl CompositeBuffer {
    /// 创建空的复合缓冲。
    pub fn new() -> Self {
        Self::default()
    }

    /// 以组件数提示创建。
    pub fn with_capacity(components: usize) -> Self {
        Self {
            components: Vec::with_capacity(components),
            len: 0,
        }
    }

    /// 追加一个组件，所有权随之转移。
    pub fn push(&mut self, component: impl Into<SerializedBuffer>) {
        let component = component.into();
        self.len += component.len();
        self.components.push(component);
    }

    /// 逻辑字节长度。
    pub fn len(&self) -> usize {
        self.len
    }

    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 顶层组件数。
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// 顶层组件只读视图。
    pub fn components(&self) -> &[SerializedBuffer] {
        &self.components
    }
}

/// [`SerializedBuffer::chunks`] 返回的深度优先迭代器。
#[derive(Debug)]
pub struct Chunks<'a> {
    stack: Vec<slice::Iter<'a, SerializedBuffer>>,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                None => {
                    self.stack.pop();
                }
                Some(SerializedBuffer::Region(bytes)) => {
                    if !bytes.is_empty() {
                        return Some(bytes.as_ref());
                    }
                }
                Some(SerializedBuffer::Composite(composite)) => {
                    self.stack.push(composite.components.iter());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> SerializedBuffer {
        let mut inner = CompositeBuffer::with_capacity(2);
        inner.push(Bytes::from_static(b"cd"));
        inner.push(Bytes::new());
        inner.push(Bytes::from_static(b"ef"));

        let mut outer = CompositeBuffer::new();
        outer.push(Bytes::from_static(b"ab"));
        outer.push(inner);
        outer.push(Bytes::from_static(b"g"));
        outer.into()
    }

    #[test]
    fn chunks_preserve_write_order_across_nesting() {
        let buffer = nested();
        let chunks: Vec<&[u8]> = buffer.chunks().collect();
        assert_eq!(chunks, vec![&b"ab"[..], &b"cd"[..], &b"ef"[..], &b"g"[..]]);
        assert_eq!(buffer.len(), 7);
        assert_eq!(buffer.segment_count(), 3);
        assert_eq!(buffer.region_count(), 5);
    }

    #[test]
    fn to_bytes_flattens_once_and_regions_are_shared() {
        let shared = Bytes::from(vec![1u8, 2, 3]);
        let mut composite = CompositeBuffer::new();
        composite.push(Bytes::from_static(&[0]));
        composite.push(shared.clone());
        let buffer = SerializedBuffer::from(composite);

        assert_eq!(buffer.to_bytes().as_ref(), &[0, 1, 2, 3]);
        let regions = buffer.into_regions();
        assert_eq!(regions[1].as_ptr(), shared.as_ptr());
    }

    #[test]
    fn single_region_is_returned_without_copy() {
        let region = Bytes::from(vec![9u8; 16]);
        let buffer = SerializedBuffer::from(region.clone());
        assert_eq!(buffer.to_bytes().as_ptr(), region.as_ptr());
    }

    #[test]
    fn write_to_streams_every_chunk() {
        let mut sink = Vec::new();
        nested().write_to(&mut sink).expect("写入内存不会失败");
        assert_eq!(sink, b"abcdefg");
    }
}
