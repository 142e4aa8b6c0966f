use core::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use super::{
    BinaryCodec, BooleanCodec, ByteCodec, DateCodec, DoubleCodec, FloatCodec, IntCodec, ListCodec,
    LongCodec, MapCodec, SetCodec, ShortCodec, StringCodec, TypeCodec, UuidCodec,
};
use crate::error::{Result, SerializationError};
use crate::marker::TypeMarker;
use crate::value::Value;

const SLOTS: usize = 256;

static STANDARD: OnceLock<Arc<TypeRegistry>> = OnceLock::new();

/// `TypeRegistry` 维护类型标记到编解码器的双射。
///
/// # 契约说明（What）
/// - 构建完成后不可变，查找是一次 256 槽位的数组索引，无需任何同步；
/// - `resolve` 服务读路径：线上标记没有对应编解码器时返回 `UnknownType`；
/// - `resolve_for` 服务写路径：以 [`Value::marker`] 作为值的运行时类型，缺失时返回 `UnregisteredType`；
/// - 每个标记至多一个编解码器、每个编解码器只占一个标记，由 [`TypeRegistryBuilder`] 在注册时保证。
pub struct TypeRegistry {
    slots: Box<[Option<Arc<dyn TypeCodec>>]>,
    len: usize,
}

impl TypeRegistry {
    /// 创建空的构建器。
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::new()
    }

    /// 进程级共享的内置注册表，首次调用时初始化。
    pub fn standard() -> Arc<TypeRegistry> {
        STANDARD
            .get_or_init(|| Arc::new(TypeRegistryBuilder::standard().build()))
            .clone()
    }

    /// 按线上标记查找编解码器。
    pub fn resolve(&self, marker: TypeMarker) -> Result<&dyn TypeCodec> {
        self.slot(marker).ok_or(SerializationError::UnknownType { marker })
    }

    /// 按值的运行时类型查找编解码器。
    pub fn resolve_for(&self, value: &Value) -> Result<&dyn TypeCodec> {
        let marker = value.marker();
        self.slot(marker)
            .ok_or(SerializationError::UnregisteredType {
                kind: value.kind_name(),
                marker,
            })
    }

    /// 是否注册了该标记。
    pub fn contains(&self, marker: TypeMarker) -> bool {
        self.slot(marker).is_some()
    }

    /// 已注册的编解码器数量。
    pub fn len(&self) -> usize {
        self.len
    }

    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 按标记升序遍历已注册的编解码器。
    pub fn codecs(&self) -> impl Iterator<Item = &dyn TypeCodec> + '_ {
        self.slots.iter().flatten().map(|codec| codec.as_ref())
    }

    fn slot(&self, marker: TypeMarker) -> Option<&dyn TypeCodec> {
        self.slots[usize::from(marker.as_u8())].as_deref()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.codecs().map(|codec| (codec.marker(), codec.type_name())))
            .finish()
    }
}

/// 注册表构建器：所有注册都在首个读写调用之前一次性完成。
///
/// ```ignore
/// let registry = TypeRegistryBuilder::standard()
///     .register(PointCodec)?
///     .build();
/// ```
pub struct TypeRegistryBuilder {
    slots: Vec<Option<Arc<dyn TypeCodec>>>,
    len: usize,
}

impl TypeRegistryBuilder {
    /// 空构建器。
    pub fn new() -> Self {
        Self {
            slots: vec![None; SLOTS],
            len: 0,
        }
    }

    /// 预先装入全部内置编解码器的构建器。
    pub fn standard() -> Self {
        let standard: [Arc<dyn TypeCodec>; 14] = [
            Arc::new(IntCodec),
            Arc::new(LongCodec),
            Arc::new(StringCodec),
            Arc::new(DateCodec),
            Arc::new(DoubleCodec),
            Arc::new(FloatCodec),
            Arc::new(ListCodec),
            Arc::new(MapCodec),
            Arc::new(SetCodec),
            Arc::new(UuidCodec),
            Arc::new(ByteCodec),
            Arc::new(BinaryCodec),
            Arc::new(ShortCodec),
            Arc::new(BooleanCodec),
        ];
        let mut builder = Self::new();
        for codec in standard {
            builder.insert(codec);
        }
        builder
    }

    /// 注册编解码器。
    ///
    /// 标记已被占用时返回 `DuplicateRegistration`；无类型空值标记由上下文保留，返回 `ReservedMarker`。
    pub fn register<C: TypeCodec>(self, codec: C) -> Result<Self> {
        self.register_shared(Arc::new(codec))
    }

    /// 注册共享所有权的编解码器。
    pub fn register_shared(mut self, codec: Arc<dyn TypeCodec>) -> Result<Self> {
        let marker = codec.marker();
        if marker == TypeMarker::UNSPECIFIED_NULL {
            return Err(SerializationError::ReservedMarker { marker });
        }
        if self.slots[usize::from(marker.as_u8())].is_some() {
            return Err(SerializationError::DuplicateRegistration { marker });
        }
        self.insert(codec);
        Ok(self)
    }

    /// 封存为不可变注册表。
    pub fn build(self) -> TypeRegistry {
        debug!(codecs = self.len, "type registry sealed");
        TypeRegistry {
            slots: self.slots.into_boxed_slice(),
            len: self.len,
        }
    }

    fn insert(&mut self, codec: Arc<dyn TypeCodec>) {
        let slot = &mut self.slots[usize::from(codec.marker().as_u8())];
        if slot.is_none() {
            self.len += 1;
        }
        *slot = Some(codec);
    }
}

impl Default for TypeRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueMap;

    #[test]
    fn standard_registry_covers_every_builtin_value() {
        let registry = TypeRegistry::standard();
        let samples = [
            Value::Boolean(true),
            Value::Byte(1),
            Value::Short(1),
            Value::Int(1),
            Value::Long(1),
            Value::Float(1.0),
            Value::Double(1.0),
            Value::Date(0),
            Value::Uuid(0),
            Value::from("s"),
            Value::Binary(bytes::Bytes::new()),
            Value::List(Vec::new()),
            Value::Set(Default::default()),
            Value::Map(ValueMap::new()),
        ];
        for sample in &samples {
            let codec = registry.resolve_for(sample).expect("内置类型必须已注册");
            assert_eq!(codec.marker(), sample.marker());
        }
        assert_eq!(registry.len(), samples.len());
    }

    #[test]
    fn unknown_marker_is_reported() {
        let registry = TypeRegistry::standard();
        let err = registry
            .resolve(TypeMarker::new(0x99))
            .err()
            .expect("0x99 未注册");
        assert_eq!(
            err,
            SerializationError::UnknownType {
                marker: TypeMarker::new(0x99)
            }
        );
    }

    #[test]
    fn missing_codec_is_unregistered_type() {
        let registry = TypeRegistry::builder()
            .register(IntCodec)
            .expect("首次注册")
            .build();
        let err = registry
            .resolve_for(&Value::Map(ValueMap::new()))
            .err()
            .expect("Map 未注册");
        assert_eq!(
            err,
            SerializationError::UnregisteredType {
                kind: "map",
                marker: TypeMarker::MAP,
            }
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let err = TypeRegistryBuilder::standard()
            .register(MapCodec)
            .err()
            .expect("MAP 已被占用");
        assert_eq!(
            err,
            SerializationError::DuplicateRegistration {
                marker: TypeMarker::MAP
            }
        );
    }

    #[test]
    fn standard_registry_is_shared() {
        let first = TypeRegistry::standard();
        let second = TypeRegistry::standard();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
