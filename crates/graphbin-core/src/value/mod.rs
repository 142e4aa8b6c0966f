//! 动态类型值模型。
//!
//! # 设计概要（How）
//! - [`Value`] 为每个内置线上类型提供一个变体，另以 [`Value::Custom`] 承载扩展类型；
//! - 值的“运行时类型”就是 [`Value::marker`] 返回的类型标记，写入时注册表据此挑选编解码器；
//! - 相等与哈希对浮点数按位比较（`NaN` 与自身相等，`0.0` 与 `-0.0` 不相等），
//!   以便任意值都能作为 [`ValueMap`] 的键。

use core::any::Any;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::mem;
use std::sync::Arc;

use bytes::Bytes;

use crate::marker::TypeMarker;

mod index;
mod map;
mod set;

pub use map::{Iter as MapIter, ValueMap};
pub use set::ValueSet;

/// 一次序列化/反序列化调用中流转的动态类型值。
#[derive(Clone, Debug)]
pub enum Value {
    /// 缺失值。
    Null,
    /// 布尔值。
    Boolean(bool),
    /// 8 位有符号整数。
    Byte(i8),
    /// 16 位有符号整数。
    Short(i16),
    /// 32 位有符号整数。
    Int(i32),
    /// 64 位有符号整数。
    Long(i64),
    /// 单精度浮点。
    Float(f32),
    /// 双精度浮点。
    Double(f64),
    /// 自 Unix 纪元起的毫秒数。
    Date(i64),
    /// 128 位 UUID，高位字节在前。
    Uuid(u128),
    /// UTF-8 字符串。
    String(String),
    /// 原始字节，读写均不复制底层内存。
    Binary(Bytes),
    /// 有序列表。
    List(Vec<Value>),
    /// 集合。
    Set(ValueSet),
    /// 键值映射。
    Map(ValueMap),
    /// 扩展类型。
    Custom(CustomValue),
}

impl Value {
    /// 值对应的类型标记；`Null` 映射到无类型空值标记。
    pub fn marker(&self) -> TypeMarker {
        match self {
            Value::Null => TypeMarker::UNSPECIFIED_NULL,
            Value::Boolean(_) => TypeMarker::BOOLEAN,
            Value::Byte(_) => TypeMarker::BYTE,
            Value::Short(_) => TypeMarker::SHORT,
            Value::Int(_) => TypeMarker::INT,
            Value::Long(_) => TypeMarker::LONG,
            Value::Float(_) => TypeMarker::FLOAT,
            Value::Double(_) => TypeMarker::DOUBLE,
            Value::Date(_) => TypeMarker::DATE,
            Value::Uuid(_) => TypeMarker::UUID,
            Value::String(_) => TypeMarker::STRING,
            Value::Binary(_) => TypeMarker::BINARY,
            Value::List(_) => TypeMarker::LIST,
            Value::Set(_) => TypeMarker::SET,
            Value::Map(_) => TypeMarker::MAP,
            Value::Custom(custom) => custom.marker(),
        }
    }

    /// 类型名称，用于错误信息与日志。
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Date(_) => "date",
            Value::Uuid(_) => "uuid",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Custom(custom) => custom.type_name(),
        }
    }

    /// 是否为缺失值。
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// 以布尔值读取。
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// 以 32 位整数读取。
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// 以 64 位整数读取。
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// 以字符串读取。
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// 以字节读取。
    pub fn as_binary(&self) -> Option<&Bytes> {
        match self {
            Value::Binary(v) => Some(v),
            _ => None,
        }
    }

    /// 以列表读取。
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    /// 以集合读取。
    pub fn as_set(&self) -> Option<&ValueSet> {
        match self {
            Value::Set(v) => Some(v),
            _ => None,
        }
    }

    /// 以映射读取。
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    /// 以扩展值读取。
    pub fn as_custom(&self) -> Option<&CustomValue> {
        match self {
            Value::Custom(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(v) => v.hash(state),
            Value::Byte(v) => v.hash(state),
            Value::Short(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::Long(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Double(v) => v.to_bits().hash(state),
            Value::Date(v) => v.hash(state),
            Value::Uuid(v) => v.hash(state),
            Value::String(v) => v.hash(state),
            Value::Binary(v) => v.hash(state),
            Value::List(v) => v.hash(state),
            Value::Set(v) => v.hash(state),
            Value::Map(v) => v.hash(state),
            Value::Custom(v) => v.hash(state),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Boolean,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    Bytes => Binary,
    Vec<Value> => List,
    ValueSet => Set,
    ValueMap => Map,
    CustomValue => Custom,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// 扩展类型契约。
///
/// 新增线上类型时，为业务类型实现本 trait，把它包装为 [`CustomValue`] 放入
/// [`Value::Custom`]，再向注册表注册一个使用相同标记的编解码器即可；
/// 分派上下文与既有编解码器均无需改动。
///
/// `eq_dyn`/`hash_dyn` 通常写作：
///
/// ```ignore
/// fn eq_dyn(&self, other: &dyn CustomType) -> bool {
///     other.as_any().downcast_ref::<Self>() == Some(self)
/// }
///
/// fn hash_dyn(&self, mut state: &mut dyn Hasher) {
///     self.hash(&mut state)
/// }
/// ```
pub trait CustomType: fmt::Debug + Send + Sync + 'static {
    /// 本类型占用的线上标记。
    fn marker(&self) -> TypeMarker;

    /// 类型名称。
    fn type_name(&self) -> &'static str;

    /// 供下转型使用。
    fn as_any(&self) -> &dyn Any;

    /// 与另一个扩展值比较。
    fn eq_dyn(&self, other: &dyn CustomType) -> bool;

    /// 写入哈希状态。
    fn hash_dyn(&self, state: &mut dyn Hasher);
}

/// 共享所有权的扩展值句柄，克隆只增加引用计数。
#[derive(Clone, Debug)]
pub struct CustomValue(Arc<dyn CustomType>);

impl CustomValue {
    /// 包装扩展值。
    pub fn new<T: CustomType>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// 扩展值的类型标记。
    pub fn marker(&self) -> TypeMarker {
        self.0.marker()
    }

    /// 扩展值的类型名称。
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    /// 尝试下转型为具体类型。
    pub fn downcast_ref<T: CustomType>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.marker() == other.marker() && self.0.eq_dyn(other.0.as_ref())
    }
}

impl Eq for CustomValue {}

impl Hash for CustomValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.marker().hash(state);
        self.0.hash_dyn(state);
    }
}
