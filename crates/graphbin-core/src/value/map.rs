use core::fmt;
use core::hash::{Hash, Hasher};
use core::slice;
use std::mem;
use std::vec;

use super::Value;
use super::index::{FingerprintIndex, fingerprint};

/// 保持插入顺序的键值映射。
///
/// # 契约说明（What）
/// - 键与值都是任意 [`Value`]，不要求键为基本类型，也不要求各条目类型一致；
/// - 重复插入同一键时后写者胜出：保留首次出现的位置，替换其值；
/// - 迭代顺序即插入顺序，因此 Map 编解码器对同样构造的映射总是写出相同字节；
/// - 相等与哈希按无序键值集合计算，与迭代顺序无关。
#[derive(Clone, Default)]
pub struct ValueMap {
    entries: Vec<(Value, Value)>,
    index: FingerprintIndex,
}

impl ValueMap {
    /// 创建空映射。
    pub fn new() -> Self {
        Self::default()
    }

    /// 以容量提示创建空映射。
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: FingerprintIndex::with_capacity(capacity),
        }
    }

    /// 条目数。
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 插入条目；若键已存在则替换并返回旧值。
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        let hash = fingerprint(&key);
        match self.position(hash, &key) {
            Some(position) => Some(mem::replace(&mut self.entries[position].1, value)),
            None => {
                self.index.record(hash, self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// 查找键对应的值。
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.position(fingerprint(key), key)
            .map(|position| &self.entries[position].1)
    }

    /// 是否包含键。
    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    /// 按插入顺序遍历条目。
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// 按插入顺序遍历键。
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &Value> + '_ {
        self.entries.iter().map(|(key, _)| key)
    }

    /// 按插入顺序遍历值。
    pub fn values(&self) -> impl ExactSizeIterator<Item = &Value> + '_ {
        self.entries.iter().map(|(_, value)| value)
    }

    fn position(&self, hash: u64, key: &Value) -> Option<usize> {
        self.index
            .find(hash, |position| self.entries[position].0 == *key)
    }
}

/// [`ValueMap::iter`] 返回的借用迭代器。
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    inner: slice::Iter<'a, (Value, Value)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Value, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a ValueMap {
    type Item = (&'a Value, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for ValueMap {
    type Item = (Value, Value);
    type IntoIter = vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(Value, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = ValueMap::with_capacity(iter.size_hint().0);
        map.extend(iter);
        map
    }
}

impl Extend<(Value, Value)> for ValueMap {
    fn extend<I: IntoIterator<Item = (Value, Value)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl PartialEq for ValueMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl Eq for ValueMap {}

impl Hash for ValueMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // 条目指纹求和，与顺序无关。
        let combined = self
            .entries
            .iter()
            .fold(0u64, |acc, (key, value)| {
                acc.wrapping_add(fingerprint(&(key, value)))
            });
        state.write_usize(self.entries.len());
        state.write_u64(combined);
    }
}

impl fmt::Debug for ValueMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
