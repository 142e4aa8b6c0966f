use core::fmt;
use core::hash::{Hash, Hasher};
use core::slice;
use std::vec;

use super::Value;
use super::index::{FingerprintIndex, fingerprint};

/// 保持插入顺序的值集合；重复元素被忽略，首次出现的位置保留。
#[derive(Clone, Default)]
pub struct ValueSet {
    items: Vec<Value>,
    index: FingerprintIndex,
}

impl ValueSet {
    /// 创建空集合。
    pub fn new() -> Self {
        Self::default()
    }

    /// 以容量提示创建空集合。
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            index: FingerprintIndex::with_capacity(capacity),
        }
    }

    /// 元素数。
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 插入元素，返回是否为新元素。
    pub fn insert(&mut self, item: Value) -> bool {
        let hash = fingerprint(&item);
        if self.index.find(hash, |pos| self.items[pos] == item).is_some() {
            return false;
        }
        self.index.record(hash, self.items.len());
        self.items.push(item);
        true
    }

    /// 是否包含元素。
    pub fn contains(&self, item: &Value) -> bool {
        self.index
            .find(fingerprint(item), |pos| self.items[pos] == *item)
            .is_some()
    }

    /// 按插入顺序遍历。
    pub fn iter(&self) -> slice::Iter<'_, Value> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a Value;
    type IntoIter = slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for ValueSet {
    type Item = Value;
    type IntoIter = vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<Value> for ValueSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut set = ValueSet::with_capacity(iter.size_hint().0);
        set.extend(iter);
        set
    }
}

impl Extend<Value> for ValueSet {
    fn extend<I: IntoIterator<Item = Value>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.items.iter().all(|item| other.contains(item))
    }
}

impl Eq for ValueSet {}

impl Hash for ValueSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self
            .items
            .iter()
            .fold(0u64, |acc, item| acc.wrapping_add(fingerprint(item)));
        state.write_usize(self.items.len());
        state.write_u64(combined);
    }
}

impl fmt::Debug for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
