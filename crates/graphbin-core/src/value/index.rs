use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// 以哈希指纹为键、以条目下标为值的辅助索引。
///
/// `ValueMap`/`ValueSet` 的条目按插入顺序存放在 `Vec` 中，本索引只记录下标，
/// 查找时先按指纹定位候选下标，再由调用方比较真实键值解决碰撞，避免为索引克隆键。
/// 不支持删除：下标一旦写入便保持有效。
#[derive(Clone, Debug, Default)]
pub(crate) struct FingerprintIndex {
    buckets: HashMap<u64, Vec<usize>>,
}

impl FingerprintIndex {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: HashMap::with_capacity(capacity),
        }
    }

    /// 在指纹相同的候选下标中寻找第一个满足 `matches` 的位置。
    pub(crate) fn find(&self, hash: u64, mut matches: impl FnMut(usize) -> bool) -> Option<usize> {
        self.buckets
            .get(&hash)?
            .iter()
            .copied()
            .find(|&position| matches(position))
    }

    pub(crate) fn record(&mut self, hash: u64, position: usize) {
        self.buckets.entry(hash).or_default().push(position);
    }
}

/// 使用固定密钥的 SipHash 计算指纹，同一进程内结果稳定，可用于无序集合的哈希合成。
pub(crate) fn fingerprint<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
