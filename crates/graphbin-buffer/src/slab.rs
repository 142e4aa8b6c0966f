use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use spin::Mutex;
use tracing::trace;

use graphbin_core::{BufferAllocator, ConfigError, Result};

/// 切片分配器配置。
///
/// ```toml
/// slab_size = 65536
/// max_slab_region = 1024
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlabConfig {
    /// 每个大块的字节数。
    pub slab_size: usize,
    /// 从大块中切出的最大区段；更大的请求直接向堆申请。
    pub max_slab_region: usize,
}

impl SlabConfig {
    /// 校验：两者均大于 0，且区段上限不超过大块大小。
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.slab_size == 0 {
            return Err(ConfigError::Invalid {
                field: "slab_size",
                reason: "slab size must be greater than zero".to_owned(),
            });
        }
        if self.max_slab_region == 0 || self.max_slab_region > self.slab_size {
            return Err(ConfigError::Invalid {
                field: "max_slab_region",
                reason: format!(
                    "region limit {} must be within 1..={}",
                    self.max_slab_region, self.slab_size
                ),
            });
        }
        Ok(())
    }
}

impl Default for SlabConfig {
    fn default() -> Self {
        Self {
            slab_size: 64 * 1024,
            max_slab_region: 1024,
        }
    }
}

/// 统计快照。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlabStats {
    /// 已申请的大块数量。
    pub slabs_allocated: u64,
    /// 从大块中切出的区段数量。
    pub regions_served: u64,
    /// 从大块中切出的总字节数。
    pub bytes_served: u64,
    /// 超过区段上限、直接走堆分配的请求数量。
    pub oversized_allocations: u64,
}

/// `SlabAllocator` 顺序切分共享大块，为写路径提供小区段。
///
/// # 核心机制（How）
/// - 当前大块以 `BytesMut::zeroed` 申请，请求到来时 `split_to(n)` 切出前 `n` 字节并清空长度，
///   调用方得到容量为 `n`、长度为 0 的可写区段；
/// - 剩余字节不足时丢弃当前大块的尾部，申请新块；被丢弃的尾部随最后一个区段释放；
/// - 超过 `max_slab_region` 的请求不进入大块，避免一次大请求浪费整块。
///
/// # 契约说明（What）
/// - `acquire(min_capacity)` 返回的区段容量不小于 `min_capacity`；
/// - 克隆体共享同一组大块与统计。
#[derive(Clone, Debug)]
pub struct SlabAllocator {
    inner: Arc<SlabInner>,
}

#[derive(Debug)]
struct SlabInner {
    config: SlabConfig,
    current: Mutex<BytesMut>,
    metrics: SlabMetrics,
}

impl SlabAllocator {
    /// 使用给定配置创建分配器。
    pub fn new(config: SlabConfig) -> core::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: SlabConfig) -> Self {
        Self {
            inner: Arc::new(SlabInner {
                config,
                current: Mutex::new(BytesMut::new()),
                metrics: SlabMetrics::default(),
            }),
        }
    }

    /// 当前配置。
    pub fn config(&self) -> SlabConfig {
        self.inner.config
    }

    /// 读取统计快照。
    pub fn statistics(&self) -> SlabStats {
        self.inner.metrics.snapshot()
    }
}

impl Default for SlabAllocator {
    fn default() -> Self {
        Self::from_validated(SlabConfig::default())
    }
}

impl BufferAllocator for SlabAllocator {
    fn acquire(&self, min_capacity: usize) -> Result<BytesMut> {
        let inner = &self.inner;
        if min_capacity > inner.config.max_slab_region {
            inner.metrics.oversized.fetch_add(1, Ordering::Relaxed);
            return Ok(BytesMut::with_capacity(min_capacity));
        }

        let mut region = {
            let mut current = inner.current.lock();
            if current.len() < min_capacity {
                *current = BytesMut::zeroed(inner.config.slab_size);
                inner.metrics.slabs.fetch_add(1, Ordering::Relaxed);
                trace!(slab_size = inner.config.slab_size, "slab refilled");
            }
            current.split_to(min_capacity)
        };
        region.clear();
        inner.metrics.regions.fetch_add(1, Ordering::Relaxed);
        inner
            .metrics
            .bytes
            .fetch_add(min_capacity as u64, Ordering::Relaxed);
        Ok(region)
    }
}

#[derive(Debug, Default)]
struct SlabMetrics {
    slabs: AtomicU64,
    regions: AtomicU64,
    bytes: AtomicU64,
    oversized: AtomicU64,
}

impl SlabMetrics {
    fn snapshot(&self) -> SlabStats {
        SlabStats {
            slabs_allocated: self.slabs.load(Ordering::Relaxed),
            regions_served: self.regions.load(Ordering::Relaxed),
            bytes_served: self.bytes.load(Ordering::Relaxed),
            oversized_allocations: self.oversized.load(Ordering::Relaxed),
        }
    }
}
