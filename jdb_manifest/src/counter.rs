//! Observability counters and fault triggers
//! 观测计数器与故障触发器

use std::sync::atomic::{
  AtomicBool, AtomicU64,
  Ordering::{Relaxed, SeqCst},
};

/// Event counters, readable at any time
/// 事件计数器，可随时读取
#[derive(Debug, Default)]
pub struct Counters {
  /// Cached range ended before the missed key
  /// 缓存范围在缺失键之前结束
  pub read_excluded_key: AtomicU64,
  /// Retries after a stale root
  /// 过期根后的重试
  pub stale_retry: AtomicU64,
  pub hard_stale: AtomicU64,
  pub corruption: AtomicU64,
}

impl Counters {
  #[inline]
  pub(crate) fn inc(c: &AtomicU64) {
    c.fetch_add(1, Relaxed);
  }

  #[inline]
  pub fn get(c: &AtomicU64) -> u64 {
    c.load(Relaxed)
  }
}

/// One-shot fault injection
/// 一次性故障注入
#[derive(Debug, Default)]
pub struct Triggers {
  hard_stale: AtomicBool,
}

impl Triggers {
  /// Make the next read fail as a hard stale error
  /// 使下一次读取以硬过期错误失败
  #[inline]
  pub fn arm_hard_stale(&self) {
    self.hard_stale.store(true, SeqCst);
  }

  #[inline]
  pub(crate) fn take_hard_stale(&self) -> bool {
    self.hard_stale.swap(false, SeqCst)
  }
}
