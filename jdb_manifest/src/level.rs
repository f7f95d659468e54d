//! Level accounting
//! 层级计数
//!
//! Counts change only under the manifest lock. `nr_levels` and the L0 full flag are
//! atomics so readers and admission control can poll them without the lock.
//! 计数仅在清单锁下变化。`nr_levels` 与 L0 满标志为原子量，
//! 读者和准入控制无需加锁即可轮询。

use std::sync::atomic::{
  AtomicBool, AtomicU8,
  Ordering::{Acquire, Release},
};

use crate::conf::{LEVELS, ParsedConf};

/// Segment counts per level
/// 每层段数
pub type Counts = [u64; LEVELS];

#[derive(Debug)]
pub(crate) struct Levels {
  nr_levels: AtomicU8,
  l0_full: AtomicBool,
  /// Calculated on open, const thereafter
  /// 打开时计算，此后不变
  limits: Counts,
}

impl Levels {
  pub fn new(conf: &ParsedConf, counts: &Counts) -> Self {
    let nr_levels = counts
      .iter()
      .rposition(|&n| n > 0)
      .map_or(0, |i| i as u8 + 1);
    Self {
      nr_levels: AtomicU8::new(nr_levels),
      l0_full: AtomicBool::new(counts[0] > 0),
      limits: conf.limits(),
    }
  }

  #[inline]
  pub fn nr_levels(&self) -> u8 {
    self.nr_levels.load(Acquire)
  }

  #[inline]
  pub fn l0_full(&self) -> bool {
    self.l0_full.load(Acquire)
  }

  #[inline]
  pub fn limit(&self, level: u8) -> u64 {
    self.limits[level as usize]
  }

  /// Count a new entry (caller holds the lock)
  /// 计入新条目（调用方持锁）
  pub fn inc(&self, counts: &mut Counts, level: u8) {
    let i = level as usize;
    counts[i] += 1;
    self.nr_levels.fetch_max(level + 1, Release);
    if level == 0 {
      self.sync_l0(counts[0]);
    }
  }

  /// Uncount a removed entry (caller holds the lock)
  /// 扣除已删除条目（调用方持锁）
  pub fn dec(&self, counts: &mut Counts, level: u8) {
    let i = level as usize;
    counts[i] = counts[i].saturating_sub(1);
    if level == 0 {
      self.sync_l0(counts[0]);
    }
  }

  #[inline]
  fn sync_l0(&self, count: u64) {
    self.l0_full.store(count > 0, Release);
  }

  /// Highest level holding more segments than its limit
  /// 段数超过上限的最高层
  pub fn overfull(&self, counts: &Counts) -> Option<u8> {
    (0..self.nr_levels()).rev().find(|&l| counts[l as usize] > self.limit(l))
  }
}
