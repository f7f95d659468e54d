//! Item cache collaborator
//! 条目缓存协作者

use crate::{Kv, Result};

pub trait ItemCache {
  /// Append one item to a pending batch, may refuse under memory pressure
  /// 向待插入批次追加一个条目，内存紧张时可拒绝
  fn add_batch(&self, batch: &mut Vec<Kv>, key: &[u8], val: &[u8]) -> Result<()>;

  /// Atomically insert the batch as the full contents of [start, end]
  /// 原子插入批次，作为 [start, end] 的完整内容
  fn insert_batch(&self, batch: Vec<Kv>, start: &[u8], end: &[u8]) -> Result<()>;

  /// Release a batch that will not be inserted
  /// 释放不会插入的批次
  #[inline]
  fn free_batch(&self, batch: Vec<Kv>) {
    drop(batch);
  }
}
