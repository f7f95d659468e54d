//! Manifest entry
//! 清单条目

use crate::{Key, MAX_KEY_LEN, Segno, Seq};

/// One immutable segment registered in the manifest
/// 清单中登记的一个不可变段
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
  pub level: u8,
  pub segno: Segno,
  pub seq: Seq,
  /// First key / 首键
  pub first: Key,
  /// Last key / 尾键
  pub last: Key,
}

impl Entry {
  #[inline]
  pub fn new(
    level: u8,
    segno: Segno,
    seq: Seq,
    first: impl Into<Key>,
    last: impl Into<Key>,
  ) -> Self {
    Self {
      level,
      segno,
      seq,
      first: first.into(),
      last: last.into(),
    }
  }

  /// Check if [start, end] intersects this entry
  /// 检查 [start, end] 是否与本条目相交
  #[inline]
  pub fn overlaps(&self, start: &[u8], end: &[u8]) -> bool {
    overlaps(start, end, &self.first, &self.last)
  }
}

/// Inclusive range intersection
/// 闭区间相交
#[inline]
pub(crate) fn overlaps(a_start: &[u8], a_end: &[u8], b_start: &[u8], b_end: &[u8]) -> bool {
  a_start <= b_end && b_start <= a_end
}

/// Smallest key strictly greater than key
/// 严格大于 key 的最小键
#[inline]
pub fn successor(key: &[u8]) -> Key {
  let mut v = Vec::with_capacity(key.len() + 1);
  v.extend_from_slice(key);
  v.push(0);
  v.into_boxed_slice()
}

/// Key sorting at or after every valid key
/// 不小于任何合法键的键
#[inline]
pub fn max_key() -> Key {
  vec![0xff; MAX_KEY_LEN].into_boxed_slice()
}
