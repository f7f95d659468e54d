//! Manifest searches shared by reads, hints and compaction
//! 读取、提示与压缩共用的清单搜索

use crate::{
  Entry, Index, Item, Key, MAX_LEVEL, Manifest, Result, codec::search_key, entry::overlaps,
  successor,
};

/// Decoded index item with its index key
/// 解码后的索引条目及其索引键
pub(crate) type Found = Option<(Key, Entry)>;

impl<I: Index, R> Manifest<I, R> {
  #[inline]
  fn found(&self, item: Option<Item>) -> Result<Found> {
    match item {
      Some(Item { key, val }) => {
        let e = self.decode(&key, &val)?;
        Ok(Some((key, e)))
      }
      None => Ok(None),
    }
  }

  #[inline]
  pub(crate) fn next_entry(&self, root: &I::Root, key: &[u8]) -> Result<Found> {
    self.found(self.index.next(root, key)?)
  }

  #[inline]
  pub(crate) fn after_entry(&self, root: &I::Root, key: &[u8]) -> Result<Found> {
    self.found(self.index.after(root, key)?)
  }

  /// Entry at or before search, if it is at level
  /// search 处或之前的条目（须位于该层）
  #[inline]
  fn prev_at(&self, root: &I::Root, search: &[u8], level: u8) -> Result<Found> {
    Ok(
      self
        .found(self.index.prev(root, search)?)?
        .filter(|(_, e)| e.level == level),
    )
  }

  /// Entry before search if it is at level and reaches key, else the next entry untested
  /// 若 search 之前的条目位于该层且覆盖到 key 则返回之，否则返回下一个条目（不检查）
  pub(crate) fn prev_overlap_or_next(
    &self,
    root: &I::Root,
    search: &[u8],
    key: &[u8],
    level: u8,
  ) -> Result<Found> {
    if let Some((k, e)) = self.prev_at(root, search, level)?
      && &*e.last >= key
    {
      return Ok(Some((k, e)));
    }
    self.next_entry(root, search)
  }

  /// Push level 0 entries intersecting [start, end], newest first
  /// 推入与 [start, end] 相交的 L0 条目，最新优先
  pub(crate) fn zero_refs(
    &self,
    root: &I::Root,
    start: &[u8],
    end: &[u8],
    li: &mut Vec<Entry>,
  ) -> Result<()> {
    let mut cur = self.found(self.index.prev(root, &search_key(0, u64::MAX, &[]))?)?;
    while let Some((k, e)) = cur {
      if e.level != 0 {
        break;
      }
      if overlaps(start, end, &e.first, &e.last) {
        li.try_reserve(1)?;
        li.push(e);
      }
      cur = self.found(self.index.before(root, &k)?)?;
    }
    Ok(())
  }

  /// Push, per non-zero level, the first entry that may hold key and starts before end
  /// 为每个非零层推入第一个可能包含 key 且起点不超过 end 的条目
  ///
  /// Returns the lowest key the pushed entries are complete from: a level whose entry
  /// before key ends short of key is not read, so nothing up to its last key is known.
  /// The floor never passes key.
  /// 返回已推入条目可保证完整的最低键：若某层 key 之前的条目未覆盖到 key，该条目不会被读取，
  /// 其尾键及之前的内容未知。该下界不会越过 key。
  ///
  /// Levels are walked until the index runs out rather than up to the local level count,
  /// the root being read can be newer than this process.
  /// 按索引耗尽为止遍历层级而非本地层数，被读取的根可能比本进程更新。
  pub(crate) fn nonzero_refs(
    &self,
    root: &I::Root,
    key: &[u8],
    end: &[u8],
    li: &mut Vec<Entry>,
  ) -> Result<Option<Key>> {
    let mut floor: Option<Key> = None;
    for level in 1..=MAX_LEVEL {
      let search = search_key(level, 0, key);
      let found = match self.prev_at(root, &search, level)? {
        Some(f) if &*f.1.last >= key => Some(f),
        prev => {
          if let Some((_, e)) = prev
            && floor.as_deref().is_none_or(|f| &*e.last >= f)
          {
            floor = Some(successor(&e.last));
          }
          self.next_entry(root, &search)?
        }
      };
      let Some((_, e)) = found else {
        break;
      };
      if e.level != level || &*e.first > end {
        continue;
      }
      li.try_reserve(1)?;
      li.push(e);
    }
    Ok(floor)
  }
}
