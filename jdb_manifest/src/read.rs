//! Range resolver: fill an item cache hole from the segments that may hold it
//! 范围解析：从可能包含数据的段中填充条目缓存空洞
//!
//! Non-zero levels don't overlap, so each contributes at most one segment for the
//! missed key. The search window is clamped to what those segments cover, but never
//! past the key itself, so a hole around the key can still be cached negatively. A
//! segment ending before the key is not read, so the window starts after it. All
//! level 0 segments intersecting the clamped window are read too, newest first.
//! 非零层互不重叠，因此每层最多为缺失键提供一个段。搜索窗口被收缩到这些段覆盖的范围，
//! 但不会越过键本身，以便键周围的空洞仍可被负缓存。在 key 之前结束的段不会被读取，
//! 窗口从其之后开始。与收缩后窗口相交的所有 L0 段也会被读取，最新优先。

use log::debug;

use crate::{
  Index, ItemCache, Key, Kv, Manifest, Result, RootSource, SegItem, SegStore, Segment,
  counter::Counters,
  seg_ref::{SegRef, open},
};

/// Key range inserted into the item cache
/// 插入条目缓存的键范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
  pub start: Key,
  pub end: Key,
}

impl<I: Index, R: RootSource<I::Root>> Manifest<I, R> {
  /// Cache the items of the largest safe part of [start, end] around key
  /// 缓存 key 周围 [start, end] 中最大安全部分的条目
  ///
  /// Returns the range inserted. It can end before key when the cache refused items,
  /// the caller then reads again.
  /// 返回插入的范围。缓存拒绝条目时范围可能在 key 之前结束，调用方需再次读取。
  pub async fn read_items<S: SegStore, C: ItemCache>(
    &self,
    key: &[u8],
    start: &[u8],
    end: &[u8],
    segs: &S,
    cache: &C,
  ) -> Result<Span> {
    self
      .retry_stale(move |root| self.read_root(root, key, start, end, segs, cache))
      .await
  }

  async fn read_root<S: SegStore, C: ItemCache>(
    &self,
    root: I::Root,
    key: &[u8],
    start: &[u8],
    end: &[u8],
    segs: &S,
    cache: &C,
  ) -> Result<Span> {
    let mut seg_start: &[u8] = start;
    let mut seg_end: &[u8] = end;

    let mut li = Vec::new();
    let floor = self.nonzero_refs(&root, key, end, &mut li)?;
    if let Some(floor) = &floor
      && &**floor > seg_start
    {
      seg_start = &**floor;
    }

    // Clamp to segment boundaries, including key
    // 收缩到段边界，但须包含 key
    for e in &li {
      if &*e.first > seg_start && &*e.first <= key {
        seg_start = &*e.first;
      }
      if &*e.last < seg_end && &*e.last >= key {
        seg_end = &*e.last;
      }
    }
    let seg_start: Key = seg_start.into();
    let seg_end: Key = seg_end.into();
    debug!("read items {key:?} in {start:?}..{end:?} clamped {seg_start:?}..{seg_end:?}");

    self.zero_refs(&root, &seg_start, &seg_end, &mut li)?;

    let mut refs = open(segs, li).await?;
    for r in &mut refs {
      r.off = r.seg.find_off(&seg_start);
    }

    let mut batch = Vec::new();
    match merge(&mut refs, &seg_end, cache, &mut batch) {
      Ok(batch_end) => {
        if key > &*batch_end {
          Counters::inc(&self.counters().read_excluded_key);
        }
        cache.insert_batch(batch, &seg_start, &batch_end)?;
        Ok(Span {
          start: seg_start,
          end: batch_end,
        })
      }
      Err(e) => {
        cache.free_batch(batch);
        Err(e)
      }
    }
  }
}

/// Merge refs sorted by recency into batch, returning the end of the covered range
/// 将按新旧排序的段合并进批次，返回已覆盖范围的终点
///
/// Deletions are left out of the batch but still extend the covered range.
/// 删除标记不进入批次，但仍会延伸已覆盖范围。
fn merge<S: Segment, C: ItemCache>(
  refs: &mut [SegRef<S>],
  end: &[u8],
  cache: &C,
  batch: &mut Vec<Kv>,
) -> Result<Key> {
  let mut added = false;
  let mut batch_end: Option<Key> = None;

  loop {
    // Least key, ties go to the most recent segment
    // 最小键，相同时取最新的段
    let mut found: Option<SegItem<'_>> = None;
    for r in refs.iter() {
      let Some(off) = r.off else {
        continue;
      };
      let Some(it) = r.seg.item(off).filter(|it| it.key <= end) else {
        continue;
      };
      if found.is_none_or(|f| it.key < f.key) {
        found = Some(it);
      }
    }

    // Ran out of items, the range extends to the window end
    // 条目耗尽，范围延伸到窗口终点
    let Some(it) = found else {
      return Ok(end.into());
    };

    if !it.flag.is_deletion() {
      if let Err(e) = cache.add_batch(batch, it.key, it.val) {
        return match batch_end {
          Some(batch_end) if added => Ok(batch_end),
          _ => Err(e),
        };
      }
      added = true;
    }

    let key: Key = it.key.into();
    if &*key == end {
      return Ok(key);
    }

    // Advance every segment positioned at the found key
    // 推进所有停在该键上的段
    for r in refs.iter_mut() {
      if r.key_within(end).is_some_and(|k| k == &*key) {
        r.off = r.off.and_then(|off| r.seg.next_off(off));
      }
    }
    batch_end = Some(key);
  }
}
