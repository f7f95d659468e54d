//! Next key hint
//! 下一键提示

use crate::{
  Error, Index, Key, Manifest, Result, RootSource, SegStore, Segment, max_key, seg_ref::open,
};

impl<I: Index, R: RootSource<I::Root>> Manifest<I, R> {
  /// Nearest key at or after key that any segment might hold
  /// 任意段可能包含的、不小于 key 的最近键
  ///
  /// Only a hint: it can be a deleted item or a segment boundary well before the next
  /// live item. Callers iterate with it and re-check. `Error::NotFound` when no segment
  /// reaches key.
  /// 仅为提示：可能是已删除条目，或远早于下一个有效条目的段边界。
  /// 调用方据此迭代并重新检查。没有段覆盖到 key 时返回 `Error::NotFound`。
  pub async fn next_key<S: SegStore>(&self, key: &[u8], segs: &S) -> Result<Key> {
    self
      .retry_stale(move |root| self.next_key_root(root, key, segs))
      .await
  }

  async fn next_key_root<S: SegStore>(&self, root: I::Root, key: &[u8], segs: &S) -> Result<Key> {
    let end = max_key();
    let mut li = Vec::new();
    self.zero_refs(&root, key, &end, &mut li)?;
    self.nonzero_refs(&root, key, &end, &mut li)?;
    if li.is_empty() {
      return Err(Error::NotFound);
    }

    let refs = open(segs, li).await?;

    // Nearest segment limit by default
    // 默认取最近的段边界
    let mut next: Option<&[u8]> = None;
    for r in refs.iter().filter(|r| r.e.level > 0) {
      if next.is_none_or(|n| &*r.e.last < n) {
        next = Some(&*r.e.last);
      }
    }

    // Nearest item in the segments
    // 段中最近的条目
    for r in &refs {
      let Some(it) = r.seg.find_off(key).and_then(|off| r.seg.item(off)) else {
        continue;
      };
      if next.is_none_or(|n| it.key < n) {
        next = Some(it.key);
      }
    }

    next.map(Key::from).ok_or(Error::NotFound)
  }
}
