//! Reader-side segment references
//! 读端段引用

use std::cmp::Ordering;

use futures::future::join_all;
use log::trace;

use crate::{Entry, Result, SegStore, Segment};

/// Opened segment of one entry, owned by the resolving call
/// 单个条目的已打开段，归解析调用所有
pub(crate) struct SegRef<S> {
  pub e: Entry,
  pub seg: S,
  /// Scan offset, None when exhausted
  /// 扫描偏移，耗尽时为 None
  pub off: Option<usize>,
}

impl<S: Segment> SegRef<S> {
  /// Current item key if it is still <= end
  /// 当前条目键（仍 <= end 时）
  #[inline]
  pub fn key_within(&self, end: &[u8]) -> Option<&[u8]> {
    let it = self.seg.item(self.off?)?;
    (it.key <= end).then_some(it.key)
  }
}

/// Most recent contents first: lower level first, newer seq first within level 0
/// 最新内容优先：低层优先，L0 内 seq 大者优先
#[inline]
fn recency(a: &Entry, b: &Entry) -> Ordering {
  if a.level == 0 && b.level == 0 {
    b.seq.cmp(&a.seq)
  } else {
    a.level.cmp(&b.level)
  }
}

/// Submit reads for all entries in segno order, then wait on every submitted read
/// 按 segno 顺序提交所有读取，再等待每个已提交的读取
pub(crate) async fn open<T: SegStore>(segs: &T, mut li: Vec<Entry>) -> Result<Vec<SegRef<T::Seg>>> {
  li.sort_unstable_by_key(|e| e.segno);

  let mut err = None;
  let mut pending = Vec::with_capacity(li.len());
  for e in &li {
    trace!(
      "read segment L{} segno {} seq {} {:?}..{:?}",
      e.level, e.segno, e.seq, e.first, e.last
    );
    match segs.submit_read(e.segno) {
      Ok(p) => pending.push(p),
      Err(x) => {
        err = Some(x);
        break;
      }
    }
  }

  // Always wait for submitted reads
  // 总是等待已提交的读取
  let done = join_all(
    li.iter()
      .zip(pending)
      .map(|(e, p)| segs.wait(p, e.segno, e.seq)),
  )
  .await;

  let mut refs = Vec::with_capacity(done.len());
  for (e, r) in li.into_iter().zip(done) {
    match r {
      Ok(seg) => refs.push(SegRef { e, seg, off: None }),
      Err(x) => {
        err.get_or_insert(x);
      }
    }
  }
  if let Some(x) = err {
    return Err(x);
  }

  refs.sort_by(|a, b| recency(&a.e, &b.e));
  Ok(refs)
}
