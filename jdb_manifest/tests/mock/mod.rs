//! Test collaborators
//! 测试用协作者

#![allow(dead_code)]

use std::{
  collections::HashMap,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering::SeqCst},
  },
};

use jdb_manifest::{
  Conf, Entry, Error, Flag, Index, Item, ItemCache, Kv, Manifest, MemIndex, Persist, Result,
  RootSource, SegItem, SegStore, Segment, mem::MemRoot,
};
use parking_lot::Mutex;

pub type Mani = Manifest<Arc<MemIndex>, Arc<MemIndex>>;

pub fn mani(conf: &[Conf]) -> Mani {
  let index = Arc::new(MemIndex::new());
  Manifest::new(Arc::clone(&index), index, conf, Persist::default())
}

pub fn ent(level: u8, segno: u64, seq: u64, first: &str, last: &str) -> Entry {
  Entry::new(level, segno, seq, first.as_bytes(), last.as_bytes())
}

/// In-memory segment, items sorted by key
/// 内存段，条目按键排序
#[derive(Debug, Default)]
pub struct MemSeg {
  items: Vec<(Box<[u8]>, Box<[u8]>, Flag)>,
}

impl MemSeg {
  /// Items as (key, val), val "-" marks a deletion
  /// 条目为 (key, val)，val 为 "-" 表示删除
  pub fn new(items: &[(&str, &str)]) -> Self {
    let mut items: Vec<(Box<[u8]>, Box<[u8]>, Flag)> = items
      .iter()
      .map(|(k, v)| {
        let flag = if *v == "-" { Flag::DELETION } else { Flag::default() };
        (k.as_bytes().into(), v.as_bytes().into(), flag)
      })
      .collect();
    items.sort_by(|a, b| a.0.cmp(&b.0));
    Self { items }
  }
}

/// Opened handle of a MemSeg
/// MemSeg 的已打开句柄
#[derive(Debug, Clone)]
pub struct SegHandle(pub Arc<MemSeg>);

impl Segment for SegHandle {
  fn find_off(&self, key: &[u8]) -> Option<usize> {
    let i = self.0.items.partition_point(|it| &*it.0 < key);
    (i < self.0.items.len()).then_some(i)
  }

  fn item(&self, off: usize) -> Option<SegItem<'_>> {
    self.0.items.get(off).map(|(key, val, flag)| SegItem {
      key,
      val,
      flag: *flag,
    })
  }

  fn next_off(&self, off: usize) -> Option<usize> {
    let n = off + 1;
    (n < self.0.items.len()).then_some(n)
  }
}

/// Segment store recording submit and wait order
/// 记录提交与等待顺序的段存储
#[derive(Default)]
pub struct MemSegs {
  segs: HashMap<u64, Arc<MemSeg>>,
  pub submitted: Mutex<Vec<u64>>,
  pub waited: Mutex<Vec<u64>>,
}

impl MemSegs {
  pub fn put(&mut self, segno: u64, items: &[(&str, &str)]) {
    self.segs.insert(segno, Arc::new(MemSeg::new(items)));
  }
}

impl SegStore for MemSegs {
  type Pending = Arc<MemSeg>;
  type Seg = SegHandle;

  fn submit_read(&self, segno: u64) -> Result<Arc<MemSeg>> {
    self.submitted.lock().push(segno);
    self
      .segs
      .get(&segno)
      .cloned()
      .ok_or_else(|| Error::Io(std::io::Error::other(format!("no segment {segno}"))))
  }

  async fn wait(&self, pending: Arc<MemSeg>, segno: u64, _seq: u64) -> Result<SegHandle> {
    self.waited.lock().push(segno);
    Ok(SegHandle(pending))
  }
}

/// Item cache recording inserted batches
/// 记录插入批次的条目缓存
#[derive(Default)]
pub struct MemCache {
  /// Refuse items beyond this many per batch
  /// 每批超过该数量后拒绝
  pub limit: Option<usize>,
  pub inserted: Mutex<Vec<(Vec<Kv>, Box<[u8]>, Box<[u8]>)>>,
  pub freed: AtomicUsize,
}

impl MemCache {
  pub fn with_limit(limit: usize) -> Self {
    Self {
      limit: Some(limit),
      ..Default::default()
    }
  }

  /// Last batch as (key, val) strings
  /// 最后一批，以字符串 (key, val) 表示
  pub fn last(&self) -> Vec<(String, String)> {
    let inserted = self.inserted.lock();
    let Some((batch, _, _)) = inserted.last() else {
      return Vec::new();
    };
    batch
      .iter()
      .map(|(k, v)| {
        (
          String::from_utf8_lossy(k).into_owned(),
          String::from_utf8_lossy(v).into_owned(),
        )
      })
      .collect()
  }
}

impl ItemCache for MemCache {
  fn add_batch(&self, batch: &mut Vec<Kv>, key: &[u8], val: &[u8]) -> Result<()> {
    if self.limit.is_some_and(|n| batch.len() >= n) {
      return Err(Error::index("cache full"));
    }
    batch.push((key.into(), val.into()));
    Ok(())
  }

  fn insert_batch(&self, batch: Vec<Kv>, start: &[u8], end: &[u8]) -> Result<()> {
    self.inserted.lock().push((batch, start.into(), end.into()));
    Ok(())
  }

  fn free_batch(&self, batch: Vec<Kv>) {
    drop(batch);
    self.freed.fetch_add(1, SeqCst);
  }
}

/// Report stale while the countdown is positive
/// 倒计数为正时报告过期
fn take(left: &AtomicUsize) -> Result<()> {
  let n = left.load(SeqCst);
  if n > 0 {
    left.store(n - 1, SeqCst);
    return Err(Error::Stale);
  }
  Ok(())
}

/// Index whose reads report staleness a number of times
/// 读取时会报告若干次过期的索引
pub struct StaleIndex {
  pub inner: Arc<MemIndex>,
  /// Stale reads left to report
  /// 剩余需报告的过期读取次数
  pub stale: AtomicUsize,
  /// Bump the root version on each current_root call
  /// 每次 current_root 时递增根版本
  pub bump: bool,
  pub roots: AtomicUsize,
  /// Root fetches left to report stale
  /// 剩余需报告过期的取根次数
  pub root_stale: AtomicUsize,
}

impl StaleIndex {
  pub fn new(stale: usize, bump: bool) -> Self {
    Self {
      inner: Arc::new(MemIndex::new()),
      stale: AtomicUsize::new(stale),
      bump,
      roots: AtomicUsize::new(0),
      root_stale: AtomicUsize::new(0),
    }
  }

  pub fn with_root_stale(root_stale: usize) -> Self {
    let index = Self::new(0, false);
    index.root_stale.store(root_stale, SeqCst);
    index
  }

  fn check(&self) -> Result<()> {
    take(&self.stale)
  }
}

impl Index for StaleIndex {
  type Root = MemRoot;

  fn root(&self) -> MemRoot {
    self.inner.root()
  }

  fn insert(&self, key: &[u8], val: &[u8]) -> Result<()> {
    self.inner.insert(key, val)
  }

  fn delete(&self, key: &[u8]) -> Result<()> {
    self.inner.delete(key)
  }

  fn lookup(&self, root: &MemRoot, key: &[u8]) -> Result<Option<Item>> {
    self.check()?;
    self.inner.lookup(root, key)
  }

  fn prev(&self, root: &MemRoot, key: &[u8]) -> Result<Option<Item>> {
    self.check()?;
    self.inner.prev(root, key)
  }

  fn next(&self, root: &MemRoot, key: &[u8]) -> Result<Option<Item>> {
    self.check()?;
    self.inner.next(root, key)
  }

  fn before(&self, root: &MemRoot, key: &[u8]) -> Result<Option<Item>> {
    self.check()?;
    self.inner.before(root, key)
  }

  fn after(&self, root: &MemRoot, key: &[u8]) -> Result<Option<Item>> {
    self.check()?;
    self.inner.after(root, key)
  }
}

impl RootSource<MemRoot> for StaleIndex {
  fn current_root(&self) -> Result<(MemRoot, u64)> {
    take(&self.root_stale)?;
    let n = self.roots.fetch_add(1, SeqCst) as u64;
    let root = self.inner.root();
    let ver = if self.bump { root.ver() + n } else { root.ver() };
    Ok((root, ver))
  }
}
