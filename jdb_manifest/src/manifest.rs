//! Manifest store
//! 清单存储

use std::future::Future;

use log::{debug, error, trace};
use parking_lot::{Mutex, MutexGuard};

use crate::{
  Conf, Entry, Error, Index, Key, ParsedConf, Result, RootSource, codec,
  conf::LEVELS,
  counter::{Counters, Triggers},
  level::{Counts, Levels},
};

/// Manifest state kept by the superblock across mounts
/// 跨挂载由超级块保存的清单状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Persist {
  pub level_counts: [u64; LEVELS],
  /// Next compaction start key per level
  /// 每层下一次压缩的起始键
  pub cursors: [Key; LEVELS],
}

/// Guarded by the exclusive mutation lock
/// 由独占修改锁保护
#[derive(Debug)]
pub(crate) struct State {
  pub counts: Counts,
  pub cursors: [Key; LEVELS],
}

/// Leveled segment manifest, one per mounted volume
/// 分层段清单，每个挂载卷一个
pub struct Manifest<I, R> {
  pub(crate) index: I,
  pub(crate) roots: R,
  pub(crate) conf: ParsedConf,
  pub(crate) levels: Levels,
  pub(crate) state: Mutex<State>,
  counters: Counters,
  triggers: Triggers,
}

impl<I: Index, R> Manifest<I, R> {
  pub fn new(index: I, roots: R, conf: &[Conf], persist: Persist) -> Self {
    let conf = ParsedConf::new(conf);
    let levels = Levels::new(&conf, &persist.level_counts);
    Self {
      index,
      roots,
      conf,
      levels,
      state: Mutex::new(State {
        counts: persist.level_counts,
        cursors: persist.cursors,
      }),
      counters: Counters::default(),
      triggers: Triggers::default(),
    }
  }

  /// Take the exclusive mutation lock, dropping the writer unlocks
  /// 获取独占修改锁，Writer 被 drop 时解锁
  #[inline]
  pub fn lock(&self) -> Writer<'_, I, R> {
    Writer {
      m: self,
      state: self.state.lock(),
    }
  }

  /// Snapshot of the state to persist
  /// 需持久化的状态快照
  pub fn persist(&self) -> Persist {
    let state = self.state.lock();
    Persist {
      level_counts: state.counts,
      cursors: state.cursors.clone(),
    }
  }

  /// Level 0 holds segments, foreground writers should wait for compaction
  /// L0 有段，前台写入应等待压缩
  #[inline]
  pub fn level0_full(&self) -> bool {
    self.levels.l0_full()
  }

  #[inline]
  pub fn nr_levels(&self) -> u8 {
    self.levels.nr_levels()
  }

  #[inline]
  pub fn level_limit(&self, level: u8) -> u64 {
    self.levels.limit(level)
  }

  #[inline]
  pub fn fanout(&self) -> u64 {
    self.conf.fanout
  }

  #[inline]
  pub fn index(&self) -> &I {
    &self.index
  }

  #[inline]
  pub fn counters(&self) -> &Counters {
    &self.counters
  }

  #[inline]
  pub fn triggers(&self) -> &Triggers {
    &self.triggers
  }

  /// Decode an index item, counting corruption
  /// 解码索引条目，并统计损坏
  pub(crate) fn decode(&self, key: &[u8], val: &[u8]) -> Result<Entry> {
    codec::decode(key, val).inspect_err(|e| {
      if matches!(e, Error::Corruption(_)) {
        Counters::inc(&self.counters.corruption);
        error!("manifest {e}, key {key:?}");
      }
    })
  }
}

impl<I: Index, R: RootSource<I::Root>> Manifest<I, R> {
  /// Run a read against the current root, retrying once per root version on staleness
  /// 在当前根上执行读取，每个根版本遇到过期时重试一次
  ///
  /// A stale root fetch takes the same path as a stale read.
  /// 获取根时过期与读取时过期走相同路径。
  pub(crate) async fn retry_stale<T, F, Fut>(&self, mut f: F) -> Result<T>
  where
    F: FnMut(I::Root) -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    let mut last_ver = None;
    loop {
      let (r, ver) = match self.roots.current_root() {
        Ok((root, ver)) => (f(root).await, ver),
        // No root to read, counted against the last version seen
        // 无根可读，计入上次见到的版本
        Err(e) => (Err(e), last_ver.unwrap_or(0)),
      };

      let force = self.triggers.take_hard_stale();
      if force || matches!(r, Err(Error::Stale)) {
        if !force && last_ver != Some(ver) {
          debug!("stale manifest root ver {ver}, retry");
          Counters::inc(&self.counters.stale_retry);
          last_ver = Some(ver);
          continue;
        }
        Counters::inc(&self.counters.hard_stale);
        error!("hard stale manifest root ver {ver}");
        return Err(Error::HardStale(ver));
      }
      return r;
    }
  }
}

/// Holder of the exclusive mutation lock
/// 独占修改锁的持有者
pub struct Writer<'a, I, R> {
  m: &'a Manifest<I, R>,
  state: MutexGuard<'a, State>,
}

impl<I: Index, R> Writer<'_, I, R> {
  /// Register a segment
  /// 登记一个段
  pub fn add(&mut self, e: &Entry) -> Result<()> {
    let (key, val) = codec::encode(e)?;
    trace!(
      "manifest add L{} segno {} seq {} {:?}..{:?}",
      e.level, e.segno, e.seq, e.first, e.last
    );
    self.m.index.insert(&key, &val)?;
    self.m.levels.inc(&mut self.state.counts, e.level);
    Ok(())
  }

  /// Retire a segment
  /// 注销一个段
  pub fn rm(&mut self, e: &Entry) -> Result<()> {
    let key = codec::encode_key(e)?;
    trace!(
      "manifest rm L{} segno {} seq {} {:?}..{:?}",
      e.level, e.segno, e.seq, e.first, e.last
    );
    self.m.index.delete(&key)?;
    self.m.levels.dec(&mut self.state.counts, e.level);
    Ok(())
  }

  #[inline]
  pub fn level_count(&self, level: u8) -> u64 {
    self.state.counts.get(level as usize).copied().unwrap_or(0)
  }
}
