//! Compaction candidate selection
//! 压缩候选挑选
//!
//! A level is compacted once it holds more segments than its exponentially growing
//! limit. Level 0 gives up its oldest segment. Higher levels take the segment after a
//! per-level cursor, so the cursors sweep each level like clock hands, wrapping faster
//! on smaller levels. The chosen segment is joined by up to fanout overlapping
//! segments of the next level.
//! 当某层段数超过其指数增长的上限时触发压缩。L0 交出最旧的段；更高层按每层游标
//! 取下一个段，游标如时钟指针般扫过各层，小层回绕更快。选中的段与下一层最多
//! fanout 个重叠段一起压缩。
//!
//! TODO: prefer segments with many deletions or partial segments, and keep
//! concurrent compactions from picking overlapping inputs.
//! TODO：优先删除多的段或不满的段，并避免并发压缩挑选重叠的输入。

use log::debug;

use crate::{Entry, Index, Manifest, Result, codec::search_key, successor};

/// Receiver of selected compaction inputs
/// 压缩输入的接收方
pub trait CompactSink {
  fn add(&mut self, entry: Entry) -> Result<()>;

  /// Called once after all inputs were added
  /// 所有输入添加完毕后调用一次
  ///
  /// sticky: the upper segment overlaps more than fanout lower segments, it must stay
  /// to be merged with the remainder
  /// sticky：上层段与超过 fanout 个下层段重叠，须保留以便与剩余部分合并
  fn describe(&mut self, level: u8, top_level: u8, sticky: bool);
}

/// Collected compaction inputs, upper entry first
/// 收集到的压缩输入，上层条目在前
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compaction {
  pub entries: Vec<Entry>,
  pub level: u8,
  pub top_level: u8,
  pub sticky: bool,
}

impl CompactSink for Compaction {
  #[inline]
  fn add(&mut self, entry: Entry) -> Result<()> {
    self.entries.try_reserve(1)?;
    self.entries.push(entry);
    Ok(())
  }

  #[inline]
  fn describe(&mut self, level: u8, top_level: u8, sticky: bool) {
    self.level = level;
    self.top_level = top_level;
    self.sticky = sticky;
  }
}

impl<I: Index, R> Manifest<I, R> {
  /// Hand the next compaction's inputs to sink, returns how many were handed
  /// 将下一次压缩的输入交给 sink，返回交出的数量
  ///
  /// Holds the mutation lock throughout, no I/O is done. Inputs handed before an error
  /// stay with the sink.
  /// 全程持有修改锁，不做 I/O。出错前已交出的输入仍归 sink。
  pub fn next_compact(&self, sink: &mut impl CompactSink) -> Result<usize> {
    let mut state = self.state.lock();

    let Some(level) = self.levels.overfull(&state.counts) else {
      return Ok(0);
    };

    let root = self.index.root();
    let found = if level == 0 {
      self.next_entry(&root, &search_key(0, 0, &[]))?
    } else {
      let cursor = &state.cursors[level as usize];
      match self.next_entry(&root, &search_key(level, 0, cursor))? {
        Some(f) if f.1.level == level => Some(f),
        // Wrap to the first entry in level
        // 回绕到该层第一个条目
        _ => self.next_entry(&root, &search_key(level, 0, &[]))?,
      }
    };
    let Some((_, upper)) = found.filter(|(_, e)| e.level == level) else {
      return Ok(0);
    };

    debug!(
      "compact L{level} segno {} {:?}..{:?}",
      upper.segno, upper.first, upper.last
    );

    let mut nr = 0;
    sink.add(upper.clone())?;
    nr += 1;

    // Add a fanout's worth of lower overlapping segments
    // 添加至多 fanout 个下层重叠段
    let lower = level + 1;
    let fanout = self.conf.fanout;
    let mut sticky = false;
    let mut over = self.prev_overlap_or_next(
      &root,
      &search_key(lower, 0, &upper.first),
      &upper.first,
      lower,
    )?;
    let mut i = 0;
    while let Some((key, e)) = over {
      if e.level != lower || !upper.overlaps(&e.first, &e.last) {
        break;
      }
      if i == fanout {
        sticky = true;
        break;
      }
      sink.add(e)?;
      nr += 1;
      i += 1;
      over = self.after_entry(&root, &key)?;
    }

    let top_level = self.levels.nr_levels().saturating_sub(1);
    debug!("compact L{level} inputs {nr} top L{top_level} sticky {sticky}");
    sink.describe(level, top_level, sticky);

    // Resume after this entry next time
    // 下次从该条目之后继续
    state.cursors[level as usize] = successor(&upper.last);

    Ok(nr)
  }
}
