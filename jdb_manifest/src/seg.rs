//! Segment store collaborator
//! 段存储协作者

use std::future::Future;

use crate::{Result, Segno, Seq};

/// Item flag bits
/// 条目标志位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flag(pub u8);

impl Flag {
  /// Deletion marker / 删除标记
  pub const DELETION: Self = Self(1);

  #[inline]
  pub const fn is_deletion(self) -> bool {
    self.0 & Self::DELETION.0 != 0
  }
}

/// Item borrowed from an opened segment
/// 从已打开段借用的条目
#[derive(Debug, Clone, Copy)]
pub struct SegItem<'a> {
  pub key: &'a [u8],
  pub val: &'a [u8],
  pub flag: Flag,
}

/// Opened immutable segment, items sorted by key
/// 已打开的不可变段，条目按键排序
pub trait Segment {
  /// Offset of the first item >= key
  /// 第一个 >= key 的条目偏移
  fn find_off(&self, key: &[u8]) -> Option<usize>;

  fn item(&self, off: usize) -> Option<SegItem<'_>>;

  fn next_off(&self, off: usize) -> Option<usize>;
}

/// Asynchronous segment reads: submit now, wait later
/// 异步段读取：先提交，后等待
pub trait SegStore {
  /// In-flight read
  /// 进行中的读取
  type Pending;
  type Seg: Segment;

  fn submit_read(&self, segno: Segno) -> Result<Self::Pending>;

  /// Wait for the read and verify it holds segno at seq
  /// 等待读取完成并校验其为 seq 时的 segno
  fn wait(
    &self,
    pending: Self::Pending,
    segno: Segno,
    seq: Seq,
  ) -> impl Future<Output = Result<Self::Seg>>;
}
