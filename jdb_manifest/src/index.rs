//! Versioned index collaborator
//! 版本化索引协作者
//!
//! A copy-on-write ordered map holding encoded manifest entries. Readers search an
//! immutable root; the single mutator inserts and deletes on the live root. Any
//! read may report `Error::Stale` when the root it walks was reclaimed.
//! 写时复制的有序映射，保存编码后的清单条目。读者在不可变根上搜索，
//! 唯一的写者在活动根上插入和删除。根被回收时，任何读取都可能返回 `Error::Stale`。

use crate::{Key, Result};

/// Index item
/// 索引条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
  pub key: Key,
  pub val: Box<[u8]>,
}

pub trait Index {
  /// Immutable snapshot pointer
  /// 不可变快照指针
  type Root: Clone;

  /// Live root seen by the mutator
  /// 写者看到的活动根
  fn root(&self) -> Self::Root;

  /// Insert, `Error::Exists` if present
  /// 插入，已存在时返回 `Error::Exists`
  fn insert(&self, key: &[u8], val: &[u8]) -> Result<()>;

  /// Delete, `Error::NotFound` if absent
  /// 删除，不存在时返回 `Error::NotFound`
  fn delete(&self, key: &[u8]) -> Result<()>;

  fn lookup(&self, root: &Self::Root, key: &[u8]) -> Result<Option<Item>>;

  /// Greatest item <= key
  /// 小于等于 key 的最大条目
  fn prev(&self, root: &Self::Root, key: &[u8]) -> Result<Option<Item>>;

  /// Least item >= key
  /// 大于等于 key 的最小条目
  fn next(&self, root: &Self::Root, key: &[u8]) -> Result<Option<Item>>;

  /// Greatest item < key
  /// 小于 key 的最大条目
  fn before(&self, root: &Self::Root, key: &[u8]) -> Result<Option<Item>>;

  /// Least item > key
  /// 大于 key 的最小条目
  fn after(&self, root: &Self::Root, key: &[u8]) -> Result<Option<Item>>;
}

/// Source of the current persisted root, e.g. the manifest server
/// 当前持久化根的来源，例如清单服务器
pub trait RootSource<R> {
  /// Current root and its version
  /// 当前根及其版本
  fn current_root(&self) -> Result<(R, u64)>;
}

impl<T: Index + ?Sized> Index for std::sync::Arc<T> {
  type Root = T::Root;

  #[inline]
  fn root(&self) -> Self::Root {
    (**self).root()
  }

  #[inline]
  fn insert(&self, key: &[u8], val: &[u8]) -> Result<()> {
    (**self).insert(key, val)
  }

  #[inline]
  fn delete(&self, key: &[u8]) -> Result<()> {
    (**self).delete(key)
  }

  #[inline]
  fn lookup(&self, root: &Self::Root, key: &[u8]) -> Result<Option<Item>> {
    (**self).lookup(root, key)
  }

  #[inline]
  fn prev(&self, root: &Self::Root, key: &[u8]) -> Result<Option<Item>> {
    (**self).prev(root, key)
  }

  #[inline]
  fn next(&self, root: &Self::Root, key: &[u8]) -> Result<Option<Item>> {
    (**self).next(root, key)
  }

  #[inline]
  fn before(&self, root: &Self::Root, key: &[u8]) -> Result<Option<Item>> {
    (**self).before(root, key)
  }

  #[inline]
  fn after(&self, root: &Self::Root, key: &[u8]) -> Result<Option<Item>> {
    (**self).after(root, key)
  }
}

impl<R, T: RootSource<R> + ?Sized> RootSource<R> for std::sync::Arc<T> {
  #[inline]
  fn current_root(&self) -> Result<(R, u64)> {
    (**self).current_root()
  }
}
