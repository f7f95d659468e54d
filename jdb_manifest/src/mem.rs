//! In-memory copy-on-write index
//! 内存写时复制索引

use std::{collections::BTreeMap, ops::Bound, sync::Arc};

use parking_lot::Mutex;

use crate::{Error, Index, Item, Key, Result, RootSource};

type Map = BTreeMap<Key, Box<[u8]>>;

/// Immutable snapshot of a MemIndex
/// MemIndex 的不可变快照
#[derive(Debug, Clone, Default)]
pub struct MemRoot {
  ver: u64,
  map: Arc<Map>,
}

impl MemRoot {
  #[inline]
  pub fn ver(&self) -> u64 {
    self.ver
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.map.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.map.is_empty()
  }

  /// Iterate items in index order
  /// 按索引顺序迭代
  pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
    self.map.iter().map(|(k, v)| (k.as_ref(), v.as_ref()))
  }
}

#[inline]
fn item(kv: Option<(&Key, &Box<[u8]>)>) -> Option<Item> {
  kv.map(|(k, v)| Item {
    key: k.clone(),
    val: v.clone(),
  })
}

/// Copy-on-write index: writers clone the map only while a reader still holds the old root
/// 写时复制索引：仅当读者仍持有旧根时写者才克隆映射
#[derive(Debug, Default)]
pub struct MemIndex {
  live: Mutex<MemRoot>,
}

impl MemIndex {
  #[inline]
  pub fn new() -> Self {
    Self::default()
  }
}

impl Index for MemIndex {
  type Root = MemRoot;

  #[inline]
  fn root(&self) -> MemRoot {
    self.live.lock().clone()
  }

  fn insert(&self, key: &[u8], val: &[u8]) -> Result<()> {
    let mut live = self.live.lock();
    if live.map.contains_key(key) {
      return Err(Error::Exists);
    }
    Arc::make_mut(&mut live.map).insert(key.into(), val.into());
    live.ver += 1;
    Ok(())
  }

  fn delete(&self, key: &[u8]) -> Result<()> {
    let mut live = self.live.lock();
    if !live.map.contains_key(key) {
      return Err(Error::NotFound);
    }
    Arc::make_mut(&mut live.map).remove(key);
    live.ver += 1;
    Ok(())
  }

  #[inline]
  fn lookup(&self, root: &MemRoot, key: &[u8]) -> Result<Option<Item>> {
    Ok(item(root.map.get_key_value(key)))
  }

  #[inline]
  fn prev(&self, root: &MemRoot, key: &[u8]) -> Result<Option<Item>> {
    Ok(item(
      root
        .map
        .range::<[u8], _>((Bound::Unbounded, Bound::Included(key)))
        .next_back(),
    ))
  }

  #[inline]
  fn next(&self, root: &MemRoot, key: &[u8]) -> Result<Option<Item>> {
    Ok(item(
      root
        .map
        .range::<[u8], _>((Bound::Included(key), Bound::Unbounded))
        .next(),
    ))
  }

  #[inline]
  fn before(&self, root: &MemRoot, key: &[u8]) -> Result<Option<Item>> {
    Ok(item(
      root
        .map
        .range::<[u8], _>((Bound::Unbounded, Bound::Excluded(key)))
        .next_back(),
    ))
  }

  #[inline]
  fn after(&self, root: &MemRoot, key: &[u8]) -> Result<Option<Item>> {
    Ok(item(
      root
        .map
        .range::<[u8], _>((Bound::Excluded(key), Bound::Unbounded))
        .next(),
    ))
  }
}

impl RootSource<MemRoot> for MemIndex {
  #[inline]
  fn current_root(&self) -> Result<(MemRoot, u64)> {
    let root = self.root();
    let ver = root.ver;
    Ok((root, ver))
  }
}
