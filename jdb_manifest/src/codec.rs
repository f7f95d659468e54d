//! Manifest entry codec
//! 清单条目编解码
//!
//! Index key: level(1) + bkey
//!   - L0:  bkey = seq (u64, big endian), index order is write order
//!   - L1+: bkey = first key bytes, index order is key order
//!
//! Index value: segno(8) + seq(8) + first_len(2) + last_len(2) + keys (little endian header)
//!   - L0:  keys = first + last
//!   - L1+: keys = last (first lives in the index key)
//!
//! 索引键：level(1) + bkey
//!   - L0：bkey = seq（u64 大端），索引顺序即写入顺序
//!   - L1+：bkey = 首键字节，索引顺序即键顺序
//!
//! 索引值：segno(8) + seq(8) + first_len(2) + last_len(2) + 键（小端头）
//!   - L0：键 = 首键 + 尾键
//!   - L1+：键 = 尾键（首键位于索引键中）

use zerocopy::{
  FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
  little_endian::{U16, U64},
};

use crate::{Entry, Error, MAX_KEY_LEN, MAX_LEVEL, Result, Seq};

/// Fixed value header
/// 值的固定头
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct Head {
  segno: U64,
  seq: U64,
  first_len: U16,
  last_len: U16,
}

/// Value header size: segno(8) + seq(8) + first_len(2) + last_len(2) = 20
/// 值头大小
pub const HEAD_SIZE: usize = size_of::<Head>();

const SEQ_SIZE: usize = size_of::<u64>();

#[inline]
fn check(e: &Entry) -> Result<()> {
  if e.level > MAX_LEVEL {
    return Err(Error::Level(e.level));
  }
  for k in [&e.first, &e.last] {
    if k.len() > MAX_KEY_LEN {
      return Err(Error::KeyTooLong(k.len()));
    }
  }
  Ok(())
}

#[inline]
fn bkey_len(e: &Entry) -> usize {
  if e.level == 0 { SEQ_SIZE } else { e.first.len() }
}

/// Write level + bkey into an empty buffer
/// 将 level + bkey 写入空缓冲区
#[inline]
fn put_key(buf: &mut Vec<u8>, level: u8, seq: Seq, first: &[u8]) {
  buf.push(level);
  if level == 0 {
    buf.extend_from_slice(&seq.to_be_bytes());
  } else {
    buf.extend_from_slice(first);
  }
}

/// Encode index key only (for delete and exact lookup)
/// 仅编码索引键（用于删除与精确查找）
pub fn encode_key(e: &Entry) -> Result<Vec<u8>> {
  check(e)?;
  let mut key = Vec::new();
  key.try_reserve_exact(1 + bkey_len(e))?;
  put_key(&mut key, e.level, e.seq, &e.first);
  Ok(key)
}

/// Encode entry into index key and value
/// 将条目编码为索引键和值
pub fn encode(e: &Entry) -> Result<(Vec<u8>, Vec<u8>)> {
  let key = encode_key(e)?;

  let keys_len = if e.level == 0 {
    e.first.len() + e.last.len()
  } else {
    e.last.len()
  };
  let mut val = Vec::new();
  val.try_reserve_exact(HEAD_SIZE + keys_len)?;

  let head = Head {
    segno: U64::new(e.segno),
    seq: U64::new(e.seq),
    first_len: U16::new(e.first.len() as u16),
    last_len: U16::new(e.last.len() as u16),
  };
  val.extend_from_slice(head.as_bytes());
  if e.level == 0 {
    val.extend_from_slice(&e.first);
  }
  val.extend_from_slice(&e.last);

  Ok((key, val))
}

/// Build a search key; empty first at L1+ means the start of the level
/// 构造搜索键；L1+ 的空首键表示该层起点
pub fn search_key(level: u8, seq: Seq, first: &[u8]) -> Vec<u8> {
  let mut key = Vec::with_capacity(1 + SEQ_SIZE.max(first.len()));
  put_key(&mut key, level, seq, first);
  key
}

/// Decode and validate an index key + value
/// 解码并校验索引键与值
pub fn decode(key: &[u8], val: &[u8]) -> Result<Entry> {
  let Some((&level, bkey)) = key.split_first() else {
    return Err(Error::Corruption("empty key"));
  };
  if level > MAX_LEVEL {
    return Err(Error::Corruption("level"));
  }

  let Ok((head, keys)) = Head::ref_from_prefix(val) else {
    return Err(Error::Corruption("short value"));
  };
  let segno = head.segno.get();
  let seq = head.seq.get();
  let first_len = head.first_len.get() as usize;
  let last_len = head.last_len.get() as usize;

  let (first, last) = if level == 0 {
    if bkey != seq.to_be_bytes() {
      return Err(Error::Corruption("seq mismatch"));
    }
    if keys.len() != first_len + last_len {
      return Err(Error::Corruption("value length"));
    }
    keys.split_at(first_len)
  } else {
    if bkey.len() != first_len {
      return Err(Error::Corruption("first key length"));
    }
    if keys.len() != last_len {
      return Err(Error::Corruption("value length"));
    }
    (bkey, keys)
  };

  if first > last {
    return Err(Error::Corruption("first after last"));
  }

  Ok(Entry {
    level,
    segno,
    seq,
    first: first.into(),
    last: last.into(),
  })
}
