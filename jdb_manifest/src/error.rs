//! Error types for jdb_manifest
//! jdb_manifest 错误类型定义

use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("alloc: {0}")]
  Exhaustion(#[from] TryReserveError),

  #[error("index: {0}")]
  Index(Box<dyn std::error::Error + Send + Sync>),

  #[error("IO: {0}")]
  Io(#[from] std::io::Error),

  /// Read through a stale root, retry with a fresh one
  /// 读到过期根，需用新根重试
  #[error("stale root")]
  Stale,

  /// Repeated stale reads on the same root version
  /// 同一根版本上重复读到过期数据
  #[error("hard stale on root version {0}")]
  HardStale(u64),

  #[error("not found")]
  NotFound,

  #[error("already exists")]
  Exists,

  #[error("corrupt manifest entry: {0}")]
  Corruption(&'static str),

  #[error("key too long: {0}")]
  KeyTooLong(usize),

  #[error("level out of range: {0}")]
  Level(u8),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
  /// Wrap an opaque index failure
  /// 包装不透明的索引错误
  #[inline]
  pub fn index(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
    Self::Index(e.into())
  }
}
