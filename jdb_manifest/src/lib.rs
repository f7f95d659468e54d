#![cfg_attr(docsrs, feature(doc_cfg))]

//! Leveled segment manifest
//! 分层段清单
//!
//! Records which key range every immutable segment covers, at which level, and how
//! recent it is. Answers "which segments to read for a key range" and "what to
//! compact next".
//! 记录每个不可变段覆盖的键范围、所在层级及新旧程度。
//! 回答"读取某键范围需要哪些段"以及"下一步压缩什么"。

pub mod cache;
pub mod codec;
mod compact;
pub mod conf;
mod counter;
mod entry;
pub mod error;
mod hint;
pub mod index;
mod level;
mod manifest;
pub mod mem;
mod read;
mod search;
pub mod seg;
mod seg_ref;

pub use cache::ItemCache;
pub use compact::{CompactSink, Compaction};
pub use conf::{Conf, FANOUT, MAX_KEY_LEN, MAX_LEVEL, ParsedConf};
pub use counter::{Counters, Triggers};
pub use entry::{Entry, max_key, successor};
pub use error::{Error, Result};
pub use index::{Index, Item, RootSource};
pub use manifest::{Manifest, Persist, Writer};
pub use mem::MemIndex;
pub use read::Span;
pub use seg::{Flag, SegItem, SegStore, Segment};

/// Owned key
/// 自有键
pub type Key = Box<[u8]>;

/// Segment number
/// 段号
pub type Segno = u64;

/// Write sequence
/// 写入序号
pub type Seq = u64;

/// Key value pair handed to the item cache
/// 交给条目缓存的键值对
pub type Kv = (Key, Box<[u8]>);
