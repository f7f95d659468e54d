//! Manifest configuration
//! 清单配置

/// Max level number
/// 最大层级号
pub const MAX_LEVEL: u8 = 20;

/// Number of levels (0..=MAX_LEVEL)
/// 层数
pub const LEVELS: usize = MAX_LEVEL as usize + 1;

/// Default fanout between levels
/// 默认层间扇出
pub const FANOUT: u64 = 10;

/// Longest key the entry format accepts
/// 条目格式接受的最长键
pub const MAX_KEY_LEN: usize = 1024;

/// Manifest configuration
/// 清单配置
#[derive(Debug, Clone, Copy)]
pub enum Conf {
  /// Segments of level L+1 per segment of level L
  /// 每个 L 层段对应的 L+1 层段数
  Fanout(u64),
}

/// Parsed configuration
/// 解析后的配置
#[derive(Debug, Clone, Copy)]
pub struct ParsedConf {
  pub fanout: u64,
}

impl Default for ParsedConf {
  fn default() -> Self {
    Self { fanout: FANOUT }
  }
}

impl ParsedConf {
  pub fn new(conf: &[Conf]) -> Self {
    let mut c = Self::default();
    for item in conf {
      match *item {
        Conf::Fanout(v) => c.fanout = v.max(2),
      }
    }
    c
  }

  /// Segment count limit per level: 0, fanout, fanout^2 ...
  /// 每层段数上限：0, fanout, fanout^2 ...
  pub fn limits(&self) -> [u64; LEVELS] {
    let mut li = [0u64; LEVELS];
    li[1] = self.fanout;
    for i in 2..LEVELS {
      li[i] = li[i - 1].saturating_mul(self.fanout);
    }
    li
  }
}
