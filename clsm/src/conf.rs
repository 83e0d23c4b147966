//! Engine and tree configuration
//! 引擎与树配置

use std::collections::BTreeSet;

use clsm_base::{Column, ColumnGroupSplit, KeyRange};
use clsm_node::FRAME_SIZE;
use clsm_part::{check_tree, group_count, validate_layout};

use crate::{Error, Result};

/// Default configuration values
/// 默认配置值
pub mod default {
  pub const PADDING: u64 = 4096;
  pub const HEAD_PREFIX: u64 = 16384;
  pub const BLOOM_BITS: u32 = clsm_bloom::NODE_BITS;
  pub const EVER_BITS: u32 = clsm_bloom::EVER_BITS;
  pub const RETRY: u8 = 2;
  pub const MAX_LEVEL: u8 = 7;
}

/// Engine configuration
/// 引擎配置
#[derive(Debug, Clone, Copy)]
pub enum Conf {
  /// Bytes between the worst-case head and the entry region
  /// 最坏头部与条目区之间的字节数
  Padding(u64),
  /// First read size when loading a head
  /// 加载头部时首次读取的大小
  HeadPrefix(u64),
  /// Bits of a node bloom filter
  /// 节点布隆过滤器位数
  BloomBits(u32),
  /// Bits of the root "ever written" filter
  /// 根节点"曾写入"过滤器位数
  EverBits(u32),
  /// Extra dispatch rounds for transiently failed children
  /// 暂时失败子节点的额外分发轮数
  Retry(u8),
}

/// Parsed configuration
/// 解析后的配置
#[derive(Debug, Clone, Copy)]
pub struct ParsedConf {
  pub padding: u64,
  pub head_prefix: u64,
  pub bloom_bits: u32,
  pub ever_bits: u32,
  pub retry: u8,
}

impl Default for ParsedConf {
  fn default() -> Self {
    Self {
      padding: default::PADDING,
      head_prefix: default::HEAD_PREFIX,
      bloom_bits: default::BLOOM_BITS,
      ever_bits: default::EVER_BITS,
      retry: default::RETRY,
    }
  }
}

impl ParsedConf {
  pub fn new(conf: &[Conf]) -> Self {
    let mut c = Self::default();
    for item in conf {
      match *item {
        Conf::Padding(v) => c.padding = v,
        Conf::HeadPrefix(v) => c.head_prefix = v.max(FRAME_SIZE as u64),
        Conf::BloomBits(v) => c.bloom_bits = v.max(64),
        Conf::EverBits(v) => c.ever_bits = v.max(64),
        Conf::Retry(v) => c.retry = v,
      }
    }
    c
  }
}

/// Shape of one tree, persisted in its root head
/// 单棵树的形态，持久化于根节点头部
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConf {
  pub tree: String,
  pub pool: String,
  pub key_range: KeyRange,
  pub capacity: u64,
  pub max_level: u8,
  /// `layout[i]` is the column split of level `i + 1`; missing levels repeat the last one
  /// `layout[i]` 为第 `i + 1` 层列划分；缺失的层沿用最后一层
  pub layout: Vec<ColumnGroupSplit>,
}

impl TreeConf {
  pub fn new(tree: impl Into<String>, key_range: KeyRange, capacity: u64) -> Self {
    Self {
      tree: tree.into(),
      pool: String::new(),
      key_range,
      capacity,
      max_level: default::MAX_LEVEL,
      layout: Vec::new(),
    }
  }

  pub fn pool(mut self, pool: impl Into<String>) -> Self {
    self.pool = pool.into();
    self
  }

  pub fn max_level(mut self, max_level: u8) -> Self {
    self.max_level = max_level;
    self
  }

  /// Append the column split of the next level
  /// 追加下一层的列划分
  pub fn split<G, C>(mut self, groups: impl IntoIterator<Item = G>) -> Self
  where
    G: IntoIterator<Item = C>,
    C: Into<Column>,
  {
    self.layout.push(
      groups
        .into_iter()
        .map(|g| g.into_iter().map(Into::into).collect::<BTreeSet<_>>())
        .collect(),
    );
    self
  }

  /// One split per level 1..=max_level
  /// 第 1..=max_level 层各一个划分
  pub fn levels(&self) -> Vec<ColumnGroupSplit> {
    (0..self.max_level as usize)
      .map(|i| {
        self
          .layout
          .get(i)
          .or(self.layout.last())
          .cloned()
          .unwrap_or_default()
      })
      .collect()
  }

  pub fn validate(&self) -> Result<()> {
    check_tree(&self.tree)?;
    if self.capacity == 0 {
      return Err(Error::Layout("capacity must be at least 1".into()));
    }
    if self.layout.len() > self.max_level as usize {
      return Err(Error::Layout(format!(
        "{} column splits for {} levels",
        self.layout.len(),
        self.max_level
      )));
    }
    group_count(&self.key_range, self.max_level)?;
    validate_layout(&self.levels())?;
    Ok(())
  }
}
