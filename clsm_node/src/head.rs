//! Node head
//! 节点头

use std::collections::BTreeSet;

use bitcode::{Decode, Encode};
use clsm_base::{Column, ColumnGroupSplit, Entry, KeyRange};
use clsm_bloom::Bloom;

use crate::{Error, Result, encode_head};

/// Per-node metadata stored at the start of the node object
/// 存于节点对象起始处的节点元数据
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct NodeHead {
  pub object_id: String,
  pub pool: String,
  pub level: u8,
  /// Deepest level of the tree; nodes there never compact
  /// 树的最深层；该层节点不再压缩
  pub max_level: u8,
  /// Own key range; `splits` is the fan-out to children
  /// 自身键范围；`splits` 为子节点扇出
  pub key_range: KeyRange,
  pub capacity: u64,
  pub size: u64,
  pub entry_start_offset: u64,
  pub entry_end_offset: u64,
  /// Column split of the children
  /// 子节点的列划分
  pub column_group_splits: ColumnGroupSplit,
  /// Splits of the levels below the children
  /// 子节点以下各层的列划分
  pub deeper_splits: Vec<ColumnGroupSplit>,
  pub bloomfilter_store: Bloom,
  /// Root only: every key ever written, never cleared
  /// 仅根节点：曾写入的所有键，永不清空
  pub bloomfilter_store_ever: Option<Bloom>,
}

impl NodeHead {
  /// Empty head; offsets are set by [`NodeHead::reserve`]
  /// 空头部；偏移由 [`NodeHead::reserve`] 设置
  pub fn new(
    object_id: impl Into<String>,
    pool: impl Into<String>,
    level: u8,
    key_range: KeyRange,
    capacity: u64,
    bloom_bits: u32,
  ) -> Self {
    Self {
      object_id: object_id.into(),
      pool: pool.into(),
      level,
      max_level: level,
      key_range,
      capacity,
      size: 0,
      entry_start_offset: 0,
      entry_end_offset: 0,
      column_group_splits: Vec::new(),
      deeper_splits: Vec::new(),
      bloomfilter_store: Bloom::new(bloom_bits),
      bloomfilter_store_ever: None,
    }
  }

  /// Encoded length of this head once every counter and filter is at its widest
  /// 所有计数器与过滤器取最宽形态时本头部的编码长度
  pub fn worst_case_len(&self) -> u64 {
    let mut worst = self.clone();
    worst.size = u64::MAX;
    worst.capacity = u64::MAX;
    worst.entry_start_offset = u64::MAX;
    worst.entry_end_offset = u64::MAX;
    worst.bloomfilter_store.saturate();
    if let Some(ever) = worst.bloomfilter_store_ever.as_mut() {
      ever.saturate();
    }
    encode_head(&worst).len() as u64
  }

  /// Place an empty entry region after the worst-case head plus `padding`
  /// 在最坏头部长度加 `padding` 之后放置空条目区
  pub fn reserve(&mut self, padding: u64) {
    let start = self.worst_case_len() + padding;
    self.entry_start_offset = start;
    self.entry_end_offset = start;
    self.size = 0;
  }

  /// Encode, failing when the frame would reach into the entry region
  /// 编码；帧将侵入条目区时失败
  pub fn encode(&self) -> Result<Vec<u8>> {
    let buf = encode_head(self);
    let need = buf.len() as u64;
    if need > self.entry_start_offset {
      return Err(Error::HeadOverflow {
        need,
        have: self.entry_start_offset,
      });
    }
    Ok(buf)
  }

  #[inline]
  pub fn is_bottom(&self) -> bool {
    self.level >= self.max_level
  }

  /// Whether `n` more entries exceed capacity
  /// 再加 `n` 个条目是否超出容量
  #[inline]
  pub fn overflows(&self, n: usize) -> bool {
    self.size.saturating_add(n as u64) > self.capacity
  }

  /// Bytes of the entry region
  /// 条目区字节数
  #[inline]
  pub fn entry_len(&self) -> u64 {
    self.entry_end_offset - self.entry_start_offset
  }

  /// Column split of the level `depth` below this node (1 = children)
  /// 本节点以下第 `depth` 层的列划分（1 为子节点）
  pub fn split_below(&self, depth: u8) -> &[BTreeSet<Column>] {
    match depth {
      0 => &[],
      1 => &self.column_group_splits,
      d => self
        .deeper_splits
        .get(d as usize - 2)
        .map_or(&[][..], Vec::as_slice),
    }
  }

  /// Add keys to the ever filter only
  /// 仅将键加入"曾写入"过滤器
  pub fn remember(&mut self, entries: &[Entry]) {
    if let Some(ever) = self.bloomfilter_store_ever.as_mut() {
      for entry in entries {
        ever.insert_key(entry.key);
      }
    }
  }

  /// Account appended entries: counters, offsets, filters
  /// 记录追加的条目
  pub fn record(&mut self, entries: &[Entry], bytes: u64) {
    for entry in entries {
      self.bloomfilter_store.insert_key(entry.key);
    }
    self.remember(entries);
    self.size += entries.len() as u64;
    self.entry_end_offset += bytes;
  }

  /// Drop all entries; the ever filter is kept
  /// 清空所有条目；保留"曾写入"过滤器
  pub fn drain(&mut self) {
    self.size = 0;
    self.entry_end_offset = self.entry_start_offset;
    self.bloomfilter_store.clear();
  }

  /// Bloom check on the node filter
  /// 节点过滤器布隆检查
  #[inline]
  pub fn may_contain(&self, key: u64) -> bool {
    self.bloomfilter_store.contains_key(key)
  }
}
