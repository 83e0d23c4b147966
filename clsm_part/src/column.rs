//! Column groups
//! 列组
//!
//! Columns not named by any group of a level fall into the trailing residual
//! group (index `split.len()`), so every column maps to exactly one group.
//! 未被任何列组包含的列归入末尾的剩余组（序号 `split.len()`），因此每列恰属一组。

use std::collections::{BTreeMap, BTreeSet, HashMap};

use clsm_base::{Column, Entry};

/// Precomputed column -> group map of one level
/// 单层预计算的列 -> 组映射
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
  map: HashMap<Column, u32>,
  residual: u32,
}

impl ColumnIndex {
  pub fn new(split: &[BTreeSet<Column>]) -> Self {
    let mut map = HashMap::new();
    for (idx, group) in split.iter().enumerate() {
      for col in group {
        map.insert(col.clone(), idx as u32);
      }
    }
    Self {
      map,
      residual: split.len() as u32,
    }
  }

  #[inline]
  pub fn residual(&self) -> u32 {
    self.residual
  }

  /// Groups including the residual one
  /// 含剩余组在内的组数
  #[inline]
  pub fn group_count(&self) -> u32 {
    self.residual + 1
  }

  #[inline]
  pub fn is_grouped(&self, col: &str) -> bool {
    self.map.contains_key(col)
  }

  #[inline]
  pub fn group_of(&self, col: &str) -> u32 {
    self.map.get(col).copied().unwrap_or(self.residual)
  }

  /// Grouped columns
  /// 已分组的列
  pub fn columns(&self) -> impl Iterator<Item = &Column> {
    self.map.keys()
  }

  /// Groups holding any of `requested`; all groups when `None`
  /// 包含 `requested` 中任一列的组；`None` 时返回全部组
  pub fn groups(&self, requested: Option<&[Column]>) -> Vec<u32> {
    match requested {
      None => (0..self.group_count()).collect(),
      Some(cols) => {
        let mut li: Vec<u32> = cols.iter().map(|c| self.group_of(c)).collect();
        li.sort_unstable();
        li.dedup();
        li
      }
    }
  }

  /// Split an entry into per-group partial entries of the same key
  /// 将条目拆分为同键的各组部分条目
  ///
  /// An entry without columns goes to the residual group so the key survives.
  /// 无列条目归入剩余组以保留键。
  pub fn split(&self, entry: Entry) -> Vec<(u32, Entry)> {
    if entry.value.is_empty() {
      return vec![(self.residual, entry)];
    }
    let key = entry.key;
    let mut parts: BTreeMap<u32, Entry> = BTreeMap::new();
    for (col, val) in entry.value {
      parts
        .entry(self.group_of(&col))
        .or_insert_with(|| Entry::new(key))
        .value
        .insert(col, val);
    }
    parts.into_iter().collect()
  }
}

/// Column groups at `level` holding any requested column
/// `level` 层包含任一请求列的列组
///
/// Level 0 (root) is a single group.
/// 第 0 层（根）只有一个组。
pub fn column_groups(
  requested: Option<&[Column]>,
  level: u8,
  split: &[BTreeSet<Column>],
) -> Vec<u32> {
  if level == 0 {
    return vec![0];
  }
  ColumnIndex::new(split).groups(requested)
}

/// Column groups at `level + 1` whose columns come from `group` at `level`
/// `level + 1` 层中列来自 `level` 层 `group` 的列组
///
/// `split` is the split of `level` (unused for the root), `next` the split of
/// `level + 1`. Relies on a layout accepted by `validate_layout`.
/// `split` 为 `level` 层划分（根节点不使用），`next` 为 `level + 1` 层划分。
pub fn sub_groups(
  level: u8,
  group: u32,
  split: &[BTreeSet<Column>],
  next: &[BTreeSet<Column>],
) -> Vec<u32> {
  let residual = next.len() as u32;
  if level == 0 {
    return (0..=residual).collect();
  }
  let idx = ColumnIndex::new(split);
  let mut li: Vec<u32> = next
    .iter()
    .enumerate()
    .filter(|(_, cols)| cols.iter().next().is_some_and(|c| idx.group_of(c) == group))
    .map(|(g, _)| g as u32)
    .collect();
  if group == idx.residual() {
    li.push(residual);
  }
  li
}
