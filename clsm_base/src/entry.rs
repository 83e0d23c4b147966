//! Row stored in a node
//! 节点中存储的行

use std::collections::BTreeMap;

use bitcode::{Decode, Encode};

use crate::{Column, Key};

/// Key plus a map of column name to value bytes
/// 键及列名到值字节的映射
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct Entry {
  pub key: Key,
  pub value: BTreeMap<Column, Vec<u8>>,
}

impl Entry {
  #[inline]
  pub fn new(key: Key) -> Self {
    Self {
      key,
      value: BTreeMap::new(),
    }
  }

  /// Builder: add one column
  /// 构建：添加一列
  #[inline]
  pub fn col(mut self, name: impl Into<Column>, val: impl Into<Vec<u8>>) -> Self {
    self.value.insert(name.into(), val.into());
    self
  }

  /// Keep only the given columns
  /// 仅保留指定列
  pub fn project(mut self, columns: &[Column]) -> Self {
    self.value.retain(|name, _| columns.contains(name));
    self
  }

  /// Union another partial entry of the same key into this one
  /// 合并同一键的另一部分列
  ///
  /// Columns of `other` overwrite columns already present.
  /// `other` 的列覆盖已有列。
  pub fn merge(&mut self, other: Entry) {
    debug_assert_eq!(self.key, other.key);
    self.value.extend(other.value);
  }

  /// Number of (key, column, value) triples
  /// (键, 列, 值) 三元组数量
  #[inline]
  pub fn width(&self) -> usize {
    self.value.len()
  }
}
