//! Key range of a node
//! 节点键范围

use bitcode::{Decode, Encode};

use crate::Key;

/// Inclusive key range `[low, high]` and the fan-out used to divide it
/// 闭区间键范围 `[low, high]` 及其划分扇出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub struct KeyRange {
  pub low: Key,
  pub high: Key,
  pub splits: u32,
}

impl KeyRange {
  #[inline]
  pub const fn new(low: Key, high: Key, splits: u32) -> Self {
    Self { low, high, splits }
  }

  /// `low <= high` and `splits >= 1`
  #[inline]
  pub const fn is_valid(&self) -> bool {
    self.low <= self.high && self.splits >= 1
  }

  #[inline]
  pub const fn contains(&self, key: Key) -> bool {
    key >= self.low && key <= self.high
  }

  /// Number of keys covered (u128, `[0, u64::MAX]` has 2^64 keys)
  /// 覆盖的键数量
  #[inline]
  pub const fn span(&self) -> u128 {
    (self.high - self.low) as u128 + 1
  }
}
