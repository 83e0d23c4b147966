//! Key groups
//! 键组
//!
//! A range of `n` keys divides into `splits` pieces of `max(n / splits, 1)`
//! keys; the last piece absorbs the remainder, pieces starting past `high`
//! are empty. Level L applies this L times from the root range, so the level-L
//! groups nest exactly inside the level-(L-1) groups.
//! `n` 个键的范围划分为 `splits` 段，每段 `max(n / splits, 1)` 个键；末段吸收余数，
//! 起点超过 `high` 的段为空。第 L 层从根范围起重复 L 次，因此各层键组严格嵌套。

use std::ops::RangeInclusive;

use clsm_base::{Key, KeyRange};

use crate::{Error, Result};

#[inline]
fn width(range: &KeyRange) -> u128 {
  (range.span() / range.splits as u128).max(1)
}

#[inline]
fn check(range: &KeyRange) -> Result<()> {
  if range.is_valid() {
    Ok(())
  } else {
    Err(Error::BadRange {
      low: range.low,
      high: range.high,
      splits: range.splits,
    })
  }
}

/// Index of the piece holding `key` when `range` is divided once
/// `range` 划分一次后包含 `key` 的段序号
///
/// `key` must lie in `range`.
/// `key` 必须位于 `range` 内。
#[inline]
pub fn local_group(range: &KeyRange, key: Key) -> u32 {
  let idx = ((key - range.low) as u128 / width(range)).min(range.splits as u128 - 1);
  idx as u32
}

/// Piece `idx` of `range` divided once, `None` when empty
/// `range` 划分一次后的第 `idx` 段，空段返回 `None`
pub fn child_range(range: &KeyRange, idx: u32) -> Option<KeyRange> {
  if idx >= range.splits {
    return None;
  }
  let w = width(range);
  let high = range.high as u128;
  let lo = range.low as u128 + idx as u128 * w;
  if lo > high {
    return None;
  }
  let hi = if idx == range.splits - 1 {
    high
  } else {
    (lo + w - 1).min(high)
  };
  Some(KeyRange::new(lo as u64, hi as u64, range.splits))
}

/// Number of key groups at `level` (`splits^level`)
/// `level` 层的键组数量
pub fn group_count(range: &KeyRange, level: u8) -> Result<u64> {
  check(range)?;
  (range.splits as u64)
    .checked_pow(level as u32)
    .ok_or(Error::TooDeep {
      level,
      splits: range.splits,
    })
}

/// Global index of a child group
/// 子键组的全局序号
#[inline]
pub const fn child_group(parent_group: u64, splits: u32, local: u32) -> u64 {
  parent_group * splits as u64 + local as u64
}

/// Key group of `key` at `level`
/// `key` 在 `level` 层的键组
pub fn key_group(range: &KeyRange, level: u8, key: Key) -> Result<u64> {
  group_count(range, level)?;
  if !range.contains(key) {
    return Err(Error::KeyOutOfRange {
      key,
      low: range.low,
      high: range.high,
    });
  }

  let mut cur = *range;
  let mut group = 0;
  for _ in 0..level {
    let idx = local_group(&cur, key);
    group = child_group(group, range.splits, idx);
    // key lies in cur, so its own piece is never empty
    // key 位于 cur 内，所在段必不为空
    let Some(next) = child_range(&cur, idx) else {
      break;
    };
    cur = next;
  }
  Ok(group)
}

/// Key range of `group` at `level`, `None` when the group is empty
/// `level` 层 `group` 的键范围，空组返回 `None`
pub fn sub_range(range: &KeyRange, level: u8, group: u64) -> Result<Option<KeyRange>> {
  let count = group_count(range, level)?;
  if group >= count {
    return Ok(None);
  }

  let splits = range.splits as u64;
  let mut cur = *range;
  let mut div = count;
  for _ in 0..level {
    div /= splits;
    let idx = ((group / div) % splits) as u32;
    match child_range(&cur, idx) {
      Some(next) => cur = next,
      None => return Ok(None),
    }
  }
  Ok(Some(cur))
}

/// Key groups at `level` intersecting `[start, end]`
/// `level` 层与 `[start, end]` 相交的键组
///
/// Both ends must lie in `range`; `start > end` gives an empty range.
/// 两端须位于 `range` 内；`start > end` 返回空范围。
pub fn groups_between(
  range: &KeyRange,
  level: u8,
  start: Key,
  end: Key,
) -> Result<RangeInclusive<u64>> {
  let first = key_group(range, level, start)?;
  let last = key_group(range, level, end)?;
  if start > end {
    #[allow(clippy::reversed_empty_ranges)]
    return Ok(1..=0);
  }
  Ok(first..=last)
}
