//! Column layout validation
//! 列布局校验

use std::collections::{BTreeSet, HashSet};

use clsm_base::ColumnGroupSplit;

use crate::{ColumnIndex, Error, Result};

/// Check the column splits of levels 1..
/// 校验第 1 层起各层列划分
///
/// - groups of a level are non-empty and pairwise disjoint
/// - a column grouped at level L is grouped at L+1
/// - a group at L+1 takes columns from one group of L (or only from the residual)
///
/// The last two keep sibling subtrees disjoint: every child object has one parent.
/// 后两条保证兄弟子树不相交：每个子对象只有一个父对象。
pub fn validate_layout(layout: &[ColumnGroupSplit]) -> Result<()> {
  for (i, split) in layout.iter().enumerate() {
    let level = i + 1;
    let mut seen = HashSet::new();
    for (g, group) in split.iter().enumerate() {
      if group.is_empty() {
        return Err(Error::Layout(format!("level {level}: group {g} is empty")));
      }
      for col in group {
        if !seen.insert(col) {
          return Err(Error::Layout(format!(
            "level {level}: column {col:?} in more than one group"
          )));
        }
      }
    }

    if i == 0 {
      continue;
    }
    let prev = ColumnIndex::new(&layout[i - 1]);
    for col in prev.columns() {
      if !seen.contains(col) {
        return Err(Error::Layout(format!(
          "column {col:?} grouped at level {} but not at level {level}",
          level - 1
        )));
      }
    }
    for (g, group) in split.iter().enumerate() {
      let parents: BTreeSet<u32> = group.iter().map(|c| prev.group_of(c)).collect();
      if parents.len() > 1 {
        return Err(Error::Layout(format!(
          "level {level}: group {g} spans groups {parents:?} of level {}",
          level - 1
        )));
      }
    }
  }
  Ok(())
}
