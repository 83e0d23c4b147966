//! Route entries of a compacting node to its children
//! 将压缩节点的条目路由到子节点

use std::collections::{BTreeMap, btree_map::Entry as Slot};

use clsm_base::{Entry, KeyRange};
use clsm_node::NodeHead;
use clsm_part::{
  ColumnIndex, ObjId, child_group, child_range, local_group, parse_object_id, sub_groups,
};

use crate::{Error, Result};

/// Entries bound for one child plus the head to create it with
/// 发往单个子节点的条目及创建它所用的头部
#[derive(Debug, Clone)]
pub(crate) struct Batch {
  pub template: NodeHead,
  pub entries: Vec<Entry>,
}

#[inline]
pub(crate) fn child_id(parent: &ObjId, splits: u32, local: u32, col_group: u32) -> ObjId {
  ObjId {
    tree: parent.tree.clone(),
    level: parent.level + 1,
    key_group: child_group(parent.key_group, splits, local),
    col_group,
  }
}

/// Head of a not yet created child, built from its parent alone
/// 尚未创建的子节点头部，仅由父节点构造
pub(crate) fn child_head(
  parent: &NodeHead,
  id: &ObjId,
  local: u32,
  padding: u64,
) -> Result<NodeHead> {
  let range = child_range(&parent.key_range, local)
    .ok_or_else(|| Error::Layout(format!("{} has no key piece {local}", parent.object_id)))?;
  let mut head = NodeHead::new(
    id.to_string(),
    parent.pool.as_str(),
    id.level,
    range,
    parent.capacity,
    parent.bloomfilter_store.bits(),
  );
  head.max_level = parent.max_level;
  let mut below = parent.deeper_splits.iter().cloned();
  head.column_group_splits = below.next().unwrap_or_default();
  head.deeper_splits = below.collect();
  head.reserve(padding);
  Ok(head)
}

/// Split entries by child key piece and column group
/// 按子键段与列组拆分条目
///
/// Entry order is kept inside each batch, so later versions stay later.
/// 每个批次内保持条目顺序，较新版本仍在后。
pub(crate) fn partition(
  parent: &NodeHead,
  entries: Vec<Entry>,
  padding: u64,
) -> Result<BTreeMap<String, Batch>> {
  let obj = parse_object_id(&parent.object_id)?;
  let range = parent.key_range;
  let cols = ColumnIndex::new(&parent.column_group_splits);
  let mut out: BTreeMap<String, Batch> = BTreeMap::new();

  for entry in entries {
    let key = entry.key;
    if !range.contains(key) {
      return Err(Error::KeyOutOfRange {
        key,
        low: range.low,
        high: range.high,
      });
    }
    let local = local_group(&range, key);
    for (col_group, part) in cols.split(entry) {
      let id = child_id(&obj, range.splits, local, col_group);
      match out.entry(id.to_string()) {
        Slot::Occupied(mut slot) => slot.get_mut().entries.push(part),
        Slot::Vacant(slot) => {
          slot.insert(Batch {
            template: child_head(parent, &id, local, padding)?,
            entries: vec![part],
          });
        }
      }
    }
  }
  Ok(out)
}

/// Non-empty child pieces × column groups below `obj`, whose key range is `range`
/// `obj`（键范围 `range`）之下的非空子键段 × 列组
///
/// Column splits come from the root head, which holds every level's split.
/// 列划分取自根节点头部，其中保存各层划分。
pub(crate) fn children(root: &NodeHead, obj: &ObjId, range: &KeyRange) -> Vec<ObjId> {
  if obj.level >= root.max_level {
    return Vec::new();
  }
  let groups = sub_groups(
    obj.level,
    obj.col_group,
    root.split_below(obj.level),
    root.split_below(obj.level + 1),
  );
  let mut li = Vec::new();
  for local in 0..range.splits {
    if child_range(range, local).is_none() {
      continue;
    }
    for &col_group in &groups {
      li.push(child_id(obj, range.splits, local, col_group));
    }
  }
  li
}
