//! Read path: walk levels from the root, gather column groups
//! 读取路径：自根节点逐层查找，收集各列组

use std::collections::{BTreeMap, BTreeSet, btree_map::Entry as Slot};

use clsm_base::{Column, Entry, Key, Store};
use clsm_node::NodeHead;
use clsm_part::{
  ObjId, column_groups, groups_between, key_group, parse_object_id, sub_groups, sub_range,
};
use futures::future::join_all;

use crate::{
  Error, Lsm, Result,
  node::{find, project},
  partition::children,
};

#[inline]
fn merge_into(rows: &mut BTreeMap<Key, Entry>, entry: Entry) {
  match rows.entry(entry.key) {
    Slot::Occupied(mut slot) => slot.get_mut().merge(entry),
    Slot::Vacant(slot) => {
      slot.insert(entry);
    }
  }
}

impl<S: Store> Lsm<S> {
  /// Current row of `key`
  /// `key` 的当前行
  ///
  /// Walks levels from the root through every column group object that
  /// exists, since a group may hold older columns of the key further down.
  /// Parts are folded oldest first, so fresher columns overwrite older ones
  /// exactly as inside one node.
  /// 自根节点逐层遍历所有存在的列组对象，因为更深层可能保存该键较旧的列。
  /// 各部分从最旧开始合并，较新的列覆盖较旧的列，与单节点内一致。
  pub async fn read(
    &self,
    tree: &str,
    key: Key,
    columns: Option<&[Column]>,
  ) -> Result<Option<Entry>> {
    let root = self.root(tree).await?;
    let range = root.key_range;
    if !range.contains(key) {
      return Err(Error::KeyOutOfRange {
        key,
        low: range.low,
        high: range.high,
      });
    }
    if root
      .bloomfilter_store_ever
      .as_ref()
      .is_some_and(|ever| !ever.contains_key(key))
    {
      return Ok(None);
    }

    // freshest first
    // 最新的在前
    let mut parts = Vec::new();
    if root.may_contain(key)
      && let Some(entry) = find(self.read_entries(&root).await?, key)
    {
      parts.push(entry);
    }

    let mut groups = column_groups(columns, 1, root.split_below(1));
    for level in 1..=root.max_level {
      if groups.is_empty() {
        break;
      }
      let key_group = key_group(&range, level, key)?;
      let oids: Vec<(u32, String)> = groups
        .iter()
        .map(|&col_group| {
          let id = ObjId {
            tree: tree.into(),
            level,
            key_group,
            col_group,
          };
          (col_group, id.to_string())
        })
        .collect();
      let live = self.gather_key(&oids, key, &mut parts).await?;
      if level == root.max_level {
        break;
      }

      let split = root.split_below(level);
      let next = root.split_below(level + 1);
      let wanted = column_groups(columns, level + 1, next);
      groups = live
        .into_iter()
        .flat_map(|g| sub_groups(level, g, split, next))
        .filter(|g| wanted.contains(g))
        .collect();
      groups.sort_unstable();
      groups.dedup();
    }

    let row = parts.into_iter().rev().reduce(|mut row, part| {
      row.merge(part);
      row
    });
    Ok(row.and_then(|row| project(row, columns)))
  }

  /// Read `key` from every object of one level whose bloom filter hits and
  /// push the union of the parts; returns the groups whose object exists
  /// 从同一层布隆过滤器命中的每个对象读取 `key` 并压入各部分之并；返回对象存在的组
  ///
  /// A missing object has no descendants (children are created by their parent).
  /// 缺失的对象没有后代（子节点由父节点创建）。
  async fn gather_key(
    &self,
    oids: &[(u32, String)],
    key: Key,
    parts: &mut Vec<Entry>,
  ) -> Result<Vec<u32>> {
    let mut live = Vec::new();
    let mut hits = Vec::new();
    let heads = join_all(oids.iter().map(|(_, oid)| self.try_head(oid))).await;
    for ((group, _), head) in oids.iter().zip(heads) {
      if let Some(head) = head? {
        live.push(*group);
        if head.may_contain(key) {
          hits.push(head);
        }
      }
    }

    // groups of one level hold disjoint columns
    // 同层各组的列互不相交
    let mut level_row: Option<Entry> = None;
    for entries in join_all(hits.iter().map(|head| self.read_entries(head))).await {
      let Some(part) = find(entries?, key) else {
        continue;
      };
      match level_row.as_mut() {
        Some(row) => row.merge(part),
        None => level_row = Some(part),
      }
    }
    parts.extend(level_row);
    Ok(live)
  }

  /// Rows with keys in `[start, end]`, level by level from the root
  /// 键位于 `[start, end]` 的行，自根节点逐层返回
  ///
  /// Rows of one level are unioned across column groups and sorted by key;
  /// levels are concatenated without deduplication.
  /// 同层各列组的部分行按键合并并排序；各层直接拼接，不去重。
  pub async fn scan(
    &self,
    tree: &str,
    start: Key,
    end: Key,
    columns: Option<&[Column]>,
  ) -> Result<Vec<Entry>> {
    let root = self.root(tree).await?;
    let lo = start.max(root.key_range.low);
    let hi = end.min(root.key_range.high);
    let mut out = Vec::new();
    if lo > hi {
      return Ok(out);
    }

    let mut nodes: Vec<(ObjId, NodeHead)> = vec![(ObjId::root(tree)?, root.clone())];
    let mut level = 0u8;
    loop {
      let mut rows = BTreeMap::new();
      for entries in join_all(nodes.iter().map(|(_, head)| self.read_entries(head))).await {
        // versions of a key inside one node fold in append order
        // 单节点内同键各版本按追加顺序合并
        let mut latest = BTreeMap::new();
        for entry in entries? {
          if (lo..=hi).contains(&entry.key) {
            merge_into(&mut latest, entry);
          }
        }
        for entry in latest.into_values() {
          if let Some(entry) = project(entry, columns) {
            merge_into(&mut rows, entry);
          }
        }
      }
      out.extend(rows.into_values());

      if level >= root.max_level || nodes.is_empty() {
        break;
      }
      level += 1;
      let wanted: BTreeSet<u32> = column_groups(columns, level, root.split_below(level))
        .into_iter()
        .collect();
      let key_groups = groups_between(&root.key_range, level, lo, hi)?;
      let mut ids = BTreeSet::new();
      for (obj, head) in &nodes {
        for id in children(&root, obj, &head.key_range) {
          if key_groups.contains(&id.key_group) && wanted.contains(&id.col_group) {
            ids.insert(id);
          }
        }
      }
      let oids: Vec<String> = ids.iter().map(ToString::to_string).collect();
      let heads = join_all(oids.iter().map(|oid| self.try_head(oid))).await;
      nodes = Vec::with_capacity(ids.len());
      // children are created lazily, a missing one holds nothing
      // 子节点惰性创建，缺失即为空
      for (id, head) in ids.into_iter().zip(heads) {
        if let Some(head) = head? {
          nodes.push((id, head));
        }
      }
    }
    Ok(out)
  }

  /// Every object one level below `oid`, whether created yet or not
  /// `oid` 下一层的所有对象（无论是否已创建）
  pub async fn child_object_ids(&self, oid: &str) -> Result<Vec<String>> {
    let obj = parse_object_id(oid)?;
    let root = self.root(&obj.tree).await?;
    let Some(range) = sub_range(&root.key_range, obj.level, obj.key_group)? else {
      return Ok(Vec::new());
    };
    Ok(
      children(&root, &obj, &range)
        .iter()
        .map(ToString::to_string)
        .collect(),
    )
  }
}
