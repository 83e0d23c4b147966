//! Single node operations
//! 单节点操作

use clsm_base::{Column, Entry, Key, Store};
use clsm_node::{NodeHead, decode_all_entries, encode_entries};
use clsm_part::{ObjId, parse_object_id};
use log::debug;

use crate::{Error, Lsm, Result, error::NodeCtx};

/// Keep requested columns; `None` when a filter leaves nothing
/// 保留请求的列；过滤后为空时返回 `None`
pub(crate) fn project(entry: Entry, columns: Option<&[Column]>) -> Option<Entry> {
  match columns {
    None => Some(entry),
    Some(cols) => {
      let entry = entry.project(cols);
      (entry.width() > 0).then_some(entry)
    }
  }
}

/// Fold every occurrence of `key` in order: later columns overwrite earlier ones
/// 按顺序合并 `key` 的所有出现：后写的列覆盖先写的列
pub(crate) fn find(entries: Vec<Entry>, key: Key) -> Option<Entry> {
  entries
    .into_iter()
    .filter(|e| e.key == key)
    .reduce(|mut row, e| {
      row.merge(e);
      row
    })
}

impl<S: Store> Lsm<S> {
  /// Write rows into a tree through its root
  /// 经根节点向树写入行
  pub async fn write(&self, tree: &str, entries: Vec<Entry>) -> Result<()> {
    let root = self.root(tree).await?;
    let range = root.key_range;
    if let Some(e) = entries.iter().find(|e| !range.contains(e.key)) {
      return Err(Error::KeyOutOfRange {
        key: e.key,
        low: range.low,
        high: range.high,
      });
    }
    self.append_head(root, entries).await
  }

  /// Append entries, compacting the node first when they do not fit
  /// 追加条目；放不下时先压缩节点
  ///
  /// Keys appended below the root are added to the root ever filter first, so
  /// `read` can still reach them.
  /// 追加到根节点以下的键先加入根节点"曾写入"过滤器，使 `read` 仍可找到。
  pub async fn append(&self, oid: &str, entries: Vec<Entry>) -> Result<()> {
    let head = self.head(oid).await?;
    if head.level > 0 && !entries.is_empty() {
      self.remember_in_root(oid, &entries).await?;
    }
    self.append_head(head, entries).await
  }

  async fn remember_in_root(&self, oid: &str, entries: &[Entry]) -> Result<()> {
    let obj = parse_object_id(oid)?;
    let Some(mut root) = self.try_head(&ObjId::root(obj.tree)?.to_string()).await? else {
      return Ok(());
    };
    root.remember(entries);
    self.save_head(&root).await
  }

  pub(crate) async fn append_head(&self, head: NodeHead, entries: Vec<Entry>) -> Result<()> {
    if entries.is_empty() {
      return Ok(());
    }
    if !head.overflows(entries.len()) {
      return self.commit(head, entries).await.map(drop);
    }
    if head.is_bottom() {
      return Err(Error::LevelFull(head.object_id));
    }
    debug!(
      "{} size {} + {} > {}, compact",
      head.object_id,
      head.size,
      entries.len(),
      head.capacity
    );
    self.compact_with(head, entries).await
  }

  /// Sort the batch, write entry bytes, then the head
  /// 排序批次，先写条目字节，再写头部
  pub(crate) async fn commit(&self, mut head: NodeHead, mut entries: Vec<Entry>) -> Result<NodeHead> {
    if head.overflows(entries.len()) {
      return Err(Error::CapacityExceeded(head.object_id));
    }
    entries.sort_by_key(|e| e.key);
    let buf = encode_entries(&entries);
    let len = buf.len() as u64;

    // entry bytes durable before the head points at them
    // 条目字节先持久化，头部再指向它们
    self
      .store
      .write_at(&head.object_id, head.entry_end_offset, buf)
      .await?;
    head.record(&entries, len);
    self.save_head(&head).await?;
    debug!("{} +{} size {}", head.object_id, entries.len(), head.size);
    Ok(head)
  }

  /// Entries of a node ordered by key
  /// 按键排序的节点条目
  pub async fn read_all(&self, oid: &str) -> Result<Vec<Entry>> {
    let head = self.head(oid).await?;
    self.read_entries(&head).await
  }

  pub async fn read_by_key(
    &self,
    oid: &str,
    key: Key,
    columns: Option<&[Column]>,
  ) -> Result<Option<Entry>> {
    let head = self.head(oid).await?;
    Ok(find(self.read_entries(&head).await?, key).and_then(|e| project(e, columns)))
  }

  pub(crate) async fn read_entries(&self, head: &NodeHead) -> Result<Vec<Entry>> {
    let len = head.entry_len();
    if len == 0 {
      return Ok(Vec::new());
    }
    let buf = self
      .store
      .get(&head.object_id, head.entry_start_offset, len)
      .await?;
    let mut entries = decode_all_entries(&buf).ctx(&head.object_id)?;
    // stable: versions of one key keep their append order
    // 稳定排序：同键各版本保持追加顺序
    entries.sort_by_key(|e| e.key);
    Ok(entries)
  }
}
