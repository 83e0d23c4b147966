//! Engine handle and head I/O
//! 引擎句柄与头部读写

use clsm_base::Store;
use clsm_node::{NodeHead, decode_head, head_frame_len};
use clsm_part::ObjId;
use log::info;

use crate::{
  Conf, Error, ParsedConf, Result, TreeConf,
  error::NodeCtx,
};

/// LSM engine over a host object store
/// 基于宿主对象存储的 LSM 引擎
///
/// Holds no per-tree state: everything a tree needs is in its node heads.
/// 不保存树状态：树所需的一切都在节点头部。
pub struct Lsm<S> {
  pub(crate) store: S,
  pub(crate) conf: ParsedConf,
}

impl<S: Store> Lsm<S> {
  pub fn new(store: S, conf: &[Conf]) -> Self {
    Self {
      store,
      conf: ParsedConf::new(conf),
    }
  }

  #[inline]
  pub fn store(&self) -> &S {
    &self.store
  }

  #[inline]
  pub fn conf(&self) -> &ParsedConf {
    &self.conf
  }

  /// Create a tree: write its root node
  /// 创建树：写入根节点
  pub async fn create(&self, tree: &TreeConf) -> Result<NodeHead> {
    tree.validate()?;
    let oid = ObjId::root(tree.tree.as_str())?.to_string();
    let mut levels = tree.levels().into_iter();

    let mut head = NodeHead::new(
      oid,
      tree.pool.as_str(),
      0,
      tree.key_range,
      tree.capacity,
      self.conf.bloom_bits,
    );
    head.max_level = tree.max_level;
    head.column_group_splits = levels.next().unwrap_or_default();
    head.deeper_splits = levels.collect();
    head.bloomfilter_store_ever = Some(clsm_bloom::Bloom::new(self.conf.ever_bits));

    let head = self.init(head).await?;
    info!(
      "create tree {} [{}, {}] / {} max level {}",
      tree.tree, tree.key_range.low, tree.key_range.high, tree.key_range.splits, tree.max_level
    );
    Ok(head)
  }

  /// Root head of a tree
  /// 树的根节点头部
  pub async fn root(&self, tree: &str) -> Result<NodeHead> {
    self.head(&ObjId::root(tree)?.to_string()).await
  }

  /// Write a fresh node; entry region starts after the reserved head
  /// 写入新节点；条目区位于预留头部之后
  pub async fn init(&self, mut head: NodeHead) -> Result<NodeHead> {
    let oid = head.object_id.clone();
    if self.try_head(&oid).await?.is_some() {
      return Err(Error::AlreadyInitialized(oid));
    }
    head.reserve(self.conf.padding);
    let buf = head.encode().ctx(&oid)?;
    self.store.put_full(&oid, buf).await?;
    Ok(head)
  }

  pub async fn head(&self, oid: &str) -> Result<NodeHead> {
    self
      .try_head(oid)
      .await?
      .ok_or_else(|| Error::Uninitialized(oid.into()))
  }

  /// `None` when the object holds no head
  /// 对象无头部时返回 `None`
  pub(crate) async fn try_head(&self, oid: &str) -> Result<Option<NodeHead>> {
    let mut buf = self.store.get(oid, 0, self.conf.head_prefix).await?;
    if buf.is_empty() {
      return Ok(None);
    }
    let total = head_frame_len(&buf).ctx(oid)?;
    let have = buf.len() as u64;
    if total > have {
      let rest = self.store.get(oid, have, total - have).await?;
      buf.extend_from_slice(&rest);
    }
    decode_head(&buf).ctx(oid).map(Some)
  }

  /// Rewrite the head in place, entries untouched
  /// 原地重写头部，不动条目
  pub(crate) async fn save_head(&self, head: &NodeHead) -> Result<()> {
    let buf = head.encode().ctx(&head.object_id)?;
    self.store.write_at(&head.object_id, 0, buf).await?;
    Ok(())
  }
}
