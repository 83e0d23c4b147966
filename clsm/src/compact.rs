//! Compaction coordinator
//! 压缩协调器
//!
//! ```text
//! Start -> ReadSource -> Partition -> DispatchChildren -> AwaitAcks -> ClearSource -> Done
//!                                           ^                 |
//!                                           +-- transient ----+
//! ```
//!
//! The source node is cleared only after every child acknowledged; on failure
//! it keeps its entries and the caller sees `PartialCompaction`.
//! 所有子节点确认后才清空源节点；失败时源节点保留条目，调用方得到 `PartialCompaction`。

use std::collections::BTreeMap;

use clsm_base::{Entry, Store};
use clsm_node::NodeHead;
use futures::{
  FutureExt,
  future::{LocalBoxFuture, join_all},
};
use log::{debug, info, warn};

use crate::{
  Error, Failed, Lsm, Result,
  error::NodeCtx,
  partition::{Batch, partition},
};

/// Compaction state
/// 压缩状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Start,
  ReadSource,
  Partition,
  DispatchChildren,
  AwaitAcks,
  ClearSource,
  Done,
}

struct Compaction<'a, S> {
  lsm: &'a Lsm<S>,
  head: NodeHead,
  phase: Phase,
}

impl<'a, S: Store> Compaction<'a, S> {
  fn new(lsm: &'a Lsm<S>, head: NodeHead) -> Self {
    Self {
      lsm,
      head,
      phase: Phase::Start,
    }
  }

  fn enter(&mut self, phase: Phase) {
    debug!("{} {:?} -> {:?}", self.head.object_id, self.phase, phase);
    self.phase = phase;
  }

  async fn run(mut self, incoming: Vec<Entry>) -> Result<()> {
    self.enter(Phase::ReadSource);
    let mut entries = self.lsm.read_entries(&self.head).await?;
    if entries.is_empty() && incoming.is_empty() {
      self.enter(Phase::Done);
      return Ok(());
    }
    self.head.remember(&incoming);
    // existing first: later versions of a key stay later in every child
    // 已有条目在前：同键较新版本在子节点中仍在后
    entries.extend(incoming);
    let total = entries.len();

    self.enter(Phase::Partition);
    let mut pending = partition(&self.head, entries, self.lsm.conf.padding)?;
    let children = pending.len();

    let failed = self.scatter(&mut pending).await;
    if !failed.is_empty() {
      return Err(Error::PartialCompaction {
        object_id: self.head.object_id,
        failed,
      });
    }

    self.enter(Phase::ClearSource);
    self.head.drain();
    let buf = self.head.encode().ctx(&self.head.object_id)?;
    self.lsm.store.put_full(&self.head.object_id, buf).await?;

    self.enter(Phase::Done);
    info!(
      "compact {} {total} entries -> {children} children",
      self.head.object_id
    );
    Ok(())
  }

  /// Dispatch every pending batch and wait for all acks
  /// 分发所有待处理批次并等待全部确认
  ///
  /// Transiently failed targets are dispatched again, alone, up to `retry`
  /// more rounds. Returns the targets that never acknowledged.
  /// 暂时失败的目标单独重新分发，最多 `retry` 轮。返回始终未确认的目标。
  async fn scatter(&mut self, pending: &mut BTreeMap<String, Batch>) -> Vec<Failed> {
    let lsm = self.lsm;
    let mut failed = Vec::new();
    let mut round = 0u8;
    loop {
      self.enter(Phase::DispatchChildren);
      let acks = join_all(pending.iter().map(|(oid, batch)| {
        let oid = oid.clone();
        lsm.dispatch(batch.clone()).map(move |r| (oid, r))
      }))
      .await;

      self.enter(Phase::AwaitAcks);
      let mut again = false;
      for (oid, r) in acks {
        match r {
          Ok(()) => {
            pending.remove(&oid);
          }
          Err(e) => {
            warn!(
              "compact {} -> {oid} round {round}: {e}",
              self.head.object_id
            );
            if e.is_transient() && round < lsm.conf.retry {
              again = true;
            } else {
              pending.remove(&oid);
              failed.push(Failed {
                object_id: oid,
                error: Box::new(e),
              });
            }
          }
        }
      }
      if !again {
        return failed;
      }
      round += 1;
    }
  }
}

impl<S: Store> Lsm<S> {
  /// Drain a node into its children
  /// 将节点排空到子节点
  ///
  /// A drained node is left as is.
  /// 已排空的节点保持不变。
  pub async fn compact(&self, oid: &str) -> Result<()> {
    let head = self.head(oid).await?;
    if head.is_bottom() {
      return if head.size == 0 {
        Ok(())
      } else {
        Err(Error::LevelFull(head.object_id))
      };
    }
    Compaction::new(self, head).run(Vec::new()).await
  }

  /// Compact a node together with the batch that did not fit
  /// 将节点与放不下的批次一起压缩
  pub(crate) async fn compact_with(&self, head: NodeHead, incoming: Vec<Entry>) -> Result<()> {
    Compaction::new(self, head).run(incoming).await
  }

  /// Append a batch to a child, creating the child first when missing
  /// 向子节点追加批次，缺失时先创建
  fn dispatch(&self, batch: Batch) -> LocalBoxFuture<'_, Result<()>> {
    async move {
      let Batch { template, entries } = batch;
      let head = match self.try_head(&template.object_id).await? {
        Some(head) => head,
        None => self.init(template).await?,
      };
      self.append_head(head, entries).await
    }
    .boxed_local()
  }
}
