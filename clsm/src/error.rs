//! Error types for clsm
//! clsm 错误类型定义

use thiserror::Error;

/// One compaction target that did not acknowledge
/// 未确认的单个压缩目标
#[derive(Debug)]
pub struct Failed {
  pub object_id: String,
  pub error: Box<Error>,
}

#[derive(Error, Debug)]
pub enum Error {
  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("Uninitialized node {0}")]
  Uninitialized(String),

  #[error("Node already initialized {0}")]
  AlreadyInitialized(String),

  #[error("Corrupt node {object_id}: {msg}")]
  Corrupt { object_id: String, msg: String },

  #[error("Key {key} out of range [{low}, {high}]")]
  KeyOutOfRange { key: u64, low: u64, high: u64 },

  /// Turned into a compaction, never returned from append
  /// 转为压缩，append 不会返回
  #[error("Capacity exceeded {0}")]
  CapacityExceeded(String),

  #[error("Bottom level node full {0}")]
  LevelFull(String),

  #[error("Compaction of {object_id} failed for {} targets", failed.len())]
  PartialCompaction {
    object_id: String,
    failed: Vec<Failed>,
  },

  #[error("Head of {object_id} needs {need} bytes, {have} reserved")]
  HeadOverflow {
    object_id: String,
    need: u64,
    have: u64,
  },

  #[error("Layout: {0}")]
  Layout(String),

  #[error("Invalid object id: {0}")]
  BadObjectId(String),

  #[error("Bloom: {0}")]
  Bloom(#[from] clsm_bloom::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
  /// Worth another dispatch round
  /// 值得再次分发
  #[inline]
  pub fn is_transient(&self) -> bool {
    matches!(self, Self::Io(_))
  }

  /// Object ids of failed compaction targets
  /// 压缩失败目标的对象 id
  pub fn failed_targets(&self) -> Vec<&str> {
    match self {
      Self::PartialCompaction { failed, .. } => {
        failed.iter().map(|f| f.object_id.as_str()).collect()
      }
      _ => Vec::new(),
    }
  }
}

impl From<clsm_part::Error> for Error {
  fn from(e: clsm_part::Error) -> Self {
    use clsm_part::Error as E;
    match e {
      E::KeyOutOfRange { key, low, high } => Self::KeyOutOfRange { key, low, high },
      E::BadObjectId(id) => Self::BadObjectId(id),
      E::BadTree(tree) => Self::BadObjectId(tree),
      e @ (E::BadRange { .. } | E::TooDeep { .. } | E::Layout(_)) => Self::Layout(e.to_string()),
    }
  }
}

/// Attach the object id to a node codec error
/// 为节点编解码错误附加对象 id
pub(crate) trait NodeCtx<T> {
  fn ctx(self, object_id: &str) -> Result<T>;
}

impl<T> NodeCtx<T> for clsm_node::Result<T> {
  fn ctx(self, object_id: &str) -> Result<T> {
    use clsm_node::Error as E;
    self.map_err(|e| match e {
      E::Uninitialized => Error::Uninitialized(object_id.into()),
      E::Corrupt(msg) => Error::Corrupt {
        object_id: object_id.into(),
        msg,
      },
      E::HeadOverflow { need, have } => Error::HeadOverflow {
        object_id: object_id.into(),
        need,
        have,
      },
    })
  }
}
