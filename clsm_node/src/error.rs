//! Error types for clsm_node
//! clsm_node 错误类型定义

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  /// Object holds no head yet
  /// 对象尚无头部
  #[error("Uninitialized node")]
  Uninitialized,

  #[error("Corrupt node: {0}")]
  Corrupt(String),

  #[error("Head frame {need} bytes exceeds reserved {have}")]
  HeadOverflow { need: u64, have: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
