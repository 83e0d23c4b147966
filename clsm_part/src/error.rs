//! Error types for clsm_part
//! clsm_part 错误类型定义

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  #[error("Key {key} out of range [{low}, {high}]")]
  KeyOutOfRange { key: u64, low: u64, high: u64 },

  #[error("Invalid key range [{low}, {high}] / {splits}")]
  BadRange { low: u64, high: u64, splits: u32 },

  #[error("Level {level} too deep for {splits} splits")]
  TooDeep { level: u8, splits: u32 },

  #[error("Invalid object id: {0}")]
  BadObjectId(String),

  #[error("Invalid tree name: {0:?}")]
  BadTree(String),

  #[error("Layout: {0}")]
  Layout(String),
}

pub type Result<T> = std::result::Result<T, Error>;
