//! Error types for clsm_bloom
//! clsm_bloom 错误类型定义

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
  #[error("Bloom size mismatch: dest {dest} bits, src {src} bits")]
  SizeMismatch { dest: u32, src: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
