#![cfg_attr(docsrs, feature(doc_cfg))]

//! Fixed-size bloom filter over the string form of keys
//! 基于键字符串形式的定长布隆过滤器
//!
//! MD5 digest (16 bytes) is read as 4 little-endian u32, each taken modulo the
//! bit count. With a 2^16-bit filter this is the classic 4 x 16-bit index scheme.
//! MD5 摘要（16 字节）按 4 个小端 u32 读取，各自对位数取模。

mod error;

use bitcode::{Decode, Encode};
pub use error::{Error, Result};
use md5::{Digest, Md5};

/// Hash functions per key
/// 每个键的哈希函数数量
pub const HASH_COUNT: usize = 4;

/// Bits of a node filter (64K)
/// 节点过滤器位数
pub const NODE_BITS: u32 = 1 << 16;

/// Bits of the root "ever written" filter (256K)
/// 根节点"曾写入"过滤器位数
pub const EVER_BITS: u32 = 1 << 18;

const WORD: u32 = u64::BITS;

/// Bit indices of a key
/// 键的位索引
#[inline]
pub fn indices(key: &str, bits: u32) -> [u32; HASH_COUNT] {
  let digest = Md5::digest(key.as_bytes());
  let mut out = [0u32; HASH_COUNT];
  for (slot, chunk) in out.iter_mut().zip(digest.chunks_exact(4)) {
    *slot = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) % bits;
  }
  out
}

/// Bloom filter bit vector
/// 布隆过滤器位向量
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Bloom {
  bits: u32,
  words: Vec<u64>,
}

impl Default for Bloom {
  fn default() -> Self {
    Self::new(NODE_BITS)
  }
}

impl Bloom {
  /// Bit count is rounded up to a multiple of 64
  /// 位数向上取整到 64 的倍数
  pub fn new(bits: u32) -> Self {
    let bits = bits.max(WORD).next_multiple_of(WORD);
    Self {
      bits,
      words: vec![0; (bits / WORD) as usize],
    }
  }

  #[inline]
  pub fn bits(&self) -> u32 {
    self.bits
  }

  #[inline]
  fn set(&mut self, idx: u32) {
    self.words[(idx / WORD) as usize] |= 1 << (idx % WORD);
  }

  #[inline]
  fn get(&self, idx: u32) -> bool {
    self.words[(idx / WORD) as usize] & (1 << (idx % WORD)) != 0
  }

  pub fn insert(&mut self, key: &str) {
    for idx in indices(key, self.bits) {
      self.set(idx);
    }
  }

  /// False positives possible, false negatives never
  /// 可能误报，绝不漏报
  pub fn contains(&self, key: &str) -> bool {
    indices(key, self.bits).into_iter().all(|idx| self.get(idx))
  }

  #[inline]
  pub fn insert_key(&mut self, key: u64) {
    self.insert(&key.to_string());
  }

  #[inline]
  pub fn contains_key(&self, key: u64) -> bool {
    self.contains(&key.to_string())
  }

  #[inline]
  pub fn clear(&mut self) {
    self.words.fill(0);
  }

  /// Alternate full and empty words: the largest encoded form of a filter
  /// 全满与全空字交替：过滤器编码后的最大形态
  ///
  /// Used to size the space reserved for a head. The filter no longer answers
  /// lookups meaningfully afterwards.
  /// 用于计算头部预留空间，之后查询结果无意义。
  pub fn saturate(&mut self) {
    for (i, w) in self.words.iter_mut().enumerate() {
      *w = if i % 2 == 0 { u64::MAX } else { 0 };
    }
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.words.iter().all(|w| *w == 0)
  }

  #[inline]
  pub fn count_ones(&self) -> u32 {
    self.words.iter().map(|w| w.count_ones()).sum()
  }

  /// OR every source into self
  /// 将所有源按位或入自身
  pub fn merge<'a>(&mut self, sources: impl IntoIterator<Item = &'a Bloom>) -> Result<()> {
    for src in sources {
      if src.bits != self.bits {
        return Err(Error::SizeMismatch {
          dest: self.bits,
          src: src.bits,
        });
      }
      for (d, s) in self.words.iter_mut().zip(&src.words) {
        *d |= *s;
      }
    }
    Ok(())
  }

  /// Overwrite self with `src`
  /// 用 `src` 覆盖自身
  pub fn copy_from(&mut self, src: &Bloom) -> Result<()> {
    if src.bits != self.bits {
      return Err(Error::SizeMismatch {
        dest: self.bits,
        src: src.bits,
      });
    }
    self.words.copy_from_slice(&src.words);
    Ok(())
  }
}
