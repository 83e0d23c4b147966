//! In-memory store
//! 内存存储

use std::{cell::RefCell, collections::HashMap, io};

use clsm_base::Store;

/// Objects in a `HashMap`, single thread
/// 对象存于 `HashMap`，单线程
#[derive(Debug, Default)]
pub struct MemStore {
  map: RefCell<HashMap<String, Vec<u8>>>,
}

impl MemStore {
  #[inline]
  pub fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub fn contains(&self, oid: &str) -> bool {
    self.map.borrow().contains_key(oid)
  }

  /// Object length in bytes
  /// 对象字节长度
  #[inline]
  pub fn size(&self, oid: &str) -> Option<usize> {
    self.map.borrow().get(oid).map(Vec::len)
  }

  /// Sorted ids of all objects
  /// 所有对象 id（已排序）
  pub fn ids(&self) -> Vec<String> {
    let mut li: Vec<String> = self.map.borrow().keys().cloned().collect();
    li.sort_unstable();
    li
  }
}

impl Store for MemStore {
  async fn get(&self, oid: &str, offset: u64, len: u64) -> io::Result<Vec<u8>> {
    let map = self.map.borrow();
    let Some(data) = map.get(oid) else {
      return Ok(Vec::new());
    };
    let size = data.len() as u64;
    let begin = offset.min(size) as usize;
    let end = offset.saturating_add(len).min(size) as usize;
    Ok(data[begin..end].to_vec())
  }

  async fn put_full(&self, oid: &str, data: Vec<u8>) -> io::Result<()> {
    self.map.borrow_mut().insert(oid.into(), data);
    Ok(())
  }

  async fn write_at(&self, oid: &str, offset: u64, data: Vec<u8>) -> io::Result<()> {
    let mut map = self.map.borrow_mut();
    let obj = map.entry(oid.into()).or_default();
    let begin = usize::try_from(offset).map_err(io::Error::other)?;
    let end = begin + data.len();
    if obj.len() < end {
      obj.resize(end, 0);
    }
    obj[begin..end].copy_from_slice(&data);
    Ok(())
  }
}
