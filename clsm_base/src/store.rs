//! Host object store contract
//! 宿主对象存储约定

use std::{future::Future, io};

/// Key-addressed byte-blob store
/// 按键寻址的字节块存储
///
/// All calls against one object are serialized by the host; the engine adds no
/// locking of its own for a single object.
/// 同一对象上的调用由宿主串行化，引擎不再为单个对象加锁。
pub trait Store {
  /// Range read. Reading past the end returns fewer bytes (or none), not an error.
  /// 范围读取。越过末尾返回更少字节（或空），而非错误。
  fn get(&self, oid: &str, offset: u64, len: u64) -> impl Future<Output = io::Result<Vec<u8>>>;

  /// Replace the whole object
  /// 整体替换对象
  fn put_full(&self, oid: &str, data: Vec<u8>) -> impl Future<Output = io::Result<()>>;

  /// Positional write, durable when the future resolves. Writing past the end extends the object.
  /// 定位写入，完成即持久。越过末尾写入会扩展对象。
  fn write_at(&self, oid: &str, offset: u64, data: Vec<u8>)
  -> impl Future<Output = io::Result<()>>;
}

impl<S: Store> Store for std::rc::Rc<S> {
  #[inline]
  fn get(&self, oid: &str, offset: u64, len: u64) -> impl Future<Output = io::Result<Vec<u8>>> {
    (**self).get(oid, offset, len)
  }

  #[inline]
  fn put_full(&self, oid: &str, data: Vec<u8>) -> impl Future<Output = io::Result<()>> {
    (**self).put_full(oid, data)
  }

  #[inline]
  fn write_at(
    &self,
    oid: &str,
    offset: u64,
    data: Vec<u8>,
  ) -> impl Future<Output = io::Result<()>> {
    (**self).write_at(oid, offset, data)
  }
}
