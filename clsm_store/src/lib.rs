#![cfg_attr(docsrs, feature(doc_cfg))]

//! clsm_store - Object stores for clsm
//! clsm 对象存储
//!
//! `MemStore` keeps objects in memory, `DirStore` keeps one file per object.
//! `MemStore` 将对象保存在内存，`DirStore` 每个对象一个文件。

mod dir;
mod mem;

pub use dir::DirStore;
pub use mem::MemStore;
