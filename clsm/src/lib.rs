#![cfg_attr(docsrs, feature(doc_cfg))]

//! clsm - Column-grouped LSM index over an object store
//! 基于对象存储的列组 LSM 索引
//!
//! Rows enter the root node of a tree. A full node compacts: its entries are
//! split by key sub range and column group into child nodes one level down,
//! then it is cleared. Reads walk levels from the root and gather partial rows
//! from every column group object they need.
//! 行写入树的根节点。节点写满后压缩：条目按键子范围与列组拆分到下一层子节点，然后清空。
//! 读取自根节点逐层查找，并从所需的各列组对象收集部分行。

mod compact;
pub mod conf;
pub mod error;
mod gather;
mod lsm;
mod node;
mod partition;

pub use clsm_base::{Column, ColumnGroupSplit, Entry, Key, KeyRange, Store};
pub use clsm_node::NodeHead;
pub use compact::Phase;
pub use conf::{Conf, ParsedConf, TreeConf};
pub use error::{Error, Failed, Result};
pub use lsm::Lsm;
