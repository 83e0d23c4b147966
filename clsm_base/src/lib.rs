#![cfg_attr(docsrs, feature(doc_cfg))]

//! clsm_base - Shared types for clsm
//! clsm 共享类型
//!
//! Contains KeyRange, Entry, column group split and the host Store trait.
//! 包含 KeyRange、Entry、列组划分与宿主存储 trait。

mod entry;
mod key_range;
mod store;

use std::collections::BTreeSet;

pub use entry::Entry;
pub use key_range::KeyRange;
pub use store::Store;

pub type Key = u64;
pub type Column = String;

/// Disjoint column groups of one level, one set per group
/// 一个层级的互不相交列组，每组一个集合
pub type ColumnGroupSplit = Vec<BTreeSet<Column>>;
