#![cfg_attr(docsrs, feature(doc_cfg))]

//! clsm_part - Partitioner
//! 划分器
//!
//! Maps a key to its key group at a level, a column to its column group, and
//! (tree, level, key group, column group) to an object id.
//! 将键映射到层级中的键组、列映射到列组，并将 (树, 层级, 键组, 列组) 映射为对象 id。

mod column;
pub mod error;
mod key;
mod layout;
mod objid;

pub use column::{ColumnIndex, column_groups, sub_groups};
pub use error::{Error, Result};
pub use key::{
  child_group, child_range, group_count, groups_between, key_group, local_group, sub_range,
};
pub use layout::validate_layout;
pub use objid::{ObjId, check_tree, object_id, parse_object_id};
