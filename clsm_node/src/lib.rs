#![cfg_attr(docsrs, feature(doc_cfg))]

//! clsm_node - Node head and codec
//! 节点头与编解码
//!
//! ## Object Layout
//! ```text
//! | 0xDEAD(2) | len(8) | head(len) | crc32(4) | ..pad.. | entry | entry | ...
//! |<-------------- reserved head --------------------->|
//!                                             entry_start_offset ^
//!
//! entry = | 0xBEEF(2) | len(8) | payload(len) |
//! ```

mod codec;
pub mod error;
mod head;

pub use codec::{
  CRC_SIZE, ENTRY_MAGIC, FRAME_SIZE, Frame, NODE_MAGIC, decode_all_entries, decode_entry,
  decode_head, encode_entries, encode_entry, encode_head, head_frame_len,
};
pub use error::{Error, Result};
pub use head::NodeHead;
