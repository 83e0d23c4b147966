//! Head and entry framing
//! 头部与条目分帧

use clsm_base::Entry;
use zerocopy::{
  FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
  little_endian::{U16, U64},
};

use crate::{Error, NodeHead, Result};

/// Head marker
/// 头部标记
pub const NODE_MAGIC: u16 = 0xDEAD;

/// Entry marker
/// 条目标记
pub const ENTRY_MAGIC: u16 = 0xBEEF;

/// Marker + length prefix
/// 标记 + 长度前缀
pub const FRAME_SIZE: usize = size_of::<Frame>();

pub const CRC_SIZE: usize = 4;

/// Fixed prefix of every frame (10 bytes)
/// 每帧的定长前缀（10 字节）
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Clone, Copy, Debug)]
#[repr(C)]
pub struct Frame {
  pub magic: U16,
  pub len: U64,
}

impl Frame {
  #[inline]
  pub fn new(magic: u16, len: usize) -> Self {
    Self {
      magic: U16::new(magic),
      len: U64::new(len as u64),
    }
  }

  #[inline]
  pub fn parse(buf: &[u8]) -> Option<Self> {
    Self::read_from_prefix(buf).ok().map(|(frame, _)| frame)
  }
}

#[inline]
fn corrupt(msg: impl Into<String>) -> Error {
  Error::Corrupt(msg.into())
}

pub fn encode_head(head: &NodeHead) -> Vec<u8> {
  let payload = bitcode::encode(head);
  let mut out = Vec::with_capacity(FRAME_SIZE + payload.len() + CRC_SIZE);
  out.extend_from_slice(Frame::new(NODE_MAGIC, payload.len()).as_bytes());
  out.extend_from_slice(&payload);
  out.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
  out
}

/// Whole head frame length, learned from the first bytes of an object
/// 由对象起始字节得到完整头帧长度
///
/// Lets a reader fetch a small prefix first and read again only when the
/// head is longer.
/// 读取方先取小段前缀，仅在头部更长时再读一次。
pub fn head_frame_len(prefix: &[u8]) -> Result<u64> {
  if prefix.is_empty() {
    return Err(Error::Uninitialized);
  }
  let frame =
    Frame::parse(prefix).ok_or_else(|| corrupt(format!("head prefix {} bytes", prefix.len())))?;
  let magic = frame.magic.get();
  if magic != NODE_MAGIC {
    return Err(corrupt(format!("head marker {magic:#06x}")));
  }
  frame
    .len
    .get()
    .checked_add((FRAME_SIZE + CRC_SIZE) as u64)
    .ok_or_else(|| corrupt("head length overflow"))
}

/// Decode a head from a buffer starting at offset 0 (may be longer than the head)
/// 从偏移 0 起的缓冲区解码头部（缓冲区可长于头部）
pub fn decode_head(buf: &[u8]) -> Result<NodeHead> {
  let total = head_frame_len(buf)?;
  if total > buf.len() as u64 {
    return Err(corrupt(format!(
      "head length {total} exceeds {} bytes",
      buf.len()
    )));
  }
  let end = total as usize - CRC_SIZE;
  let payload = &buf[FRAME_SIZE..end];
  let crc = u32::from_le_bytes([buf[end], buf[end + 1], buf[end + 2], buf[end + 3]]);
  if crc32fast::hash(payload) != crc {
    return Err(corrupt("head crc mismatch"));
  }
  bitcode::decode(payload).map_err(|e| corrupt(format!("head: {e}")))
}

pub fn encode_entry(entry: &Entry) -> Vec<u8> {
  let mut out = Vec::new();
  push_entry(&mut out, entry);
  out
}

#[inline]
fn push_entry(out: &mut Vec<u8>, entry: &Entry) {
  let payload = bitcode::encode(entry);
  out.extend_from_slice(Frame::new(ENTRY_MAGIC, payload.len()).as_bytes());
  out.extend_from_slice(&payload);
}

/// Frames of all entries, back to back
/// 所有条目的帧，首尾相接
pub fn encode_entries<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Vec<u8> {
  let mut out = Vec::new();
  for entry in entries {
    push_entry(&mut out, entry);
  }
  out
}

/// Decode one entry, returning it and the bytes consumed
/// 解码一个条目，返回条目与消耗字节数
///
/// `None` when the frame runs past `buf` (torn tail).
/// 帧超出 `buf` 时返回 `None`（尾部残缺）。
pub fn decode_entry(buf: &[u8]) -> Result<Option<(Entry, usize)>> {
  let Some(frame) = Frame::parse(buf) else {
    return Ok(None);
  };
  let magic = frame.magic.get();
  if magic != ENTRY_MAGIC {
    return Err(corrupt(format!("entry marker {magic:#06x}")));
  }
  let len = frame.len.get();
  let avail = (buf.len() - FRAME_SIZE) as u64;
  if len > avail {
    return Ok(None);
  }
  let end = FRAME_SIZE + len as usize;
  let entry = bitcode::decode(&buf[FRAME_SIZE..end]).map_err(|e| corrupt(format!("entry: {e}")))?;
  Ok(Some((entry, end)))
}

/// Decode entries until the buffer ends or a torn frame is met
/// 解码条目直到缓冲区结束或遇到残缺帧
pub fn decode_all_entries(mut buf: &[u8]) -> Result<Vec<Entry>> {
  let mut li = Vec::new();
  while let Some((entry, used)) = decode_entry(buf)? {
    li.push(entry);
    buf = &buf[used..];
  }
  Ok(li)
}
