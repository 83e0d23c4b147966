//! Object ids: `{tree}/level-{L}/keyrange-{R}/columngroup-{C}`
//! 对象 id

use std::{fmt, str::FromStr};

use crate::{Error, Result};

const LEVEL: &str = "/level-";
const KEY_RANGE: &str = "/keyrange-";
const COL_GROUP: &str = "/columngroup-";

/// Parsed object id
/// 解析后的对象 id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjId {
  pub tree: String,
  pub level: u8,
  pub key_group: u64,
  pub col_group: u32,
}

/// Tree name must be non-empty and must not contain `/level-`
/// 树名须非空且不含 `/level-`
pub fn check_tree(tree: &str) -> Result<()> {
  if tree.is_empty() || tree.contains(LEVEL) {
    return Err(Error::BadTree(tree.into()));
  }
  Ok(())
}

impl ObjId {
  pub fn new(tree: impl Into<String>, level: u8, key_group: u64, col_group: u32) -> Result<Self> {
    let tree = tree.into();
    check_tree(&tree)?;
    Ok(Self {
      tree,
      level,
      key_group,
      col_group,
    })
  }

  /// Root node of a tree
  /// 树的根节点
  #[inline]
  pub fn root(tree: impl Into<String>) -> Result<Self> {
    Self::new(tree, 0, 0, 0)
  }
}

impl fmt::Display for ObjId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}{LEVEL}{}{KEY_RANGE}{}{COL_GROUP}{}",
      self.tree, self.level, self.key_group, self.col_group
    )
  }
}

fn num<T: FromStr>(s: &str, whole: &str) -> Result<T> {
  if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
    return Err(Error::BadObjectId(whole.into()));
  }
  s.parse().map_err(|_| Error::BadObjectId(whole.into()))
}

impl FromStr for ObjId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let bad = || Error::BadObjectId(s.into());
    let at = s.find(LEVEL).ok_or_else(bad)?;
    let tree = &s[..at];
    if tree.is_empty() {
      return Err(bad());
    }
    let rest = &s[at + LEVEL.len()..];
    let (level, rest) = rest.split_once(KEY_RANGE).ok_or_else(bad)?;
    let (key_group, col_group) = rest.split_once(COL_GROUP).ok_or_else(bad)?;
    Ok(Self {
      tree: tree.into(),
      level: num(level, s)?,
      key_group: num(key_group, s)?,
      col_group: num(col_group, s)?,
    })
  }
}

/// Build an object id string
/// 构造对象 id 字符串
#[inline]
pub fn object_id(tree: &str, level: u8, key_group: u64, col_group: u32) -> Result<String> {
  Ok(ObjId::new(tree, level, key_group, col_group)?.to_string())
}

/// Inverse of [`object_id`]
/// [`object_id`] 的逆运算
#[inline]
pub fn parse_object_id(s: &str) -> Result<ObjId> {
  s.parse()
}
