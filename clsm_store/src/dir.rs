//! Directory store: one file per object
//! 目录存储：每个对象一个文件
//!
//! `tree/level-1/keyrange-0/columngroup-2` maps to `{root}/tree/level-1/keyrange-0/columngroup-2`.

use std::{
  io,
  path::{Component, Path, PathBuf},
};

use clsm_base::Store;
use compio::{
  fs::{self, File, OpenOptions},
  io::{AsyncReadAtExt, AsyncWriteAtExt},
};
use log::debug;

#[derive(Debug, Clone)]
pub struct DirStore {
  root: PathBuf,
}

impl DirStore {
  pub async fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
    let root = root.into();
    fs::create_dir_all(&root).await?;
    Ok(Self { root })
  }

  #[inline]
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// File path of an object; rejects ids escaping the root
  /// 对象文件路径；拒绝越出根目录的 id
  pub fn path(&self, oid: &str) -> io::Result<PathBuf> {
    let rel = Path::new(oid);
    let ok = !oid
      .split('/')
      .any(|seg| seg.is_empty() || seg == "." || seg == "..")
      && rel.components().all(|c| matches!(c, Component::Normal(_)));
    if !ok {
      return Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("bad object id {oid:?}"),
      ));
    }
    Ok(self.root.join(rel))
  }

  async fn open_write(&self, path: &Path, truncate: bool) -> io::Result<File> {
    if let Some(dir) = path.parent() {
      fs::create_dir_all(dir).await?;
    }
    OpenOptions::new()
      .write(true)
      .create(true)
      .truncate(truncate)
      .open(path)
      .await
  }
}

impl Store for DirStore {
  async fn get(&self, oid: &str, offset: u64, len: u64) -> io::Result<Vec<u8>> {
    let path = self.path(oid)?;
    let file = match File::open(&path).await {
      Ok(file) => file,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(e),
    };
    let size = file.metadata().await?.len();
    let end = offset.saturating_add(len).min(size);
    if end <= offset {
      return Ok(Vec::new());
    }
    let buf = vec![0u8; (end - offset) as usize];
    let compio::buf::BufResult(res, buf) = file.read_exact_at(buf, offset).await;
    res?;
    Ok(buf)
  }

  async fn put_full(&self, oid: &str, data: Vec<u8>) -> io::Result<()> {
    let path = self.path(oid)?;
    let tmp = path.with_extension("tmp");

    // temp file is gone on every exit path
    // 所有退出路径都会删除临时文件
    defer_lite::defer! { let _ = std::fs::remove_file(&tmp); }

    let mut file = self.open_write(&tmp, true).await?;
    let len = data.len();
    file.write_all_at(data, 0).await.0?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&tmp, &path).await?;
    debug!("put {oid} {len}B");
    Ok(())
  }

  async fn write_at(&self, oid: &str, offset: u64, data: Vec<u8>) -> io::Result<()> {
    let path = self.path(oid)?;
    let mut file = self.open_write(&path, false).await?;
    file.write_all_at(data, offset).await.0?;
    file.sync_data().await
  }
}
