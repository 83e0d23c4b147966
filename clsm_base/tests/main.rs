use aok::{OK, Void};
use clsm_base::{Entry, KeyRange};
use log::info;

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

#[test]
fn test_key_range() -> Void {
  let r = KeyRange::new(1, u64::MAX, 2);
  assert!(r.is_valid());
  assert!(r.contains(1));
  assert!(r.contains(u64::MAX));
  assert!(!r.contains(0));
  assert_eq!(r.span(), u64::MAX as u128);

  assert!(!KeyRange::new(5, 4, 2).is_valid());
  assert!(!KeyRange::new(0, 4, 0).is_valid());

  // Full u64 domain has 2^64 keys
  // 完整 u64 域有 2^64 个键
  assert_eq!(KeyRange::new(0, u64::MAX, 1).span(), 1u128 << 64);
  OK
}

#[test]
fn test_entry_project_merge() -> Void {
  let e = Entry::new(7).col("c1", "a").col("c2", "b").col("c3", "c");
  assert_eq!(e.width(), 3);

  let p = e.clone().project(&["c2".into(), "missing".into()]);
  info!("projected {p:?}");
  assert_eq!(p.key, 7);
  assert_eq!(p.width(), 1);
  assert_eq!(p.value.get("c2").map(Vec::as_slice), Some(b"b".as_slice()));

  // Union of disjoint partials restores the row
  // 不相交部分列合并恢复整行
  let mut left = e.clone().project(&["c1".into()]);
  left.merge(e.clone().project(&["c2".into(), "c3".into()]));
  assert_eq!(left, e);
  OK
}
