use aok::{OK, Void};
use clsm_bloom::{Bloom, EVER_BITS, Error, HASH_COUNT, NODE_BITS, indices};
use log::info;
use proptest::prelude::*;

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

#[test]
fn test_bloom_basic() -> Void {
  let mut bloom = Bloom::new(NODE_BITS);
  assert!(bloom.is_empty());
  assert!(!bloom.contains_key(42));

  bloom.insert_key(42);
  assert!(bloom.contains_key(42));
  assert!(bloom.contains("42"));
  assert!(!bloom.is_empty());
  assert!(bloom.count_ones() as usize <= HASH_COUNT);

  bloom.clear();
  assert!(bloom.is_empty());
  assert!(!bloom.contains_key(42));
  OK
}

#[test]
fn test_bloom_rounding() -> Void {
  assert_eq!(Bloom::new(1).bits(), 64);
  assert_eq!(Bloom::new(65).bits(), 128);
  assert_eq!(Bloom::new(EVER_BITS).bits(), EVER_BITS);
  for idx in indices("anything", 100) {
    assert!(idx < 100);
  }
  OK
}

#[test]
fn test_bloom_false_positive_rate() -> Void {
  let mut bloom = Bloom::new(NODE_BITS);
  for k in 0..1000u64 {
    bloom.insert_key(k);
  }
  let fp = (100_000..110_000u64).filter(|k| bloom.contains_key(*k)).count();
  info!("false positives {fp}/10000");
  // 1000 keys, 4 hashes, 64K bits: expected rate well under 1%
  // 1000 个键、4 个哈希、64K 位：期望误报率远低于 1%
  assert!(fp < 100, "too many false positives: {fp}");
  OK
}

#[test]
fn test_bloom_merge_copy() -> Void {
  let mut a = Bloom::new(NODE_BITS);
  let mut b = Bloom::new(NODE_BITS);
  a.insert_key(1);
  b.insert_key(2);

  let mut dest = Bloom::new(NODE_BITS);
  dest.merge([&a, &b])?;
  assert!(dest.contains_key(1));
  assert!(dest.contains_key(2));

  let mut c = Bloom::new(NODE_BITS);
  c.copy_from(&a)?;
  assert_eq!(c, a);

  let big = Bloom::new(EVER_BITS);
  assert_eq!(
    dest.merge([&big]),
    Err(Error::SizeMismatch {
      dest: NODE_BITS,
      src: EVER_BITS
    })
  );
  assert!(c.copy_from(&big).is_err());
  OK
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(64))]

  /// Every inserted key is reported present
  /// 所有插入的键都被报告存在
  #[test]
  fn prop_no_false_negative(
    keys in prop::collection::vec(any::<u64>(), 1..300),
    bits in prop::sample::select(vec![64u32, 4096, NODE_BITS, EVER_BITS]),
  ) {
    let mut bloom = Bloom::new(bits);
    for k in &keys {
      bloom.insert_key(*k);
    }
    for k in &keys {
      prop_assert!(bloom.contains_key(*k));
    }
  }
}
