use std::{
  cell::RefCell,
  collections::{BTreeMap, HashMap},
  io,
  rc::Rc,
};

use aok::{OK, Void};
use clsm::{Entry, Error, Key, KeyRange, Lsm, Store, TreeConf};
use clsm_part::{key_group, object_id};
use clsm_store::MemStore;
use log::info;
use proptest::prelude::*;

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

const HIGH: u64 = (1 << 63) - 1;

fn range() -> KeyRange {
  KeyRange::new(1, HIGH, 2)
}

fn row(key: Key) -> Entry {
  Entry::new(key).col("c1", format!("{key}")).col("c3", "v")
}

/// Store whose writes to chosen objects fail a set number of times
/// 对指定对象的写入失败指定次数的存储
#[derive(Default)]
struct Flaky {
  inner: MemStore,
  fail: RefCell<HashMap<String, u32>>,
}

impl Flaky {
  fn fail(&self, oid: &str, times: u32) {
    self.fail.borrow_mut().insert(oid.into(), times);
  }

  fn trip(&self, oid: &str) -> io::Result<()> {
    if let Some(left) = self.fail.borrow_mut().get_mut(oid)
      && *left > 0
    {
      *left -= 1;
      return Err(io::Error::other(format!("injected {oid}")));
    }
    Ok(())
  }
}

impl Store for Flaky {
  async fn get(&self, oid: &str, offset: u64, len: u64) -> io::Result<Vec<u8>> {
    self.inner.get(oid, offset, len).await
  }

  async fn put_full(&self, oid: &str, data: Vec<u8>) -> io::Result<()> {
    self.trip(oid)?;
    self.inner.put_full(oid, data).await
  }

  async fn write_at(&self, oid: &str, offset: u64, data: Vec<u8>) -> io::Result<()> {
    self.trip(oid)?;
    self.inner.write_at(oid, offset, data).await
  }
}

fn single_group(tree: &str, capacity: u64) -> TreeConf {
  TreeConf::new(tree, range(), capacity).split([["c1", "c2", "c3", "c4"]])
}

async fn node_size<S: Store>(lsm: &Lsm<S>, oid: &str) -> clsm::Result<u64> {
  Ok(lsm.head(oid).await?.size)
}

#[compio::test]
async fn test_explicit_compact() -> Void {
  let lsm = Lsm::new(MemStore::new(), &[]);
  lsm.create(&single_group("t", 3)).await?;
  let root = object_id("t", 0, 0, 0)?;

  lsm.write("t", vec![row(5), row(HIGH - 1)]).await?;
  lsm.compact(&root).await?;
  assert_eq!(node_size(&lsm, &root).await?, 0);
  assert_eq!(node_size(&lsm, &object_id("t", 1, 0, 0)?).await?, 1);
  assert_eq!(node_size(&lsm, &object_id("t", 1, 1, 0)?).await?, 1);

  // drained node: nothing to do
  // 已排空节点：无事可做
  lsm.compact(&root).await?;
  assert_eq!(node_size(&lsm, &object_id("t", 1, 0, 0)?).await?, 1);
  assert_eq!(lsm.read("t", 5, None).await?, Some(row(5)));
  OK
}

#[compio::test]
async fn test_cascade() -> Void {
  let lsm = Lsm::new(MemStore::new(), &[]);
  lsm.create(&single_group("t", 4)).await?;

  // level-1 piece 0 is [1, 2^62), level-2 splits it at 2^61
  // 第 1 层第 0 段为 [1, 2^62)，第 2 层在 2^61 处再分
  let low = [10, 20, 30];
  let mid = [(1 << 61) + 10, (1 << 61) + 20];
  lsm.write("t", vec![row(low[0]), row(low[1]), row(mid[0])]).await?;
  lsm.write("t", vec![row(mid[1]), row(low[2])]).await?;

  assert_eq!(lsm.root("t").await?.size, 0);
  assert_eq!(node_size(&lsm, &object_id("t", 1, 0, 0)?).await?, 0);
  assert_eq!(node_size(&lsm, &object_id("t", 2, 0, 0)?).await?, 3);
  assert_eq!(node_size(&lsm, &object_id("t", 2, 1, 0)?).await?, 2);

  for key in low.iter().chain(&mid) {
    assert_eq!(lsm.read("t", *key, None).await?, Some(row(*key)));
  }
  let keys: Vec<u64> = lsm
    .scan("t", 0, u64::MAX, None)
    .await?
    .iter()
    .map(|e| e.key)
    .collect();
  assert_eq!(keys, vec![10, 20, 30, (1 << 61) + 10, (1 << 61) + 20]);
  OK
}

#[compio::test]
async fn test_retry_transient_child() -> Void {
  let store = Rc::new(Flaky::default());
  let lsm = Lsm::new(store.clone(), &[]);
  lsm.create(&single_group("t", 3)).await?;
  lsm
    .write("t", vec![row(5), row(1 << 62), row(HIGH - 1)])
    .await?;

  let high = object_id("t", 1, 1, 0)?;
  store.fail(&high, 1);
  lsm.write("t", vec![row(7)]).await?;

  // retried child written once, sibling not written twice
  // 重试的子节点只写一次，兄弟节点未被重复写入
  assert_eq!(node_size(&lsm, &high).await?, 2);
  assert_eq!(node_size(&lsm, &object_id("t", 1, 0, 0)?).await?, 2);
  assert_eq!(lsm.root("t").await?.size, 0);
  OK
}

#[compio::test]
async fn test_partial_compaction() -> Void {
  let store = Rc::new(Flaky::default());
  let lsm = Lsm::new(store.clone(), &[]);
  lsm.create(&single_group("t", 3)).await?;
  let root = object_id("t", 0, 0, 0)?;
  lsm
    .write("t", vec![row(5), row(1 << 62), row(HIGH - 1)])
    .await?;

  let high = object_id("t", 1, key_group(&range(), 1, HIGH - 1)?, 0)?;
  store.fail(&high, 100);
  let err = lsm.write("t", vec![row(7)]).await.err();
  info!("{err:?}");
  let Some(err) = err else {
    panic!("compaction should fail");
  };
  assert!(matches!(err, Error::PartialCompaction { .. }));
  assert_eq!(err.failed_targets(), vec![high.as_str()]);

  // source intact and readable
  // 源节点完好且可读
  assert_eq!(node_size(&lsm, &root).await?, 3);
  assert_eq!(lsm.read("t", HIGH - 1, None).await?, Some(row(HIGH - 1)));

  // target back: compaction completes
  // 目标恢复：压缩完成
  store.fail(&high, 0);
  lsm.compact(&root).await?;
  assert_eq!(node_size(&lsm, &root).await?, 0);
  assert_eq!(node_size(&lsm, &high).await?, 2);
  assert_eq!(lsm.read("t", 1 << 62, None).await?, Some(row(1 << 62)));
  OK
}

#[compio::test]
async fn test_terminal_child_failure() -> Void {
  let lsm = Lsm::new(MemStore::new(), &[]);
  lsm.create(&single_group("t", 2).max_level(1)).await?;
  lsm.write("t", vec![row(5), row(6)]).await?;

  // all three land in one bottom-level child of capacity 2
  // 三个条目全部落入容量为 2 的同一底层子节点
  let err = lsm.write("t", vec![row(7)]).await.err();
  let Some(Error::PartialCompaction { failed, .. }) = err else {
    panic!("expected partial compaction");
  };
  assert_eq!(failed.len(), 1);
  assert!(matches!(*failed[0].error, Error::LevelFull(_)));
  assert_eq!(lsm.root("t").await?.size, 2);
  OK
}

#[compio::test]
async fn test_child_object_ids() -> Void {
  let lsm = Lsm::new(MemStore::new(), &[]);
  let conf = TreeConf::new("t", range(), 3)
    .max_level(2)
    .split([["c1", "c2"], ["c3", "c4"]])
    .split([vec!["c1"], vec!["c2"], vec!["c3", "c4"], vec!["c5"]]);
  lsm.create(&conf).await?;

  let root = object_id("t", 0, 0, 0)?;
  let ids = lsm.child_object_ids(&root).await?;
  assert_eq!(ids.len(), 6);
  assert!(ids.contains(&object_id("t", 1, 1, 2)?));

  let ids = lsm.child_object_ids(&object_id("t", 1, 1, 0)?).await?;
  assert_eq!(
    ids,
    vec![
      object_id("t", 2, 2, 0)?,
      object_id("t", 2, 2, 1)?,
      object_id("t", 2, 3, 0)?,
      object_id("t", 2, 3, 1)?,
    ]
  );
  let ids = lsm.child_object_ids(&object_id("t", 1, 0, 2)?).await?;
  assert_eq!(ids.len(), 4);

  assert!(lsm.child_object_ids(&object_id("t", 2, 0, 0)?).await?.is_empty());
  assert!(matches!(
    lsm.child_object_ids("nonsense").await,
    Err(Error::BadObjectId(_))
  ));
  OK
}

type Triple = (u64, String, Vec<u8>);

fn triples(entries: &[Entry]) -> Vec<Triple> {
  let mut li: Vec<Triple> = entries
    .iter()
    .flat_map(|e| {
      e.value
        .iter()
        .map(move |(c, v)| (e.key, c.clone(), v.clone()))
    })
    .collect();
  li.sort();
  li
}

fn arb_entry() -> impl Strategy<Value = Entry> {
  (
    1..=HIGH,
    prop::collection::btree_map(
      prop::sample::select(vec!["c1", "c2", "c3", "c4", "c5"]).prop_map(String::from),
      prop::collection::vec(any::<u8>(), 0..8),
      0..5,
    ),
  )
    .prop_map(|(key, value)| Entry { key, value })
}

/// Key, column, value triples move from the source to the children unchanged
/// (键, 列, 值) 三元组从源节点原样移入子节点
#[test]
fn prop_compaction_conservation() {
  let config = ProptestConfig::with_cases(40);
  let mut runner = proptest::test_runner::TestRunner::new(config);

  runner
    .run(&prop::collection::vec(arb_entry(), 1..=8), |entries| {
      compio::runtime::Runtime::new().unwrap().block_on(async {
        let store = Rc::new(MemStore::new());
        let lsm = Lsm::new(store.clone(), &[]);
        let conf = TreeConf::new("p", range(), 8).split([["c1", "c2"], ["c3", "c4"]]);
        lsm.create(&conf).await.unwrap();
        let root = object_id("p", 0, 0, 0).unwrap();

        lsm.write("p", entries).await.unwrap();
        let before = triples(&lsm.read_all(&root).await.unwrap());
        lsm.compact(&root).await.unwrap();

        let mut after = Vec::new();
        let mut by_group: BTreeMap<u32, Vec<Entry>> = BTreeMap::new();
        for oid in store.ids() {
          let obj = clsm_part::parse_object_id(&oid).unwrap();
          if obj.level == 1 {
            let li = lsm.read_all(&oid).await.unwrap();
            after.extend(li.iter().cloned());
            by_group.entry(obj.col_group).or_default().extend(li);
          }
        }
        prop_assert!(lsm.read_all(&root).await.unwrap().is_empty());
        prop_assert_eq!(triples(&after), before);

        // children hold only their own group's columns
        // 子节点只含本组的列
        for (group, li) in by_group {
          for e in li {
            for col in e.value.keys() {
              let expect = match col.as_str() {
                "c1" | "c2" => 0,
                "c3" | "c4" => 1,
                _ => 2,
              };
              prop_assert_eq!(expect, group);
            }
          }
        }
        Ok(())
      })
    })
    .unwrap();
}
