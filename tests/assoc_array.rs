use assoc_array::{
    AllocError, AllocSite, Allocator, AssocArray, Entry, Error, OneAtATime, Rejected, Status,
    Time33,
};
use std::cell::{Cell, RefCell};
use std::hash::{BuildHasher, Hasher};
use std::rc::Rc;
use test_log::test;

fn time33_bucket(key: &[u8], bits: u32) -> u64 {
    let mut h = Time33.build_hasher();
    h.write(key);
    h.finish() & ((1u64 << bits) - 1)
}

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

/// Invariant: four one-byte keys land in four distinct buckets of a
/// four-bucket table, and first/last follow insertion order.
#[test]
fn four_buckets_first_last() {
    let buckets: Vec<u64> = [b"a", b"b", b"c", b"d"]
        .iter()
        .map(|k| time33_bucket(&k[..], 2))
        .collect();
    assert_eq!(buckets, vec![2, 3, 0, 1]);

    let mut a = AssocArray::new(2).unwrap();
    for (k, v) in [("a", 1u32), ("b", 2), ("c", 3), ("d", 4)] {
        a.add(v, k.as_bytes()).unwrap();
    }
    assert_eq!(a.collision_percent(), 0);
    assert_eq!(a.get_first().map(|e| *e.data()), Some(1));
    assert_eq!(a.get_last().map(|e| *e.data()), Some(4));
    assert_eq!(a.del_first(), Status::Removed);
    assert_eq!(a.get_first().map(|e| *e.data()), Some(2));
    assert_eq!(a.len(), 3);
}

/// Invariant: replacing a key twice leaves one entry and releases the first data.
#[test]
fn add_replace_counts_releases() {
    let released = Rc::new(RefCell::new(Vec::new()));
    let sink = released.clone();
    let mut a = AssocArray::<String>::builder(4)
        .release(move |e: Entry<String>| sink.borrow_mut().push(e.data().clone()))
        .build()
        .unwrap();

    a.add_replace("X".to_string(), b"k").unwrap();
    a.add_replace("Y".to_string(), b"k").unwrap();
    assert_eq!(a.len(), 1);
    assert_eq!(a.get_by_key(b"k").map(|e| e.data().as_str()), Some("Y"));
    assert_eq!(*released.borrow(), vec!["X".to_string()]);

    drop(a);
    assert_eq!(*released.borrow(), vec!["X".to_string(), "Y".to_string()]);
}

/// Invariant: colliding keys stay individually addressable.
#[test]
fn colliding_keys_resolve_by_bytes() {
    assert_eq!(time33_bucket(b"c", 2), time33_bucket(b"k", 2));
    let mut a = AssocArray::new(2).unwrap();
    a.add("C", b"c").unwrap();
    a.add("K", b"k").unwrap();
    assert_eq!(a.get_by_key(b"c").map(|e| *e.data()), Some("C"));
    assert_eq!(a.get_by_key(b"k").map(|e| *e.data()), Some("K"));
    assert_eq!(a.collision_stats().longest_chain, 2);
    assert_eq!(a.collision_percent(), 50);

    assert_eq!(a.del(b"k"), Status::Removed);
    assert_eq!(a.get_by_key(b"c").map(|e| *e.data()), Some("C"));
    assert_eq!(a.collision_percent(), 0);
}

#[derive(Debug)]
struct MacNode {
    ip: u32,
    mac: [u8; 6],
    hostname: String,
}

fn mac_key(n: &MacNode) -> &[u8] {
    &n.mac
}

/// Invariant: an entry can key itself on a field of its own data, so the
/// key is never copied and releasing the entry frees the data only once.
#[test]
fn embedded_mac_key_table() {
    const FULL: usize = 512;
    const HALF: usize = FULL / 2;
    let released = Rc::new(Cell::new(0));
    let counter = released.clone();

    let mut a = AssocArray::<MacNode>::builder(FULL.ilog2())
        .populate(
            |node: MacNode, key: &[u8]| -> Result<Entry<MacNode>, Rejected<MacNode>> {
                debug_assert_eq!(key, &node.mac[..]);
                Entry::embedded(node, mac_key)
            },
        )
        .release(move |e: Entry<MacNode>| {
            assert!(e.is_key_embedded());
            counter.set(counter.get() + 1);
        })
        .build()
        .unwrap();

    for (i, r) in lcg(7).take(HALF).enumerate() {
        let mut mac = [0u8; 6];
        mac[..4].copy_from_slice(&(r as u32).to_be_bytes());
        mac[4..].copy_from_slice(&(i as u16).to_be_bytes());
        let node = MacNode {
            ip: (r >> 32) as u32,
            mac,
            hostname: format!("hostname{i}"),
        };
        a.add_replace(node, &mac).unwrap();
        assert_eq!(a.len(), i + 1);
    }

    let last = a.get_last().expect("non-empty");
    assert_eq!(last.data().hostname, format!("hostname{}", HALF - 1));
    assert_eq!(last.key(), &last.data().mac[..]);
    assert_eq!(last.key_size(), 6);

    let new_node = MacNode {
        ip: 0x0a00_0001,
        mac: [0xde, 0xad, 0xbe, 0xef, 0xff, 0xff],
        hostname: "new hostname".into(),
    };
    let mac = new_node.mac;
    a.add(new_node, &mac).unwrap();
    assert_eq!(a.get_by_key(&mac).map(|e| e.data().ip), Some(0x0a00_0001));
    assert_eq!(a.del_last(), Status::Removed);
    assert_eq!(a.len(), HALF);
    assert!(a.get_by_key(&mac).is_none());
    assert_eq!(released.get(), 1);

    a.destroy();
    assert_eq!(released.get(), HALF + 1);
}

/// Grants a fixed number of allocations, then refuses everything.
struct FailAfter {
    left: Cell<usize>,
    refused: Rc<Cell<usize>>,
}

impl Allocator for FailAfter {
    fn try_allocate(&self, site: AllocSite, _bytes: usize) -> Result<(), AllocError> {
        match self.left.get() {
            0 => {
                self.refused.set(self.refused.get() + 1);
                Err(AllocError::Refused(site))
            }
            n => {
                self.left.set(n - 1);
                Ok(())
            }
        }
    }
}

/// Invariant: failing the n-th allocation, for every n, never loses data
/// and never leaves a half-registered entry behind.
#[test]
fn fault_injection_sweep() {
    let token = Rc::new(());
    // create: container, table, buckets; each add: entry, key.
    let full_run = 3 + 2 * 4;
    for budget in 0..=full_run {
        let refused = Rc::new(Cell::new(0));
        let built = AssocArray::<Rc<()>>::builder(2)
            .allocator(FailAfter {
                left: Cell::new(budget),
                refused: refused.clone(),
            })
            .build();
        let mut a = match built {
            Ok(a) => a,
            Err(Error::Alloc(AllocError::Refused(_))) => {
                assert!(budget < 3);
                continue;
            }
            Err(e) => panic!("unexpected error: {e}"),
        };

        let mut added = 0;
        for k in [b"w", b"x", b"y", b"z"] {
            match a.add(token.clone(), k) {
                Ok(id) => {
                    added += 1;
                    assert_eq!(a.last_id(), Some(id));
                }
                Err(Rejected { error, data }) => {
                    assert!(matches!(error, Error::Alloc(AllocError::Refused(_))));
                    drop(data);
                    assert!(!a.contains_key(k));
                }
            }
            assert_eq!(a.len(), added);
            assert_eq!(Rc::strong_count(&token), 1 + added);
        }
        if budget == full_run {
            assert_eq!(added, 4);
            assert_eq!(refused.get(), 0);
        } else {
            assert!(refused.get() > 0);
        }
        drop(a);
        assert_eq!(Rc::strong_count(&token), 1);
    }
}

/// Invariant: refusing only key buffers makes every default-populated add fail.
#[test]
fn key_allocation_failure() {
    let mut a = AssocArray::<u32>::builder(3)
        .allocator(|site: AllocSite, _: usize| match site {
            AllocSite::Key => Err(AllocError::Refused(site)),
            _ => Ok(()),
        })
        .build()
        .unwrap();
    let rej = a.add_replace(9, b"key").unwrap_err();
    assert_eq!(rej.to_string(), "AssocArrayError: allocation refused for key buffer");
    assert_eq!(rej.into_data(), 9);
    assert!(a.is_empty());
}

/// Invariant: the bucket function is pluggable and lookup agrees with insert.
#[test]
fn alternative_hashers() {
    let mut oat = AssocArray::<u32>::builder(6)
        .hasher(OneAtATime)
        .build()
        .unwrap();
    let mut rnd = AssocArray::<u32>::builder(6)
        .hasher(hashbrown::hash_map::DefaultHashBuilder::default())
        .build()
        .unwrap();
    for i in 0..200u32 {
        let key = format!("host-{i:03}");
        oat.add(i, key.as_bytes()).unwrap();
        rnd.add(i, key.as_bytes()).unwrap();
    }
    for i in (0..200u32).rev() {
        let key = format!("host-{i:03}");
        assert_eq!(oat.get_by_key(key.as_bytes()).map(|e| *e.data()), Some(i));
        assert_eq!(rnd.get_by_key(key.as_bytes()).map(|e| *e.data()), Some(i));
    }
    assert_eq!(oat.collision_stats().entries, 200);
    assert_eq!(rnd.collision_stats().entries, 200);
}

/// Invariant: evicting from the front keeps a bounded LRU-style window.
#[test]
fn del_first_as_eviction() {
    const CAP: usize = 16;
    let mut a = AssocArray::new(4).unwrap();
    for i in 0..100u32 {
        if a.len() == CAP {
            assert_eq!(a.del_first(), Status::Removed);
        }
        a.add_replace(i, &i.to_be_bytes()).unwrap();
        // Touch an older key so it moves to the tail.
        if i % 10 == 0 && i >= 5 {
            let k = (i - 5).to_be_bytes();
            if let Some(v) = a.get_by_key(&k).map(|e| *e.data()) {
                a.add_replace(v, &k).unwrap();
            }
        }
    }
    assert_eq!(a.len(), CAP);
    assert_eq!(a.get_last().map(|e| *e.data()), Some(99));
    // 85 was touched at 90 and outlived the nine evictions after it.
    assert_eq!(a.iter().rev().nth(9).map(|e| *e.data()), Some(85));
    assert!(a.get_by_key(&0u32.to_be_bytes()).is_none());
    assert!(a.get_by_key(&99u32.to_be_bytes()).is_some());
}
