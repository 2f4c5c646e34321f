//! AssocArray: keyed lookup plus insertion order over one arena.
//!
//! Every entry is a single arena node linked into exactly one bucket chain
//! and exactly one position of the ordered list. Each mutating method
//! updates both link sets before returning, and the release strategy only
//! ever sees entries that are already unlinked from both.

use crate::entry::{CopyKey, DropEntry, Entry, Populate, Release, MAX_KEY_SIZE};
use crate::error::{Error, Rejected, Result};
use crate::hash::{hash_key, Time33};
use crate::hashtable::HashTable;
use crate::hlist::{HLinks, HNode};
use crate::list::{ListHead, ListIter, ListLink, ListLinks};
use crate::mem::{AllocSite, Allocator, SystemAllocator};
use core::fmt;
use core::hash::BuildHasher;
use core::mem::size_of;
use slotmap::{DefaultKey, SlotMap};
use std::rc::Rc;

/// Stable, generational reference to a live entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EntryId(DefaultKey);

/// Outcome of a removal. Errors are reported separately through `Result`,
/// so together the surface keeps success, not-found and failure distinct.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
    Removed,
    NotFound,
}

impl Status {
    pub fn is_removed(self) -> bool {
        self == Status::Removed
    }
}

struct Node<V> {
    hnode: HNode<DefaultKey>,
    lnode: ListLink<DefaultKey>,
    entry: Entry<V>,
}

pub(crate) struct Nodes<V>(SlotMap<DefaultKey, Node<V>>);

impl<V> HLinks<DefaultKey> for Nodes<V> {
    #[inline]
    fn hnode(&self, id: DefaultKey) -> &HNode<DefaultKey> {
        &self.0[id].hnode
    }
    #[inline]
    fn hnode_mut(&mut self, id: DefaultKey) -> &mut HNode<DefaultKey> {
        &mut self.0[id].hnode
    }
}

impl<V> ListLinks<DefaultKey> for Nodes<V> {
    #[inline]
    fn link(&self, id: DefaultKey) -> &ListLink<DefaultKey> {
        &self.0[id].lnode
    }
    #[inline]
    fn link_mut(&mut self, id: DefaultKey) -> &mut ListLink<DefaultKey> {
        &mut self.0[id].lnode
    }
}

/// Construction options for [`AssocArray`].
pub struct Builder<V, S = Time33> {
    bits: u32,
    populate: Box<dyn Populate<V>>,
    release: Box<dyn Release<V>>,
    hasher: S,
    alloc: Rc<dyn Allocator>,
}

impl<V> Builder<V> {
    /// 2^`bits` buckets with the default strategies.
    pub fn new(bits: u32) -> Self {
        Self {
            bits,
            populate: Box::new(CopyKey),
            release: Box::new(DropEntry),
            hasher: Time33,
            alloc: Rc::new(SystemAllocator),
        }
    }
}

impl<V, S> Builder<V, S>
where
    S: BuildHasher,
{
    pub fn populate<P>(mut self, populate: P) -> Self
    where
        P: Populate<V> + 'static,
    {
        self.populate = Box::new(populate);
        self
    }

    pub fn release<R>(mut self, release: R) -> Self
    where
        R: Release<V> + 'static,
    {
        self.release = Box::new(release);
        self
    }

    pub fn hasher<S2: BuildHasher>(self, hasher: S2) -> Builder<V, S2> {
        Builder {
            bits: self.bits,
            populate: self.populate,
            release: self.release,
            hasher,
            alloc: self.alloc,
        }
    }

    pub fn allocator<A>(mut self, alloc: A) -> Self
    where
        A: Allocator + 'static,
    {
        self.alloc = Rc::new(alloc);
        self
    }

    /// Allocate the container and its bucket array. Either stage failing
    /// leaves nothing behind.
    pub fn build(self) -> Result<AssocArray<V, S>> {
        self.alloc
            .try_allocate(AllocSite::Container, size_of::<AssocArray<V, S>>())?;
        let table = HashTable::create(self.bits, &*self.alloc)?;
        log::debug!(
            "Created assoc array with {} buckets ({} bits)",
            table.bucket_count(),
            self.bits
        );
        Ok(AssocArray {
            table,
            nodes: Nodes(SlotMap::with_key()),
            order: ListHead::new(),
            hasher: self.hasher,
            populate: self.populate,
            release: self.release,
            alloc: self.alloc,
        })
    }
}

/// Fixed-bucket hash table with an insertion-ordered list threaded through
/// the same entries.
///
/// Not thread-safe; the array is `!Send` and `!Sync`.
pub struct AssocArray<V, S = Time33> {
    pub(crate) table: HashTable<DefaultKey>,
    pub(crate) nodes: Nodes<V>,
    order: ListHead<DefaultKey>,
    hasher: S,
    populate: Box<dyn Populate<V>>,
    release: Box<dyn Release<V>>,
    alloc: Rc<dyn Allocator>,
}

impl<V> AssocArray<V> {
    /// 2^`bits` buckets, default strategies and hasher.
    pub fn new(bits: u32) -> Result<Self> {
        Builder::new(bits).build()
    }

    pub fn builder(bits: u32) -> Builder<V> {
        Builder::new(bits)
    }
}

impl<V, S> AssocArray<V, S> {
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.0.is_empty()
    }

    #[inline]
    pub fn bits(&self) -> u32 {
        self.table.bits()
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry<V>> {
        self.nodes.0.get(id.0).map(|n| &n.entry)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.nodes.0.contains_key(id.0)
    }

    pub fn first_id(&self) -> Option<EntryId> {
        self.order.first().map(EntryId)
    }

    pub fn last_id(&self) -> Option<EntryId> {
        self.order.last(&self.nodes).map(EntryId)
    }

    /// Oldest entry in list order, without removing it.
    pub fn get_first(&self) -> Option<&Entry<V>> {
        self.first_id().and_then(|id| self.get(id))
    }

    /// Newest entry in list order, without removing it.
    pub fn get_last(&self) -> Option<&Entry<V>> {
        self.last_id().and_then(|id| self.get(id))
    }

    /// Remove and release the entry behind `id`.
    pub fn del_entry(&mut self, id: EntryId) -> Status {
        match self.unlink(id.0) {
            Some(entry) => {
                self.release.release(entry);
                Status::Removed
            }
            None => Status::NotFound,
        }
    }

    pub fn del_first(&mut self) -> Status {
        match self.first_id() {
            Some(id) => self.del_entry(id),
            None => Status::NotFound,
        }
    }

    pub fn del_last(&mut self) -> Status {
        match self.last_id() {
            Some(id) => self.del_entry(id),
            None => Status::NotFound,
        }
    }

    /// Entries in list order: oldest first, re-added entries at the back.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            nodes: &self.nodes,
            it: self.order.iter(&self.nodes),
        }
    }

    /// Keep only entries for which `keep` returns true; the rest are
    /// released in list order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Entry<V>) -> bool,
    {
        let mut cur = self.order.first();
        while let Some(id) = cur {
            cur = self.order.next(&self.nodes, id);
            if !keep(&self.nodes.0[id].entry) {
                let _ = self.del_entry(EntryId(id));
            }
        }
    }

    /// Release every entry, bucket by bucket. The bucket array is kept.
    pub fn clear(&mut self) {
        let order = &mut self.order;
        let release = &mut self.release;
        self.table.clear(&mut self.nodes, |nodes, id| {
            order.del(nodes, id);
            if let Some(node) = nodes.0.remove(id) {
                release.release(node.entry);
            }
        });
        debug_assert!(self.order.is_empty());
        debug_assert!(self.nodes.0.is_empty());
    }

    /// Release every entry and free the container.
    pub fn destroy(self) {
        drop(self);
    }

    fn unlink(&mut self, id: DefaultKey) -> Option<Entry<V>> {
        if !self.nodes.0.contains_key(id) {
            return None;
        }
        self.table.del(&mut self.nodes, id);
        self.order.del(&mut self.nodes, id);
        self.nodes.0.remove(id).map(|n| n.entry)
    }
}

impl<V, S> AssocArray<V, S>
where
    S: BuildHasher,
{
    /// Insert a new entry at the tail of the list. Duplicate keys are
    /// allowed; the newest one in a bucket shadows older ones on lookup.
    pub fn add(&mut self, data: V, key: &[u8]) -> core::result::Result<EntryId, Rejected<V>> {
        if key.len() > MAX_KEY_SIZE {
            return Err(Rejected::new(Error::KeyTooLong(key.len()), data));
        }
        if let Err(e) = self
            .alloc
            .try_allocate(AllocSite::Entry, size_of::<Node<V>>())
        {
            return Err(Rejected::new(e.into(), data));
        }
        let entry = self.populate.populate(&*self.alloc, data, key)?;
        debug_assert!(
            entry.key() == key,
            "populate strategy must store the caller's key"
        );

        let hash = hash_key(&self.hasher, key);
        let id = self.nodes.0.insert_with_key(|id| Node {
            hnode: HNode::unhashed(),
            lnode: ListLink::detached(id),
            entry,
        });
        self.table.add(&mut self.nodes, id, hash);
        self.order.add_tail(&mut self.nodes, id);
        Ok(EntryId(id))
    }

    /// Delete any entry with this key, then add. The new entry always
    /// lands at the tail of the list.
    pub fn add_replace(
        &mut self,
        data: V,
        key: &[u8],
    ) -> core::result::Result<EntryId, Rejected<V>> {
        if key.len() > MAX_KEY_SIZE {
            return Err(Rejected::new(Error::KeyTooLong(key.len()), data));
        }
        let _ = self.del(key);
        self.add(data, key)
    }

    /// Add `V::default()` under `key`.
    pub fn add_default(&mut self, key: &[u8]) -> core::result::Result<EntryId, Rejected<V>>
    where
        V: Default,
    {
        self.add(V::default(), key)
    }

    /// First chain match for `key`.
    pub fn find(&self, key: &[u8]) -> Option<EntryId> {
        let hash = hash_key(&self.hasher, key);
        self.table
            .possible(&self.nodes, hash)
            .find(|&id| self.nodes.0[id].entry.matches(key))
            .map(EntryId)
    }

    pub fn get_by_key(&self, key: &[u8]) -> Option<&Entry<V>> {
        self.find(key).and_then(|id| self.get(id))
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.find(key).is_some()
    }

    /// Remove and release the first entry matching `key`.
    pub fn del(&mut self, key: &[u8]) -> Status {
        match self.find(key) {
            Some(id) => self.del_entry(id),
            None => Status::NotFound,
        }
    }
}

impl<V, S> Drop for AssocArray<V, S> {
    fn drop(&mut self) {
        let n = self.len();
        self.clear();
        log::debug!(
            "Destroyed assoc array, released {n} entries from {} buckets",
            self.table.bucket_count()
        );
    }
}

impl<V: fmt::Debug, S> fmt::Debug for AssocArray<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssocArray")
            .field("bits", &self.bits())
            .field("len", &self.len())
            .field("entries", &DebugEntries(self))
            .finish()
    }
}

struct DebugEntries<'a, V, S>(&'a AssocArray<V, S>);

impl<V: fmt::Debug, S> fmt::Debug for DebugEntries<'_, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Iterator over entries in list order.
pub struct Iter<'a, V> {
    nodes: &'a Nodes<V>,
    it: ListIter<'a, DefaultKey, Nodes<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a Entry<V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        self.it.next().map(|id| &nodes.0[id].entry)
    }
}

impl<'a, V> DoubleEndedIterator for Iter<'a, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        self.it.next_back().map(|id| &nodes.0[id].entry)
    }
}

impl<'a, V, S> IntoIterator for &'a AssocArray<V, S> {
    type Item = &'a Entry<V>;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
