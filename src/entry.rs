//! Entry record and the two lifecycle strategies that create and destroy it.
//!
//! `Populate` turns caller data plus key bytes into an [`Entry`];
//! `Release` is the entry's destructor and runs exactly once per entry,
//! after the entry has been unlinked from both the bucket chain and the
//! ordered list.

use crate::error::{Error, Rejected};
use crate::mem::{AllocSite, Allocator};
use core::fmt;

/// Largest key length representable in an entry.
pub const MAX_KEY_SIZE: usize = u8::MAX as usize;

/// Where an entry's key bytes live.
pub enum EntryKey<V> {
    /// A private copy owned by the entry.
    Owned(Box<[u8]>),
    /// A field inside the data itself. Releasing the entry drops `data`
    /// once and there is no separate key buffer to free.
    Embedded(fn(&V) -> &[u8]),
}

impl<V> fmt::Debug for EntryKey<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKey::Owned(k) => f.debug_tuple("Owned").field(k).finish(),
            EntryKey::Embedded(_) => f.write_str("Embedded"),
        }
    }
}

/// One stored key/value pair.
pub struct Entry<V> {
    key: EntryKey<V>,
    key_size: u8,
    data: V,
}

impl<V> Entry<V> {
    /// Entry owning a copy of `key`.
    pub fn owned(key: Box<[u8]>, data: V) -> Result<Self, Rejected<V>> {
        let Ok(key_size) = u8::try_from(key.len()) else {
            return Err(Rejected::new(Error::KeyTooLong(key.len()), data));
        };
        Ok(Self {
            key: EntryKey::Owned(key),
            key_size,
            data,
        })
    }

    /// Entry whose key is read out of `data` by `key_of`.
    pub fn embedded(data: V, key_of: fn(&V) -> &[u8]) -> Result<Self, Rejected<V>> {
        let len = key_of(&data).len();
        let Ok(key_size) = u8::try_from(len) else {
            return Err(Rejected::new(Error::KeyTooLong(len), data));
        };
        Ok(Self {
            key: EntryKey::Embedded(key_of),
            key_size,
            data,
        })
    }

    #[inline]
    pub fn key(&self) -> &[u8] {
        match &self.key {
            EntryKey::Owned(k) => k,
            EntryKey::Embedded(key_of) => key_of(&self.data),
        }
    }

    #[inline]
    pub fn key_size(&self) -> u8 {
        self.key_size
    }

    #[inline]
    pub fn data(&self) -> &V {
        &self.data
    }

    pub fn is_key_embedded(&self) -> bool {
        matches!(self.key, EntryKey::Embedded(_))
    }

    /// Split into key storage and data.
    pub fn into_parts(self) -> (EntryKey<V>, V) {
        (self.key, self.data)
    }

    /// True when the stored key starts with `key`. Only the caller's
    /// length is compared; a probe longer than the stored key never matches.
    #[inline]
    pub(crate) fn matches(&self, key: &[u8]) -> bool {
        self.key().get(..key.len()) == Some(key)
    }
}

impl<V: fmt::Debug> fmt::Debug for Entry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key())
            .field("key_size", &self.key_size)
            .field("data", &self.data)
            .finish()
    }
}

/// Builds a new entry from caller data and key bytes.
///
/// On failure the data must be handed back inside [`Rejected`]; the array
/// then drops the half-built entry without linking it anywhere.
pub trait Populate<V> {
    fn populate(
        &mut self,
        alloc: &dyn Allocator,
        data: V,
        key: &[u8],
    ) -> Result<Entry<V>, Rejected<V>>;
}

/// Destroys an entry that has already been unlinked.
pub trait Release<V> {
    fn release(&mut self, entry: Entry<V>);
}

/// Default populate: copy the key bytes into a fresh buffer, keep `data`.
#[derive(Copy, Clone, Debug, Default)]
pub struct CopyKey;

impl<V> Populate<V> for CopyKey {
    fn populate(
        &mut self,
        alloc: &dyn Allocator,
        data: V,
        key: &[u8],
    ) -> Result<Entry<V>, Rejected<V>> {
        if let Err(e) = alloc.try_allocate(AllocSite::Key, key.len()) {
            return Err(Rejected::new(e.into(), data));
        }
        Entry::owned(key.into(), data)
    }
}

/// Default release: drop the key buffer, then the data, then the record.
#[derive(Copy, Clone, Debug, Default)]
pub struct DropEntry;

impl<V> Release<V> for DropEntry {
    fn release(&mut self, entry: Entry<V>) {
        let (key, data) = entry.into_parts();
        drop(key);
        drop(data);
    }
}

impl<V, F> Populate<V> for F
where
    F: FnMut(V, &[u8]) -> Result<Entry<V>, Rejected<V>>,
{
    #[inline]
    fn populate(
        &mut self,
        _alloc: &dyn Allocator,
        data: V,
        key: &[u8],
    ) -> Result<Entry<V>, Rejected<V>> {
        self(data, key)
    }
}

impl<V, F> Release<V> for F
where
    F: FnMut(Entry<V>),
{
    #[inline]
    fn release(&mut self, entry: Entry<V>) {
        self(entry)
    }
}
