//! assoc-array: a fixed-bucket hash table with an insertion-ordered list
//! threaded through the same entries.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keyed lookup and oldest/newest access over one copy of the
//!   data, as a building block for address tables and LRU-style caches.
//! - Layers:
//!   - `hlist`: intrusive hash chain. Each node keeps `next` and a
//!     back-reference to the slot pointing at it, so unlinking a known
//!     node never walks the chain.
//!   - `list`: circular, sentinel-free doubly-linked list. The head only
//!     stores the first id; the first node's `prev` is the last node.
//!   - `hashtable`: 2^bits bucket heads over `hlist`. Bucket index is the
//!     masked key hash everywhere.
//!   - `AssocArray<V, S>`: one slotmap arena of nodes, each linked into a
//!     bucket chain and the ordered list at once. Public API.
//!   - `Deque<T>`: bounded ring/stack on `list` alone.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` (strategies and allocator live
//!   behind `Box`/`Rc` trait objects). No locking, no atomics.
//! - Bucket count is fixed at construction; the table never resizes.
//! - Keys are byte strings of at most 255 bytes.
//! - Stable, generational `EntryId`s; a stale id never aliases a newer
//!   entry that reuses the same arena slot.
//!
//! Lifecycle strategies
//! - `Populate` builds an `Entry` from caller data and key bytes. The
//!   default copies the key; a custom strategy may read the key out of the
//!   data instead (`Entry::embedded`), so nothing is duplicated.
//! - `Release` is the entry destructor. It runs exactly once per entry, on
//!   `del*`, `retain`, `clear`, and on drop, always after the entry has
//!   left both the chain and the list.
//!
//! Insertion policies
//! - `add` permits duplicate keys; lookup returns the newest entry in the
//!   key's bucket chain.
//! - `add_replace` deletes any existing entry for the key and adds a fresh
//!   one at the tail. It is not an in-place update.
//!
//! Results
//! - Inserts return `Result<EntryId, Rejected<V>>`; the data is handed
//!   back on failure since ownership only moves on success.
//! - Removals return `Status::{Removed, NotFound}`. Not-found is not an
//!   error.
//!
//! Allocation
//! - Every allocation site is announced to an injectable `Allocator`
//!   first, which lets tests simulate allocation failure per site.

mod assoc_array;
mod collision;
pub mod deque;
mod entry;
mod error;
pub mod hash;
mod hashtable;
mod hlist;
mod list;
pub mod mem;

mod assoc_array_proptest;

// Public surface
pub use assoc_array::{AssocArray, Builder, EntryId, Iter, Status};
pub use collision::CollisionStats;
pub use deque::Deque;
pub use entry::{CopyKey, DropEntry, Entry, EntryKey, Populate, Release, MAX_KEY_SIZE};
pub use error::{Error, Rejected, Result};
pub use hash::{OneAtATime, Time33};
pub use mem::{AllocError, AllocSite, Allocator, SystemAllocator};
