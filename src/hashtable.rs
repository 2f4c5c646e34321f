//! Fixed-size chained hash table: 2^bits bucket heads over `hlist`.
//!
//! The table never hashes anything itself. Callers pass the key hash in;
//! the bucket is always `hash & (2^bits - 1)` so insert and lookup agree.

use crate::hlist::{self, ChainIter, HHead, HLinks};
use crate::mem::{AllocError, AllocSite, Allocator};
use core::mem::size_of;

#[derive(Debug)]
pub(crate) struct HashTable<I> {
    buckets: Vec<HHead<I>>,
    bits: u32,
}

impl<I> HashTable<I>
where
    I: Copy + Eq,
{
    /// Allocate 2^bits empty buckets. Nothing is retained on failure.
    pub(crate) fn create(bits: u32, alloc: &dyn Allocator) -> Result<Self, AllocError> {
        alloc.try_allocate(AllocSite::Table, size_of::<Self>())?;

        let count = 1usize
            .checked_shl(bits)
            .ok_or(AllocError::CapacityOverflow)?;
        let bytes = count
            .checked_mul(size_of::<HHead<I>>())
            .ok_or(AllocError::CapacityOverflow)?;
        alloc.try_allocate(AllocSite::Buckets, bytes)?;

        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(count)
            .map_err(AllocError::Exhausted)?;
        buckets.resize_with(count, HHead::new);

        Ok(Self { buckets, bits })
    }

    #[inline]
    pub(crate) fn bits(&self) -> u32 {
        self.bits
    }

    #[inline]
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn bucket_of(&self, hash: u64) -> usize {
        (hash as usize) & (self.buckets.len() - 1)
    }

    pub(crate) fn add<N>(&mut self, nodes: &mut N, id: I, hash: u64)
    where
        N: HLinks<I> + ?Sized,
    {
        let bkt = self.bucket_of(hash);
        hlist::add_head(&mut self.buckets, nodes, bkt, id);
    }

    pub(crate) fn del<N>(&mut self, nodes: &mut N, id: I)
    where
        N: HLinks<I> + ?Sized,
    {
        hlist::del(&mut self.buckets, nodes, id);
    }

    /// Every node that could match `hash`, most recently added first.
    pub(crate) fn possible<'a, N>(&self, nodes: &'a N, hash: u64) -> ChainIter<'a, I, N>
    where
        N: HLinks<I> + ?Sized,
    {
        self.chain(nodes, self.bucket_of(hash))
    }

    pub(crate) fn chain<'a, N>(&self, nodes: &'a N, bkt: usize) -> ChainIter<'a, I, N>
    where
        N: HLinks<I> + ?Sized,
    {
        ChainIter::new(nodes, &self.buckets[bkt])
    }

    pub(crate) fn is_bucket_empty(&self, bkt: usize) -> bool {
        self.buckets[bkt].is_empty()
    }

    /// Unlink every node, bucket by bucket, handing each to `release`.
    /// `release` may free the node; its successor was captured first.
    pub(crate) fn clear<N, F>(&mut self, nodes: &mut N, mut release: F)
    where
        N: HLinks<I> + ?Sized,
        F: FnMut(&mut N, I),
    {
        for bkt in 0..self.buckets.len() {
            let mut cur = hlist::first(&self.buckets[bkt]);
            while let Some(id) = cur {
                cur = hlist::next(nodes, id);
                hlist::del(&mut self.buckets, nodes, id);
                release(nodes, id);
            }
        }
    }
}
