//! Bucket occupancy diagnostics.
//!
//! Read-only walk over every chain. The first entry in a bucket is free;
//! each further entry sharing that bucket counts as one collision. Nothing
//! here feeds back into placement: the table never resizes.

use crate::assoc_array::AssocArray;

/// Snapshot of how entries are spread over the buckets.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CollisionStats {
    pub buckets: usize,
    /// Buckets holding at least one entry.
    pub occupied: usize,
    pub entries: usize,
    /// Sum over buckets of `chain length - 1`.
    pub collisions: usize,
    pub longest_chain: usize,
}

impl CollisionStats {
    /// `floor(collisions * 100 / entries)`, 0 when empty.
    pub fn percent(&self) -> usize {
        if self.entries == 0 {
            return 0;
        }
        self.collisions * 100 / self.entries
    }

    /// Entries per bucket.
    pub fn load_factor(&self) -> f64 {
        if self.buckets == 0 {
            return 0.0;
        }
        self.entries as f64 / self.buckets as f64
    }
}

impl<V, S> AssocArray<V, S> {
    pub fn collision_stats(&self) -> CollisionStats {
        let mut stats = CollisionStats {
            buckets: self.table.bucket_count(),
            ..CollisionStats::default()
        };
        for bkt in 0..stats.buckets {
            if self.table.is_bucket_empty(bkt) {
                continue;
            }
            let len = self.table.chain(&self.nodes, bkt).count();
            stats.occupied += 1;
            stats.entries += len;
            stats.collisions += len - 1;
            stats.longest_chain = stats.longest_chain.max(len);
        }
        debug_assert_eq!(stats.entries, self.len());
        stats
    }

    /// Percentage of entries that share a bucket with an earlier one.
    pub fn collision_percent(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.collision_stats().collisions * 100 / self.len()
    }
}
