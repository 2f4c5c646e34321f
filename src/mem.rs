//! Allocation gate injected at construction time.
//!
//! Every allocation the container performs is announced to an
//! [`Allocator`] first. The system implementation always grants; test
//! doubles refuse selected sites to simulate allocation failure without
//! touching process-wide state.

use core::fmt;

/// Place in the container that is about to allocate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AllocSite {
    /// The container struct itself.
    Container,
    /// The hash table header.
    Table,
    /// The 2^bits bucket head array.
    Buckets,
    /// One entry record.
    Entry,
    /// An owned copy of a key (default populate strategy only).
    Key,
}

impl fmt::Display for AllocSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AllocSite::Container => "container",
            AllocSite::Table => "table",
            AllocSite::Buckets => "bucket array",
            AllocSite::Entry => "entry",
            AllocSite::Key => "key buffer",
        };
        f.write_str(s)
    }
}

/// Failure to obtain memory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AllocError {
    /// The injected allocator refused the request.
    Refused(AllocSite),
    /// The requested size does not fit in `usize`.
    CapacityOverflow,
    /// The global allocator could not satisfy a reservation.
    Exhausted(std::collections::TryReserveError),
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::Refused(site) => write!(f, "allocation refused for {site}"),
            AllocError::CapacityOverflow => f.write_str("capacity overflow"),
            AllocError::Exhausted(e) => write!(f, "out of memory: {e}"),
        }
    }
}

impl std::error::Error for AllocError {}

/// Decides whether an allocation of `bytes` at `site` may proceed.
pub trait Allocator {
    fn try_allocate(&self, site: AllocSite, bytes: usize) -> Result<(), AllocError>;
}

/// Grants every request; memory comes from the global allocator.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    #[inline]
    fn try_allocate(&self, _site: AllocSite, _bytes: usize) -> Result<(), AllocError> {
        Ok(())
    }
}

impl<F> Allocator for F
where
    F: Fn(AllocSite, usize) -> Result<(), AllocError>,
{
    #[inline]
    fn try_allocate(&self, site: AllocSite, bytes: usize) -> Result<(), AllocError> {
        self(site, bytes)
    }
}
