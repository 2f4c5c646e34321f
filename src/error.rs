use crate::mem::AllocError;
use core::fmt;

/// Represents errors that can occur while building or filling an array
#[derive(Debug)]
pub enum Error {
    /// Memory for the container, table, buckets, entry or key was unavailable
    Alloc(AllocError),

    /// Keys are limited to 255 bytes (stored length is a `u8`)
    KeyTooLong(usize),

    /// The populate strategy refused the entry
    Populate,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Alloc(e) => write!(f, "AssocArrayError: {e}"),
            Error::KeyTooLong(len) => {
                write!(f, "AssocArrayError: key of {len} bytes exceeds 255")
            }
            Error::Populate => f.write_str("AssocArrayError: populate strategy failed"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Alloc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AllocError> for Error {
    fn from(value: AllocError) -> Self {
        Self::Alloc(value)
    }
}

/// Array result
pub type Result<T> = std::result::Result<T, Error>;

/// A failed insert. Ownership of `data` only moves into the array on
/// success, so the value is handed back here.
pub struct Rejected<V> {
    pub error: Error,
    pub data: V,
}

impl<V> Rejected<V> {
    pub fn new(error: Error, data: V) -> Self {
        Self { error, data }
    }

    pub fn into_data(self) -> V {
        self.data
    }
}

impl<V> fmt::Debug for Rejected<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<V> fmt::Display for Rejected<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<V> std::error::Error for Rejected<V> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
