//! Byte-string hashers used to pick a bucket.
//!
//! Keys are fed to the hasher with a single `Hasher::write` of the raw key
//! bytes, so any [`BuildHasher`] works; the two here are cheap and
//! deterministic, which keeps bucket placement reproducible across runs.

use core::hash::{BuildHasher, Hasher};

const TIME33_SEED: i32 = 5381;

/// DJB "times 33 with addition".
#[derive(Copy, Clone, Debug, Default)]
pub struct Time33;

#[derive(Copy, Clone, Debug)]
pub struct Time33Hasher {
    hash: i32,
}

impl Default for Time33Hasher {
    fn default() -> Self {
        Self { hash: TIME33_SEED }
    }
}

impl Hasher for Time33Hasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        let mut h = self.hash;
        for &b in bytes {
            // Bytes are sign-extended, matching a signed `char` walk.
            h = (h << 5).wrapping_add(h).wrapping_add(b as i8 as i32);
        }
        self.hash = h;
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hash as u32 as u64
    }
}

impl BuildHasher for Time33 {
    type Hasher = Time33Hasher;

    #[inline]
    fn build_hasher(&self) -> Time33Hasher {
        Time33Hasher::default()
    }
}

/// Jenkins one-at-a-time on a signed 32-bit state: right shifts are
/// arithmetic, so they drag the sign bit in once the state goes negative.
#[derive(Copy, Clone, Debug, Default)]
pub struct OneAtATime;

#[derive(Copy, Clone, Debug, Default)]
pub struct OneAtATimeHasher {
    hash: i32,
}

impl Hasher for OneAtATimeHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        let mut h = self.hash;
        for &b in bytes {
            // Bytes are added unsigned here, unlike Time33.
            h = h.wrapping_add(i32::from(b));
            h = h.wrapping_add(h << 10);
            h ^= h >> 6;
        }
        self.hash = h;
    }

    #[inline]
    fn finish(&self) -> u64 {
        let mut h = self.hash;
        h = h.wrapping_add(h << 3);
        h ^= h >> 11;
        h = h.wrapping_add(h << 15);
        h as u32 as u64
    }
}

impl BuildHasher for OneAtATime {
    type Hasher = OneAtATimeHasher;

    #[inline]
    fn build_hasher(&self) -> OneAtATimeHasher {
        OneAtATimeHasher::default()
    }
}

/// Hash raw key bytes with `S` without the slice length prefix that
/// `<[u8] as Hash>` would add.
#[inline]
pub(crate) fn hash_key<S: BuildHasher>(s: &S, key: &[u8]) -> u64 {
    let mut h = s.build_hasher();
    h.write(key);
    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time33_reference(key: &[u8]) -> u32 {
        let mut h: u32 = 5381;
        for &b in key {
            h = h.wrapping_mul(33).wrapping_add(b as i8 as i32 as u32);
        }
        h
    }

    #[test]
    fn empty_key_is_seed() {
        assert_eq!(hash_key(&Time33, b""), 5381);
    }

    #[test]
    fn time33_matches_multiply_form() {
        for key in [&b"a"[..], b"test_key", b"another_test_key", b"\xff\x80\x7f"] {
            assert_eq!(hash_key(&Time33, key), time33_reference(key) as u64);
        }
    }

    /// Chunked writes produce the same hash as one write.
    #[test]
    fn time33_streams() {
        let mut h = Time33.build_hasher();
        h.write(b"key_");
        h.write(b"12");
        assert_eq!(h.finish(), hash_key(&Time33, b"key_12"));
    }

    #[test]
    fn one_at_a_time_known_value() {
        // "a": 0x61 -> well known one-at-a-time result.
        assert_eq!(hash_key(&OneAtATime, b"a"), 0xca2e9442);
        assert_ne!(hash_key(&OneAtATime, b"ab"), hash_key(&OneAtATime, b"ba"));
    }

    /// Invariant: once the state goes negative, right shifts carry the sign
    /// bit, which moves the result away from the unsigned variant.
    #[test]
    fn one_at_a_time_shifts_are_signed() {
        assert_eq!(hash_key(&OneAtATime, b"hello"), 0xb4f47a1b);
        assert_eq!(hash_key(&OneAtATime, b"key_1"), 0x5172dea1);
        assert_eq!(hash_key(&OneAtATime, b"\xff\xff\xff\xff"), 0x96e256bc);
        // Short keys never reach the sign bit and agree with the unsigned form.
        assert_eq!(hash_key(&OneAtATime, b"abc"), 0xed131f5b);
    }
}
