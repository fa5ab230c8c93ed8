//! Hash functions shared by the shard tables and the ring.
//!
//! Two mixing functions back every hash in the crate. The ring places replica
//! labels with [`server_hash`] and routes keys with [`key_hash`]; the shard
//! tables use the same functions through their [`KeyStrategy`] impls.
//!
//! [`KeyStrategy`]: crate::table::KeyStrategy

/// Seed of the multiplicative string hash.
const STRING_SEED: u32 = 5381;

/// Multiplier of the integer avalanche mix.
const INT_MIX: u32 = 0x45d9f3b;

/// Integer avalanche mix: two xor-shift-multiply rounds and a final xor-shift.
///
/// The mix is a bijection on `u32`, so distinct labels never share a hash.
#[inline]
pub fn int_hash(mut x: u32) -> u32 {
    x = ((x >> 16) ^ x).wrapping_mul(INT_MIX);
    x = ((x >> 16) ^ x).wrapping_mul(INT_MIX);
    (x >> 16) ^ x
}

/// djb2 string hash: `hash = hash * 33 + byte` over every byte, seeded with 5381.
#[inline]
pub fn string_hash(bytes: &[u8]) -> u32 {
    bytes.iter().fold(STRING_SEED, |hash, &b| {
        (hash << 5).wrapping_add(hash).wrapping_add(u32::from(b))
    })
}

/// Position of a replica label on the ring.
#[inline]
pub fn server_hash(label: u32) -> u32 {
    int_hash(label)
}

/// Position of a key on the ring.
#[inline]
pub fn key_hash(key: &str) -> u32 {
    string_hash(key.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_hash_known_values() {
        assert_eq!(int_hash(0), 0);
        assert_eq!(int_hash(1), 824_515_495);
        assert_eq!(int_hash(100_000), 395_114_966);
        assert_eq!(int_hash(200_000), 248_283_326);
    }

    #[test]
    fn test_string_hash_known_values() {
        assert_eq!(string_hash(b""), 5381);
        assert_eq!(string_hash(b"a"), 177_670);
        assert_eq!(string_hash(b"abc"), 193_485_963);
        // Wraps past u32::MAX.
        assert_eq!(string_hash(b"hello world"), 894_552_257);
    }

    #[test]
    fn test_ring_hashes_delegate() {
        assert_eq!(server_hash(7), int_hash(7));
        assert_eq!(key_hash("key"), string_hash(b"key"));
    }
}
