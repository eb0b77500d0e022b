//! MurmurHash2 over UTF-16 code units, rendered in base 36.
//!
//! Every name the atomic CSS compiler generates (class names, custom property
//! names, theme selectors, keyframe names) goes through [`hash`]. The function
//! is pure, so two workers compiling different files in parallel agree on the
//! name for equal content without sharing any state.

const M: u32 = 0x5bd1e995;
const R: u32 = 24;

/// Hash `key` with the default seed of `0`.
pub fn hash(key: &str) -> String {
  hash_with_seed(key, 0)
}

/// Hash `key` with a custom seed and return the base 36 representation.
pub fn hash_with_seed(key: &str, seed: u32) -> String {
  to_base36(murmur2(key, seed))
}

/// Raw 32-bit MurmurHash2 of `key`.
///
/// Input is consumed as UTF-16 code units truncated to their low byte, which
/// keeps names identical to the ones produced by the JavaScript runtime.
pub fn murmur2(key: &str, seed: u32) -> u32 {
  let units: Vec<u16> = key.encode_utf16().collect();
  let mut len = units.len();
  let mut h = seed ^ (len as u32);
  let mut index = 0usize;

  while len >= 4 {
    let mut k = u32::from(units[index] & 0xff)
      | (u32::from(units[index + 1] & 0xff) << 8)
      | (u32::from(units[index + 2] & 0xff) << 16)
      | (u32::from(units[index + 3] & 0xff) << 24);

    k = k.wrapping_mul(M);
    k ^= k >> R;
    k = k.wrapping_mul(M);

    h = h.wrapping_mul(M) ^ k;

    index += 4;
    len -= 4;
  }

  match len {
    3 => {
      h ^= u32::from(units[index + 2] & 0xff) << 16;
      h ^= u32::from(units[index + 1] & 0xff) << 8;
      h ^= u32::from(units[index] & 0xff);
      h = h.wrapping_mul(M);
    }
    2 => {
      h ^= u32::from(units[index + 1] & 0xff) << 8;
      h ^= u32::from(units[index] & 0xff);
      h = h.wrapping_mul(M);
    }
    1 => {
      h ^= u32::from(units[index] & 0xff);
      h = h.wrapping_mul(M);
    }
    _ => {}
  }

  h ^= h >> 13;
  h = h.wrapping_mul(M);
  h ^= h >> 15;
  h
}

fn to_base36(mut value: u32) -> String {
  const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

  if value == 0 {
    return "0".to_string();
  }

  let mut buf = [0u8; 8];
  let mut idx = buf.len();
  while value > 0 {
    idx -= 1;
    buf[idx] = DIGITS[(value % 36) as usize];
    value /= 36;
  }

  buf[idx..].iter().map(|byte| char::from(*byte)).collect()
}
