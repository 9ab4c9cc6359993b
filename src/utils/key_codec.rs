//! Base-36 encoding of sequence ids into short keys.
//!
//! Keys use the alphabet `0-9a-z`, are lowercase, and carry no padding or sign.
//! Decoding is lenient about letter case, but anything that is not a plain
//! base-36 digit string yields `None` so callers can treat it as "not found".

/// Digits used by [`encode`], in value order.
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

const RADIX: u64 = 36;

/// Longest possible key: `u64::MAX` is 13 base-36 digits.
const MAX_KEY_LEN: usize = 13;

/// Encodes a sequence id as a base-36 key.
///
/// # Examples
///
/// ```
/// use seq_shortener::utils::key_codec::encode;
///
/// assert_eq!(encode(0), "0");
/// assert_eq!(encode(35), "z");
/// assert_eq!(encode(36), "10");
/// ```
pub fn encode(sequence_id: u64) -> String {
    if sequence_id == 0 {
        return "0".to_string();
    }

    let mut buf = [0u8; MAX_KEY_LEN];
    let mut pos = MAX_KEY_LEN;
    let mut n = sequence_id;

    while n > 0 {
        pos -= 1;
        buf[pos] = ALPHABET[(n % RADIX) as usize];
        n /= RADIX;
    }

    buf[pos..].iter().map(|&b| b as char).collect()
}

/// Decodes a base-36 key into a sequence id.
///
/// Returns `None` for an empty key, for any character outside `[0-9a-zA-Z]`
/// (signs and whitespace included), and for values that do not fit in a `u64`.
///
/// # Examples
///
/// ```
/// use seq_shortener::utils::key_codec::decode;
///
/// assert_eq!(decode("zz"), Some(1295));
/// assert_eq!(decode("ZZ"), Some(1295));
/// assert_eq!(decode("z-z"), None);
/// assert_eq!(decode(""), None);
/// ```
pub fn decode(key: &str) -> Option<u64> {
    if key.is_empty() {
        return None;
    }

    key.bytes().try_fold(0u64, |acc, byte| {
        let digit = digit_value(byte)?;
        acc.checked_mul(RADIX)?.checked_add(digit)
    })
}

/// Normalizes a key to the exact form [`encode`] would produce.
///
/// `"00A"` and `"a"` both canonicalize to `"a"`. Invalid keys yield `None`.
pub fn canonicalize(key: &str) -> Option<String> {
    decode(key).map(encode)
}

fn digit_value(byte: u8) -> Option<u64> {
    match byte {
        b'0'..=b'9' => Some(u64::from(byte - b'0')),
        b'a'..=b'z' => Some(u64::from(byte - b'a') + 10),
        b'A'..=b'Z' => Some(u64::from(byte - b'A') + 10),
        _ => None,
    }
}
