//! Short per-call trace tokens.
//!
//! Tokens correlate a log line with the live event for the same call. They
//! are random, not unique.

use rand::Rng;

/// Token length in characters.
pub const TRACE_ID_LEN: usize = 9;

/// Token alphabet: digits then lowercase ASCII letters.
pub const TRACE_ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Fresh random token of [`TRACE_ID_LEN`] characters over [`TRACE_ID_ALPHABET`].
pub fn generate_trace_id() -> String {
    generate_trace_id_with(&mut rand::thread_rng())
}

pub fn generate_trace_id_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..TRACE_ID_LEN)
        .map(|_| TRACE_ID_ALPHABET[rng.gen_range(0..TRACE_ID_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_tokens_vary() {
        let a = generate_trace_id();
        let b = generate_trace_id();
        let c = generate_trace_id();
        assert!(a != b || b != c);
    }

    proptest! {
        #[test]
        fn trace_id_shape(seed in any::<u64>()) {
            let token = generate_trace_id_with(&mut StdRng::seed_from_u64(seed));
            prop_assert_eq!(token.len(), TRACE_ID_LEN);
            prop_assert!(token.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        }
    }
}
