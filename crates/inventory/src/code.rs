//! Fallback identifiers for products registered without a supplier code.

use rand::Rng;

use stockroom_core::ProductCode;

/// Prefix of every generated identifier.
pub const FALLBACK_PREFIX: &str = "INT-";

const RANDOM_ATTEMPTS: usize = 32;

/// Generate an identifier not accepted by `is_taken`.
///
/// Tries `INT-<10000..=99999>` first; once the random space looks crowded it
/// switches to `INT-<now_millis>`, counting upward until a free value is found.
pub fn fallback_code<R, F>(rng: &mut R, now_millis: i64, is_taken: F) -> ProductCode
where
    R: Rng + ?Sized,
    F: Fn(&str) -> bool,
{
    let free = |candidate: String| {
        if is_taken(&candidate) {
            None
        } else {
            ProductCode::parse(&candidate)
        }
    };

    for _ in 0..RANDOM_ATTEMPTS {
        if let Some(code) = free(format!("{FALLBACK_PREFIX}{}", rng.gen_range(10_000..=99_999u32))) {
            return code;
        }
    }

    let mut suffix = now_millis.max(100_000);
    loop {
        if let Some(code) = free(format!("{FALLBACK_PREFIX}{suffix}")) {
            return code;
        }
        suffix = suffix.saturating_add(1);
    }
}

/// Whether `code` has the shape of a generated identifier.
pub fn is_fallback_code(code: &str) -> bool {
    code.strip_prefix(FALLBACK_PREFIX)
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
