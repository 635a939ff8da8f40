//! Order identifiers

use std::fmt;

use jiff::Timestamp;
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

const PREFIX: &str = "ORD";
const SUFFIX_LEN: usize = 10;
const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Human-facing order identifier, e.g. `ORD-1700000000000-7Q2K9XW4LA`.
///
/// The millisecond part is zero-padded to 13 digits, so lexical order follows
/// creation order at millisecond resolution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Generates a fresh id for an order created at `now`.
    pub fn generate(now: Timestamp, rng: &mut impl Rng) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .filter_map(|_| SUFFIX_CHARSET.choose(rng))
            .map(|byte| char::from(*byte))
            .collect();

        Self(format!(
            "{PREFIX}-{millis:013}-{suffix}",
            millis = now.as_millisecond().max(0)
        ))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use rustc_hash::FxHashSet;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn format_is_prefix_millis_suffix() -> TestResult {
        let now = Timestamp::from_millisecond(1_700_000_000_123)?;
        let id = OrderId::generate(now, &mut StdRng::seed_from_u64(1));

        let parts: Vec<_> = id.as_str().split('-').collect();

        assert_eq!(parts.len(), 3, "id {id}");
        assert_eq!(parts.first().copied(), Some("ORD"));
        assert_eq!(parts.get(1).copied(), Some("1700000000123"));

        let suffix = parts.get(2).copied().unwrap_or_default();

        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
            "suffix {suffix}"
        );

        Ok(())
    }

    #[test]
    fn early_timestamps_are_zero_padded() -> TestResult {
        let now = Timestamp::from_millisecond(42)?;
        let id = OrderId::generate(now, &mut StdRng::seed_from_u64(1));

        assert!(id.as_str().starts_with("ORD-0000000000042-"), "id {id}");

        Ok(())
    }

    #[test]
    fn ids_within_one_millisecond_are_unique() -> TestResult {
        let now = Timestamp::from_millisecond(1_700_000_000_000)?;
        let mut rng = StdRng::seed_from_u64(99);

        let ids: FxHashSet<_> = (0..10_000)
            .map(|_| OrderId::generate(now, &mut rng))
            .collect();

        assert_eq!(ids.len(), 10_000);

        Ok(())
    }

    #[test]
    fn lexical_order_follows_time() -> TestResult {
        let mut rng = StdRng::seed_from_u64(3);
        let earlier = OrderId::generate(Timestamp::from_millisecond(999_999_999_999)?, &mut rng);
        let later = OrderId::generate(Timestamp::from_millisecond(1_000_000_000_000)?, &mut rng);

        assert!(earlier < later, "{earlier} should sort before {later}");

        Ok(())
    }
}
