//! Cache fingerprint and durable filter hash for leg pricing.
//!
//! Both keys must be pure, deterministic functions of their inputs: every
//! worker computes them with the same scheme, so two jobs requesting the
//! same leg under the same filters share one cache entry and one durable
//! natural key. Any divergence silently fragments the cache.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fingerprint format version. Bump to invalidate all cached prices after
/// an incompatible change to the key scheme.
const KEY_VERSION: &str = "v1";

/// Airline and connection filters a job applies to every leg search.
///
/// When `include_airlines` is non-empty the exclude list is ignored by the
/// upstream search; both still participate in the fingerprint so the cache
/// key reflects exactly what was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    pub include_airlines: Vec<String>,
    pub exclude_airlines: Vec<String>,
    pub max_connections: i16,
}

/// Cache key for one leg under one filter set.
///
/// Cabin class and baggage are fixed characteristics of the observed
/// search (economy, hand baggage only) and are baked into the key as
/// constants. Airline lists are sorted before joining so the key does not
/// depend on the order callers supply them in.
pub fn price_key(origin: &str, dest: &str, depart_date: NaiveDate, filters: &FilterSet) -> String {
    format!(
        "price:amadeus:{KEY_VERSION}:{origin}:{dest}:{depart_date}:cabin=E:conn<={}:inc={}:exc={}:bags=hand",
        filters.max_connections,
        sorted_joined(&filters.include_airlines),
        sorted_joined(&filters.exclude_airlines),
    )
}

/// Compact filter hash stored on each `priced_legs` row as part of its
/// natural key. Same ordering rules as [`price_key`].
pub fn filters_hash(filters: &FilterSet) -> String {
    format!(
        "inc={}|exc={}|conn={}",
        sorted_joined(&filters.include_airlines),
        sorted_joined(&filters.exclude_airlines),
        filters.max_connections,
    )
}

fn sorted_joined(codes: &[String]) -> String {
    let mut sorted: Vec<&str> = codes.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn filters(inc: &[&str], exc: &[&str], conn: i16) -> FilterSet {
        FilterSet {
            include_airlines: inc.iter().map(|s| s.to_string()).collect(),
            exclude_airlines: exc.iter().map(|s| s.to_string()).collect(),
            max_connections: conn,
        }
    }

    #[test]
    fn price_key_is_deterministic() {
        let f = filters(&["LH", "BA"], &[], 1);
        let a = price_key("SOF", "BCN", date("2025-01-01"), &f);
        let b = price_key("SOF", "BCN", date("2025-01-01"), &f);
        assert_eq!(a, b);
    }

    #[test]
    fn airline_order_does_not_change_the_key() {
        let a = price_key(
            "SOF",
            "BCN",
            date("2025-01-01"),
            &filters(&["LH", "BA"], &["FR", "W6"], 1),
        );
        let b = price_key(
            "SOF",
            "BCN",
            date("2025-01-01"),
            &filters(&["BA", "LH"], &["W6", "FR"], 1),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn key_distinguishes_route_date_and_filters() {
        let base = price_key("SOF", "BCN", date("2025-01-01"), &filters(&[], &[], 1));
        assert_ne!(
            base,
            price_key("SOF", "ROM", date("2025-01-01"), &filters(&[], &[], 1))
        );
        assert_ne!(
            base,
            price_key("SOF", "BCN", date("2025-01-02"), &filters(&[], &[], 1))
        );
        assert_ne!(
            base,
            price_key("SOF", "BCN", date("2025-01-01"), &filters(&[], &[], 0))
        );
        assert_ne!(
            base,
            price_key("SOF", "BCN", date("2025-01-01"), &filters(&["LH"], &[], 1))
        );
    }

    #[test]
    fn expected_key_shape() {
        let key = price_key(
            "SOF",
            "BCN",
            date("2025-01-01"),
            &filters(&["LH"], &["FR"], 1),
        );
        assert_eq!(
            key,
            "price:amadeus:v1:SOF:BCN:2025-01-01:cabin=E:conn<=1:inc=LH:exc=FR:bags=hand"
        );
    }

    #[test]
    fn filters_hash_sorts_like_the_key() {
        let a = filters_hash(&filters(&["LH", "BA"], &["FR"], 0));
        let b = filters_hash(&filters(&["BA", "LH"], &["FR"], 0));
        assert_eq!(a, b);
        assert_eq!(a, "inc=BA,LH|exc=FR|conn=0");
    }

    #[test]
    fn empty_filters_hash_is_stable() {
        assert_eq!(filters_hash(&FilterSet::default()), "inc=|exc=|conn=0");
    }
}
