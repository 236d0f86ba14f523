//! Flight-offers payload construction and response extraction.
//!
//! Pure functions, kept apart from the HTTP client so they can be tested
//! against canned JSON.

use chrono::Utc;
use loopfare_core::fingerprint::FilterSet;
use loopfare_core::types::LegQuote;
use serde_json::{json, Value};

use crate::client::{AmadeusError, LegSearchRequest};

/// Carrier restrictions for the search payload.
///
/// A non-empty include list wins: the exclude list is ignored entirely in
/// that case (the two are mutually exclusive upstream).
fn resolve_carrier_filters(filters: &FilterSet) -> (Option<&[String]>, Option<&[String]>) {
    if !filters.include_airlines.is_empty() {
        return (Some(&filters.include_airlines), None);
    }
    if !filters.exclude_airlines.is_empty() {
        return (None, Some(&filters.exclude_airlines));
    }
    (None, None)
}

/// Build the `POST /v2/shopping/flight-offers` request body for one leg.
///
/// Cabin and baggage options are fixed: economy, no checked bags.
pub fn build_search_payload(req: &LegSearchRequest) -> Value {
    let (included, excluded) = resolve_carrier_filters(&req.filters);

    let mut carrier_restrictions = serde_json::Map::new();
    if let Some(codes) = included {
        carrier_restrictions.insert("includedCarrierCodes".into(), json!(codes));
    }
    if let Some(codes) = excluded {
        carrier_restrictions.insert("excludedCarrierCodes".into(), json!(codes));
    }

    json!({
        "currencyCode": req.currency,
        "originDestinations": [{
            "id": "1",
            "originLocationCode": req.origin,
            "destinationLocationCode": req.dest,
            "departureDateTimeRange": { "date": req.depart_date.to_string() },
        }],
        "travelers": [{ "id": "1", "travelerType": "ADULT", "fareOptions": ["STANDARD"] }],
        "sources": ["GDS"],
        "searchCriteria": {
            "flightFilters": {
                "carrierRestrictions": Value::Object(carrier_restrictions),
                "connectionRestriction": {
                    "maxNumberOfConnections": req.filters.max_connections,
                },
                "cabinRestrictions": [{ "cabin": "ECONOMY", "originDestinationIds": ["1"] }],
            },
            "pricingOptions": { "includedCheckedBagsOnly": false },
        },
    })
}

/// Extract the cheapest offer from a search response body.
///
/// An empty or missing `data` array is a valid "no offer" outcome, not an
/// error. Prices are converted to integer minor units.
pub fn cheapest_quote(body: &Value, fallback_currency: &str) -> Result<LegQuote, AmadeusError> {
    let fetched_at = Utc::now();

    let offers = match body.get("data").and_then(Value::as_array) {
        Some(offers) if !offers.is_empty() => offers,
        _ => return Ok(LegQuote::no_offer(fallback_currency, fetched_at)),
    };

    let cheapest = offers
        .iter()
        .min_by(|a, b| offer_total(a).total_cmp(&offer_total(b)))
        .ok_or_else(|| AmadeusError::Malformed("empty offer list".into()))?;

    let total = cheapest
        .pointer("/price/total")
        .and_then(Value::as_str)
        .and_then(|t| t.parse::<f64>().ok())
        .ok_or_else(|| AmadeusError::Malformed("offer has no parsable price.total".into()))?;

    let offer_id = cheapest
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| AmadeusError::Malformed("offer has no id".into()))?;

    let currency = cheapest
        .pointer("/price/currency")
        .and_then(Value::as_str)
        .unwrap_or(fallback_currency);

    Ok(LegQuote {
        offer_id: Some(offer_id.to_string()),
        min_price_cents: Some((total * 100.0).round() as i64),
        currency: currency.to_string(),
        legs: cheapest
            .get("itineraries")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())),
        fetched_at,
    })
}

/// Price of an offer for comparison; offers without a parsable price sort last.
fn offer_total(offer: &Value) -> f64 {
    offer
        .pointer("/price/total")
        .and_then(Value::as_str)
        .and_then(|t| t.parse::<f64>().ok())
        .unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request(inc: &[&str], exc: &[&str]) -> LegSearchRequest {
        LegSearchRequest {
            origin: "SOF".into(),
            dest: "BCN".into(),
            depart_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            currency: "EUR".into(),
            filters: FilterSet {
                include_airlines: inc.iter().map(|s| s.to_string()).collect(),
                exclude_airlines: exc.iter().map(|s| s.to_string()).collect(),
                max_connections: 1,
            },
        }
    }

    #[test]
    fn include_list_wins_over_exclude() {
        let payload = build_search_payload(&request(&["LH"], &["FR"]));
        let carriers = payload
            .pointer("/searchCriteria/flightFilters/carrierRestrictions")
            .unwrap();
        assert_eq!(carriers["includedCarrierCodes"], json!(["LH"]));
        assert!(carriers.get("excludedCarrierCodes").is_none());
    }

    #[test]
    fn exclude_list_applies_when_include_is_empty() {
        let payload = build_search_payload(&request(&[], &["FR", "W6"]));
        let carriers = payload
            .pointer("/searchCriteria/flightFilters/carrierRestrictions")
            .unwrap();
        assert!(carriers.get("includedCarrierCodes").is_none());
        assert_eq!(carriers["excludedCarrierCodes"], json!(["FR", "W6"]));
    }

    #[test]
    fn no_filters_yields_empty_restrictions() {
        let payload = build_search_payload(&request(&[], &[]));
        let carriers = payload
            .pointer("/searchCriteria/flightFilters/carrierRestrictions")
            .unwrap();
        assert_eq!(carriers, &json!({}));
    }

    #[test]
    fn payload_carries_route_and_date() {
        let payload = build_search_payload(&request(&[], &[]));
        assert_eq!(
            payload.pointer("/originDestinations/0/originLocationCode"),
            Some(&json!("SOF"))
        );
        assert_eq!(
            payload.pointer("/originDestinations/0/departureDateTimeRange/date"),
            Some(&json!("2025-01-01"))
        );
    }

    #[test]
    fn empty_data_is_a_valid_null_quote() {
        let quote = cheapest_quote(&json!({ "data": [] }), "EUR").unwrap();
        assert_eq!(quote.offer_id, None);
        assert_eq!(quote.min_price_cents, None);
        assert_eq!(quote.currency, "EUR");
    }

    #[test]
    fn picks_the_cheapest_offer() {
        let body = json!({
            "data": [
                { "id": "a", "price": { "total": "120.00", "currency": "EUR" }, "itineraries": [] },
                { "id": "b", "price": { "total": "99.99", "currency": "EUR" }, "itineraries": [] },
                { "id": "c", "price": { "total": "150.50", "currency": "EUR" }, "itineraries": [] },
            ]
        });
        let quote = cheapest_quote(&body, "EUR").unwrap();
        assert_eq!(quote.offer_id.as_deref(), Some("b"));
        assert_eq!(quote.min_price_cents, Some(9999));
    }

    #[test]
    fn prices_round_to_minor_units() {
        let body = json!({
            "data": [{ "id": "a", "price": { "total": "123.456", "currency": "USD" } }]
        });
        let quote = cheapest_quote(&body, "EUR").unwrap();
        assert_eq!(quote.min_price_cents, Some(12346));
        assert_eq!(quote.currency, "USD");
    }

    #[test]
    fn missing_price_is_malformed() {
        let body = json!({ "data": [{ "id": "a" }] });
        assert!(cheapest_quote(&body, "EUR").is_err());
    }
}
