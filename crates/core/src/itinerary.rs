//! Itinerary construction: expand a job's city list and date window into an
//! ordered sequence of flight legs.
//!
//! The construction is deliberately not a search. Cities are visited in the
//! exact order supplied, and departure dates advance greedily by the minimum
//! stay. Trying alternative orderings or date permutations is an explicit
//! non-goal of the pipeline.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One directed flight segment of a job's itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub origin: String,
    pub dest: String,
    pub depart_date: NaiveDate,
}

/// Full stop sequence for a job: origin, the intermediate cities in order,
/// then the fixed end location or the origin again.
pub fn stop_sequence(origin: &str, cities: &[String], end_fixed: Option<&str>) -> Vec<String> {
    let mut stops = Vec::with_capacity(cities.len() + 2);
    stops.push(origin.to_string());
    stops.extend(cities.iter().cloned());
    stops.push(end_fixed.unwrap_or(origin).to_string());
    stops
}

/// Every calendar date in `[start, end]` inclusive, in order.
///
/// Empty when `start > end`.
pub fn candidate_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut d = start;
    while d <= end {
        dates.push(d);
        d = match d.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    dates
}

/// Build the ordered leg sequence for a job.
///
/// The first leg departs on the first date of the window. Each subsequent
/// leg departs at least `max(nights_min, 1)` days after the previous one,
/// snapped forward to the nearest candidate date on or after that target.
/// If advancing runs past the window, the leg is clamped to the window's
/// last date rather than pushed outside the requested window, even though
/// the spacing constraint may be violated as a result.
///
/// Produces exactly `stops - 1` legs forming a connected chain.
pub fn build_legs(
    origin: &str,
    cities: &[String],
    end_fixed: Option<&str>,
    window_start: NaiveDate,
    window_end: NaiveDate,
    nights_min: i32,
) -> Result<Vec<Leg>, CoreError> {
    let dates = candidate_dates(window_start, window_end);
    if dates.is_empty() {
        return Err(CoreError::Validation(format!(
            "Empty date window: {window_start}..{window_end}"
        )));
    }

    let stops = stop_sequence(origin, cities, end_fixed);
    let min_nights = nights_min.max(1) as u64;
    let last_date = dates[dates.len() - 1];

    let mut legs = Vec::with_capacity(stops.len() - 1);
    let mut depart = dates[0];

    for pair in stops.windows(2) {
        legs.push(Leg {
            origin: pair[0].clone(),
            dest: pair[1].clone(),
            depart_date: depart,
        });

        let target = depart
            .checked_add_days(Days::new(min_nights))
            .unwrap_or(last_date);
        depart = dates
            .iter()
            .copied()
            .find(|d| *d >= target)
            .unwrap_or(last_date);
    }

    Ok(legs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn cities(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn stop_sequence_defaults_to_returning_home() {
        let stops = stop_sequence("SOF", &cities(&["BCN", "ROM"]), None);
        assert_eq!(stops, vec!["SOF", "BCN", "ROM", "SOF"]);
    }

    #[test]
    fn stop_sequence_honors_fixed_end() {
        let stops = stop_sequence("SOF", &cities(&["BCN"]), Some("VIE"));
        assert_eq!(stops, vec!["SOF", "BCN", "VIE"]);
    }

    #[test]
    fn candidate_dates_are_inclusive() {
        let dates = candidate_dates(date("2025-01-01"), date("2025-01-03"));
        assert_eq!(
            dates,
            vec![date("2025-01-01"), date("2025-01-02"), date("2025-01-03")]
        );
    }

    #[test]
    fn inverted_window_yields_no_dates() {
        assert!(candidate_dates(date("2025-01-10"), date("2025-01-01")).is_empty());
    }

    #[test]
    fn empty_window_is_an_error() {
        let err = build_legs(
            "SOF",
            &cities(&["BCN"]),
            None,
            date("2025-01-10"),
            date("2025-01-01"),
            2,
        );
        assert!(err.is_err());
    }

    #[test]
    fn legs_form_a_connected_chain() {
        let legs = build_legs(
            "SOF",
            &cities(&["BCN", "ROM", "VIE"]),
            None,
            date("2025-03-01"),
            date("2025-03-31"),
            3,
        )
        .unwrap();

        assert_eq!(legs.len(), 4);
        assert_eq!(legs[0].origin, "SOF");
        assert_eq!(legs[legs.len() - 1].dest, "SOF");
        for pair in legs.windows(2) {
            assert_eq!(pair[0].dest, pair[1].origin);
        }
    }

    #[test]
    fn loop_through_bcn_and_rom_spaces_legs_by_min_nights() {
        let legs = build_legs(
            "SOF",
            &cities(&["BCN", "ROM"]),
            None,
            date("2025-01-01"),
            date("2025-01-10"),
            2,
        )
        .unwrap();

        assert_eq!(legs.len(), 3);
        assert_eq!(legs[0], Leg {
            origin: "SOF".into(),
            dest: "BCN".into(),
            depart_date: date("2025-01-01"),
        });
        assert_eq!(legs[1].depart_date, date("2025-01-03"));
        assert_eq!(legs[2].depart_date, date("2025-01-05"));
        for pair in legs.windows(2) {
            let gap = pair[1].depart_date - pair[0].depart_date;
            assert!(gap.num_days() >= 2);
        }
    }

    #[test]
    fn every_departure_stays_inside_the_window() {
        let start = date("2025-01-01");
        let end = date("2025-01-04");
        let legs = build_legs(
            "SOF",
            &cities(&["BCN", "ROM", "VIE", "PRG"]),
            None,
            start,
            end,
            3,
        )
        .unwrap();

        for leg in &legs {
            assert!(leg.depart_date >= start && leg.depart_date <= end);
        }
    }

    #[test]
    fn overshooting_the_window_clamps_to_its_last_date() {
        // 2-night spacing over a 3-day window: the third leg's target date
        // falls past the window and snaps back to the last day.
        let legs = build_legs(
            "SOF",
            &cities(&["BCN", "ROM"]),
            None,
            date("2025-01-01"),
            date("2025-01-03"),
            2,
        )
        .unwrap();

        assert_eq!(legs[1].depart_date, date("2025-01-03"));
        assert_eq!(legs[2].depart_date, date("2025-01-03"));
    }

    #[test]
    fn zero_min_nights_still_advances_one_day() {
        let legs = build_legs(
            "SOF",
            &cities(&["BCN"]),
            None,
            date("2025-01-01"),
            date("2025-01-05"),
            0,
        )
        .unwrap();

        assert_eq!(legs[0].depart_date, date("2025-01-01"));
        assert_eq!(legs[1].depart_date, date("2025-01-02"));
    }

    #[test]
    fn dates_are_non_decreasing() {
        let legs = build_legs(
            "SOF",
            &cities(&["BCN", "ROM", "VIE"]),
            None,
            date("2025-01-01"),
            date("2025-01-05"),
            4,
        )
        .unwrap();

        for pair in legs.windows(2) {
            assert!(pair[1].depart_date >= pair[0].depart_date);
        }
    }
}
