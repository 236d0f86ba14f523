//! Runner-level tests against in-memory fakes of the injected seams.
//!
//! Covers the terminal-status outcomes, the cache read path, and the
//! idempotence of the natural-key upserts under re-runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use loopfare_amadeus::{AmadeusError, LegSearchRequest};
use loopfare_core::fingerprint::price_key;
use loopfare_core::itinerary::build_legs;
use loopfare_core::status::JobStatus;
use loopfare_core::types::{JobId, LegQuote};
use loopfare_db::models::job::Job;
use loopfare_db::models::priced_leg::UpsertPricedLeg;
use loopfare_db::models::result::UpsertResult;
use loopfare_pipeline::deps::{LegSearch, PriceCache, PricingStore, RateLimiter};
use loopfare_pipeline::{JobRunner, LegPricer, PipelineError};
use serde_json::json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemStore {
    statuses: Mutex<Vec<JobStatus>>,
    priced_legs: Mutex<HashMap<String, UpsertPricedLeg>>,
    results: Mutex<HashMap<(JobId, i32), UpsertResult>>,
}

impl MemStore {
    fn leg_key(input: &UpsertPricedLeg) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            input.job_id, input.origin, input.dest, input.depart_date, input.filters_hash
        )
    }

    fn status_sequence(&self) -> Vec<JobStatus> {
        self.statuses.lock().unwrap().clone()
    }

    fn leg_count(&self) -> usize {
        self.priced_legs.lock().unwrap().len()
    }

    fn result_count(&self) -> usize {
        self.results.lock().unwrap().len()
    }

    fn result_for(&self, job_id: JobId) -> Option<UpsertResult> {
        self.results.lock().unwrap().get(&(job_id, 1)).cloned()
    }
}

#[async_trait]
impl PricingStore for MemStore {
    async fn find_job(&self, _id: JobId) -> Result<Option<Job>, PipelineError> {
        Ok(None)
    }

    async fn set_status(&self, _id: JobId, status: JobStatus) -> Result<(), PipelineError> {
        self.statuses.lock().unwrap().push(status);
        Ok(())
    }

    async fn upsert_priced_leg(&self, input: &UpsertPricedLeg) -> Result<(), PipelineError> {
        self.priced_legs
            .lock()
            .unwrap()
            .insert(Self::leg_key(input), input.clone());
        Ok(())
    }

    async fn upsert_result(&self, input: &UpsertResult) -> Result<(), PipelineError> {
        self.results
            .lock()
            .unwrap()
            .insert((input.job_id, input.rank), input.clone());
        Ok(())
    }
}

#[derive(Default)]
struct MemCache {
    entries: Mutex<HashMap<String, LegQuote>>,
}

#[async_trait]
impl PriceCache for MemCache {
    async fn get(&self, key: &str) -> Option<LegQuote> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    async fn put(&self, key: &str, quote: &LegQuote) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), quote.clone());
    }
}

#[derive(Default)]
struct CountingLimiter {
    acquisitions: AtomicUsize,
}

#[async_trait]
impl RateLimiter for CountingLimiter {
    async fn acquire(&self, _pool: &str, _rate_per_second: u32) {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
    }
}

/// What the fake provider should answer for a given route.
#[derive(Clone, Copy)]
enum LegOutcome {
    Price(i64),
    NoOffer,
    Fail,
}

struct ScriptedSearch {
    outcomes: HashMap<(String, String), LegOutcome>,
    calls: AtomicUsize,
}

impl ScriptedSearch {
    fn new(routes: &[(&str, &str, LegOutcome)]) -> Self {
        let outcomes = routes
            .iter()
            .map(|(o, d, outcome)| ((o.to_string(), d.to_string()), *outcome))
            .collect();
        Self {
            outcomes,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LegSearch for ScriptedSearch {
    async fn search(&self, req: &LegSearchRequest) -> Result<LegQuote, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = (req.origin.clone(), req.dest.clone());
        match self.outcomes.get(&key).expect("unscripted route") {
            LegOutcome::Price(cents) => Ok(LegQuote {
                offer_id: Some(format!("offer-{}-{}", req.origin, req.dest)),
                min_price_cents: Some(*cents),
                currency: req.currency.clone(),
                legs: json!([{ "duration": "PT2H" }]),
                fetched_at: Utc::now(),
            }),
            LegOutcome::NoOffer => Ok(LegQuote::no_offer(&req.currency, Utc::now())),
            LegOutcome::Fail => Err(PipelineError::Provider(AmadeusError::Api {
                status: 500,
                body: "upstream unavailable".into(),
            })),
        }
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    store: Arc<MemStore>,
    cache: Arc<MemCache>,
    limiter: Arc<CountingLimiter>,
    search: Arc<ScriptedSearch>,
    runner: JobRunner,
}

fn harness(routes: &[(&str, &str, LegOutcome)]) -> Harness {
    let store = Arc::new(MemStore::default());
    let cache = Arc::new(MemCache::default());
    let limiter = Arc::new(CountingLimiter::default());
    let search = Arc::new(ScriptedSearch::new(routes));

    let pricer = LegPricer::new(
        cache.clone(),
        limiter.clone(),
        search.clone(),
        store.clone(),
    );
    let runner = JobRunner::new(pricer, store.clone());

    Harness {
        store,
        cache,
        limiter,
        search,
        runner,
    }
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn sof_loop_job() -> Job {
    let now = Utc::now();
    Job {
        id: Uuid::now_v7(),
        origin: "SOF".into(),
        cities: vec!["BCN".into(), "ROM".into()],
        end_fixed: None,
        window_start: date("2025-01-01"),
        window_end: date("2025-01-10"),
        nights_min: 2,
        nights_max: 7,
        max_connections: 1,
        include_airlines: Vec::new(),
        exclude_airlines: Vec::new(),
        currency: "EUR".into(),
        status: "queued".into(),
        created_at: now,
        updated_at: now,
    }
}

const SOF_LOOP_PRICED: &[(&str, &str, LegOutcome)] = &[
    ("SOF", "BCN", LegOutcome::Price(10_000)),
    ("BCN", "ROM", LegOutcome::Price(12_000)),
    ("ROM", "SOF", LegOutcome::Price(9_000)),
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fully_priced_job_ends_done_with_exact_total() {
    let h = harness(SOF_LOOP_PRICED);
    let job = sof_loop_job();

    let status = h.runner.run(&job).await;

    assert_eq!(status, JobStatus::Done);
    assert_eq!(
        h.store.status_sequence(),
        vec![JobStatus::Running, JobStatus::Done]
    );

    let result = h.store.result_for(job.id).expect("result row");
    assert_eq!(result.total_price_cents, Some(31_000));
    assert_eq!(result.city_order, vec!["SOF", "BCN", "ROM", "SOF"]);
    assert_eq!(
        result.dates,
        vec![date("2025-01-01"), date("2025-01-03"), date("2025-01-05")]
    );
    assert_eq!(result.legs.as_array().unwrap().len(), 3);
    assert_eq!(h.store.leg_count(), 3);
}

#[tokio::test]
async fn no_offer_leg_downgrades_to_partial_keeping_other_prices() {
    let h = harness(&[
        ("SOF", "BCN", LegOutcome::Price(10_000)),
        ("BCN", "ROM", LegOutcome::NoOffer),
        ("ROM", "SOF", LegOutcome::Price(9_000)),
    ]);
    let job = sof_loop_job();

    let status = h.runner.run(&job).await;

    assert_eq!(status, JobStatus::Partial);
    let result = h.store.result_for(job.id).expect("result row");
    assert_eq!(result.total_price_cents, None);

    // Legs that did price keep their quotes in the per-leg detail.
    let detail = result.legs.as_array().unwrap();
    assert_eq!(detail.len(), 3);
    assert_eq!(detail[0]["result"]["min_price_cents"], json!(10_000));
    assert_eq!(detail[1]["result"]["min_price_cents"], json!(null));
    assert_eq!(detail[2]["result"]["min_price_cents"], json!(9_000));

    // The no-offer outcome is still a durable pricing record.
    assert_eq!(h.store.leg_count(), 3);
}

#[tokio::test]
async fn provider_failure_ends_error_with_no_result_row() {
    let h = harness(&[
        ("SOF", "BCN", LegOutcome::Price(10_000)),
        ("BCN", "ROM", LegOutcome::Fail),
        ("ROM", "SOF", LegOutcome::Price(9_000)),
    ]);
    let job = sof_loop_job();

    let status = h.runner.run(&job).await;

    assert_eq!(status, JobStatus::Error);
    assert_eq!(
        h.store.status_sequence(),
        vec![JobStatus::Running, JobStatus::Error]
    );
    assert_eq!(h.store.result_count(), 0);

    // The first leg was priced before the failure and its record survives.
    assert_eq!(h.store.leg_count(), 1);
    // The third leg was never attempted.
    assert_eq!(h.search.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_date_window_is_a_job_error() {
    let h = harness(&[]);
    let mut job = sof_loop_job();
    job.window_start = date("2025-01-10");
    job.window_end = date("2025-01-01");

    let status = h.runner.run(&job).await;

    assert_eq!(status, JobStatus::Error);
    assert_eq!(h.store.result_count(), 0);
    assert_eq!(h.search.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cache_hits_skip_limiter_provider_and_durable_writes() {
    let h = harness(&[]);
    let job = sof_loop_job();

    // Warm the cache for every leg the job will request.
    let filters = job.filter_set();
    let legs = build_legs(
        &job.origin,
        &job.cities,
        None,
        job.window_start,
        job.window_end,
        job.nights_min,
    )
    .unwrap();
    for leg in &legs {
        let key = price_key(&leg.origin, &leg.dest, leg.depart_date, &filters);
        let quote = LegQuote {
            offer_id: Some("cached".into()),
            min_price_cents: Some(5_000),
            currency: "EUR".into(),
            legs: json!([]),
            fetched_at: Utc::now(),
        };
        h.cache.put(&key, &quote).await;
    }

    let status = h.runner.run(&job).await;

    assert_eq!(status, JobStatus::Done);
    assert_eq!(h.store.result_for(job.id).unwrap().total_price_cents, Some(15_000));
    // Pure read path: nothing acquired, nothing searched, nothing written.
    assert_eq!(h.limiter.acquisitions.load(Ordering::SeqCst), 0);
    assert_eq!(h.search.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.store.leg_count(), 0);
}

#[tokio::test]
async fn rerunning_a_job_reuses_the_cache_and_upserts_single_rows() {
    let h = harness(SOF_LOOP_PRICED);
    let job = sof_loop_job();

    assert_eq!(h.runner.run(&job).await, JobStatus::Done);
    assert_eq!(h.limiter.acquisitions.load(Ordering::SeqCst), 3);

    // Second run: every leg is a cache hit, so no further limiter
    // acquisitions or provider calls, and the natural keys keep row
    // counts at exactly one per leg and one per (job, rank).
    assert_eq!(h.runner.run(&job).await, JobStatus::Done);
    assert_eq!(h.limiter.acquisitions.load(Ordering::SeqCst), 3);
    assert_eq!(h.search.calls.load(Ordering::SeqCst), 3);
    assert_eq!(h.store.leg_count(), 3);
    assert_eq!(h.store.result_count(), 1);
}

#[tokio::test]
async fn status_sequence_follows_the_state_machine() {
    let h = harness(SOF_LOOP_PRICED);
    let job = sof_loop_job();

    h.runner.run(&job).await;

    let sequence = h.store.status_sequence();
    assert_eq!(sequence.first(), Some(&JobStatus::Running));
    assert!(sequence.last().unwrap().is_terminal());
    assert!(JobStatus::Queued.can_transition(sequence[0]));
    for pair in sequence.windows(2) {
        assert!(pair[0].can_transition(pair[1]));
    }
}

#[tokio::test]
async fn two_jobs_with_identical_filters_share_cache_entries() {
    let h = harness(SOF_LOOP_PRICED);
    let first = sof_loop_job();
    let second = Job {
        id: Uuid::now_v7(),
        ..first.clone()
    };

    assert_eq!(h.runner.run(&first).await, JobStatus::Done);
    assert_eq!(h.runner.run(&second).await, JobStatus::Done);

    // The second job priced entirely from cache but still owns its own
    // result row; durable leg records are per job.
    assert_eq!(h.search.calls.load(Ordering::SeqCst), 3);
    assert_eq!(h.store.result_count(), 2);
    assert_eq!(h.cache.entries.lock().unwrap().len(), 3);
}
