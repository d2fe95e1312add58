//! Tests for scroll module

use super::*;
use crate::error::Error;
use crate::fetch::MemorySource;
use crate::types::{TrimPolicy, DEFAULT_PAGE_SIZE};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use test_case::test_case;

/// Table with ids `1..=count`
fn numbers(count: u64) -> MemorySource<u64, u64> {
    MemorySource::from_records(1..=count, |n| *n)
}

fn scroller(
    store: &MemorySource<u64, u64>,
    page_size: usize,
    policy: TrimPolicy,
) -> PageScroller<u64, u64, Infallible> {
    PageScroller::builder()
        .source(store.clone())
        .cursor_extractor(|n: &u64| *n)
        .page_size(page_size)
        .policy(policy)
        .build()
        .unwrap()
}

fn drain(scroller: &PageScroller<u64, u64, Infallible>) -> Vec<u64> {
    scroller.entities().map(|n| n.unwrap()).collect()
}

/// Log lines captured while building a scroller with `policy`
fn build_logs(policy: TrimPolicy) -> String {
    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        scroller(&numbers(3), 2, policy);
    });
    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

// ============================================================================
// Builder Tests
// ============================================================================

#[test]
fn test_builder_defaults() {
    let scroller = PageScroller::builder()
        .source(numbers(3))
        .cursor_extractor(|n: &u64| *n)
        .build()
        .unwrap();

    assert_eq!(scroller.page_size().fixed_value(), Some(DEFAULT_PAGE_SIZE));
    assert_eq!(scroller.policy(), TrimPolicy::TrimFirst);
    assert_eq!(scroller.max_pages(), None);
}

#[test]
fn test_builder_missing_source() {
    let err = PageScroller::<u64, u64, Infallible>::builder()
        .cursor_extractor(|n: &u64| *n)
        .build()
        .unwrap_err();

    assert!(err.is_config());
    assert!(matches!(err, Error::MissingConfigField { ref field } if field == "source"));
}

#[test]
fn test_builder_missing_cursor_extractor() {
    let err = PageScroller::<u64, u64, Infallible>::builder()
        .source(numbers(3))
        .page_size(5)
        .build()
        .unwrap_err();

    assert!(matches!(err, Error::MissingConfigField { ref field } if field == "cursor_extractor"));
}

#[test]
fn test_builder_rejects_zero_page_size() {
    let err = PageScroller::builder()
        .source(numbers(3))
        .cursor_extractor(|n: &u64| *n)
        .page_size(0)
        .build()
        .unwrap_err();

    assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "page_size"));
}

#[test]
fn test_builder_rejects_zero_page_cap() {
    let err = PageScroller::builder()
        .source(numbers(3))
        .cursor_extractor(|n: &u64| *n)
        .max_pages(0)
        .build()
        .unwrap_err();

    assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "max_pages"));
}

#[test]
fn test_builder_warns_about_trim_first() {
    let logs = build_logs(TrimPolicy::TrimFirst);
    assert!(logs.contains("WARN"));
    assert!(logs.contains("deleting visited entities during iteration can skip records"));

    assert!(build_logs(TrimPolicy::TrimLast).is_empty());
}

#[test]
fn test_builder_accepts_dynamic_page_size() {
    let scroller = PageScroller::builder()
        .source(numbers(3))
        .cursor_extractor(|n: &u64| *n)
        .page_size_fn(|| 0)
        .build()
        .unwrap();

    assert_eq!(scroller.page_size().fixed_value(), None);
    // A zero from the supplier is treated as 1
    assert_eq!(drain(&scroller), vec![1, 2, 3]);
}

// ============================================================================
// Completeness Tests
// ============================================================================

#[test_case(TrimPolicy::TrimFirst, 1; "trim first, size 1")]
#[test_case(TrimPolicy::TrimFirst, 7; "trim first, size 7")]
#[test_case(TrimPolicy::TrimFirst, 10; "trim first, exact divisor")]
#[test_case(TrimPolicy::TrimFirst, 100; "trim first, one full page")]
#[test_case(TrimPolicy::TrimFirst, 250; "trim first, oversized page")]
#[test_case(TrimPolicy::TrimLast, 1; "trim last, size 1")]
#[test_case(TrimPolicy::TrimLast, 7; "trim last, size 7")]
#[test_case(TrimPolicy::TrimLast, 10; "trim last, exact divisor")]
#[test_case(TrimPolicy::TrimLast, 100; "trim last, one full page")]
#[test_case(TrimPolicy::TrimLast, 250; "trim last, oversized page")]
fn test_yields_every_entity_in_order(policy: TrimPolicy, page_size: usize) {
    let store = numbers(100);
    let scroller = scroller(&store, page_size, policy);

    assert_eq!(drain(&scroller), (1..=100).collect::<Vec<_>>());
}

#[test_case(TrimPolicy::TrimFirst)]
#[test_case(TrimPolicy::TrimLast)]
fn test_empty_source(policy: TrimPolicy) {
    let store = numbers(0);
    let scroller = scroller(&store, 10, policy);

    let mut pages = scroller.pages();
    assert!(pages.next().is_none());
    assert_eq!(pages.phase(), ScrollPhase::Exhausted);
    assert_eq!(pages.page_index(), 1);
    assert_eq!(store.fetch_count(), 1);
}

#[test_case(TrimPolicy::TrimFirst)]
#[test_case(TrimPolicy::TrimLast)]
fn test_start_cursor_is_inclusive(policy: TrimPolicy) {
    let store = numbers(30);
    let scroller = PageScroller::builder()
        .source(store.clone())
        .cursor_extractor(|n: &u64| *n)
        .start(12)
        .page_size(4)
        .policy(policy)
        .build()
        .unwrap();

    assert_eq!(drain(&scroller), (12..=30).collect::<Vec<_>>());
}

#[test]
fn test_start_cursor_not_present_in_source() {
    let store = numbers(30);
    store.remove(&12);
    let scroller = PageScroller::builder()
        .source(store.clone())
        .cursor_extractor(|n: &u64| *n)
        .start(12)
        .page_size(4)
        .policy(TrimPolicy::TrimLast)
        .build()
        .unwrap();

    assert_eq!(drain(&scroller), (13..=30).collect::<Vec<_>>());
}

// ============================================================================
// Page Boundary Tests
// ============================================================================

#[test]
fn test_trim_last_pages() {
    let store = numbers(25);
    let scroller = scroller(&store, 10, TrimPolicy::TrimLast);

    let pages: Vec<Vec<u64>> = scroller.pages().map(|p| p.unwrap()).collect();
    assert_eq!(
        pages,
        vec![
            (1..=10).collect::<Vec<_>>(),
            (11..=20).collect::<Vec<_>>(),
            (21..=25).collect::<Vec<_>>(),
        ]
    );
    assert_eq!(store.fetch_count(), 3);
}

#[test]
fn test_trim_first_pages() {
    let store = numbers(25);
    let scroller = scroller(&store, 10, TrimPolicy::TrimFirst);

    let pages: Vec<Vec<u64>> = scroller.pages().map(|p| p.unwrap()).collect();
    assert_eq!(
        pages,
        vec![
            (1..=10).collect::<Vec<_>>(),
            (11..=20).collect::<Vec<_>>(),
            (21..=25).collect::<Vec<_>>(),
        ]
    );
    assert_eq!(store.fetch_count(), 3);
}

#[test]
fn test_trim_last_exact_multiple_needs_no_trailing_fetch() {
    let store = numbers(20);
    let scroller = scroller(&store, 10, TrimPolicy::TrimLast);

    assert_eq!(drain(&scroller), (1..=20).collect::<Vec<_>>());
    assert_eq!(store.fetch_count(), 2);
}

#[test]
fn test_trim_first_exact_multiple_ends_on_empty_fetch() {
    let store = numbers(20);
    let scroller = scroller(&store, 10, TrimPolicy::TrimFirst);

    let mut pages = scroller.pages();
    assert_eq!(pages.next().unwrap().unwrap().len(), 10);
    assert_eq!(pages.phase(), ScrollPhase::Continuing);
    assert_eq!(pages.next().unwrap().unwrap().len(), 10);
    assert_eq!(pages.phase(), ScrollPhase::Continuing);
    assert!(pages.next().is_none());
    assert_eq!(pages.phase(), ScrollPhase::Exhausted);
    assert_eq!(store.fetch_count(), 3);
}

#[test]
fn test_short_page_stops_without_further_fetches() {
    let store = numbers(5);
    let scroller = scroller(&store, 10, TrimPolicy::TrimFirst);

    let mut pages = scroller.pages();
    assert_eq!(pages.phase(), ScrollPhase::FirstFetch);
    assert_eq!(pages.next().unwrap().unwrap(), vec![1, 2, 3, 4, 5]);
    assert_eq!(pages.phase(), ScrollPhase::Exhausted);
    assert!(pages.next().is_none());
    assert!(pages.next().is_none());
    assert_eq!(store.fetch_count(), 1);
}

// ============================================================================
// Page Cap Tests
// ============================================================================

#[test_case(TrimPolicy::TrimFirst, 3, 10, 30; "trim first, cap below data")]
#[test_case(TrimPolicy::TrimLast, 3, 10, 30; "trim last, cap below data")]
#[test_case(TrimPolicy::TrimFirst, 1, 7, 7; "trim first, single page")]
#[test_case(TrimPolicy::TrimLast, 1, 7, 7; "trim last, single page")]
#[test_case(TrimPolicy::TrimFirst, 50, 10, 100; "trim first, cap above data")]
#[test_case(TrimPolicy::TrimLast, 50, 10, 100; "trim last, cap above data")]
fn test_page_cap(policy: TrimPolicy, max_pages: usize, page_size: usize, expected: u64) {
    let store = numbers(100);
    let scroller = PageScroller::builder()
        .source(store.clone())
        .cursor_extractor(|n: &u64| *n)
        .page_size(page_size)
        .max_pages(max_pages)
        .policy(policy)
        .build()
        .unwrap();

    assert_eq!(drain(&scroller), (1..=expected).collect::<Vec<_>>());
    assert!(store.fetch_count() <= max_pages);
}

#[test_case(TrimPolicy::TrimFirst)]
#[test_case(TrimPolicy::TrimLast)]
fn test_user_table_window(policy: TrimPolicy) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let users = move |start: Option<u32>, limit: usize| -> Result<Vec<u32>, Infallible> {
        counter.fetch_add(1, Ordering::SeqCst);
        let start = start.unwrap_or(0);
        Ok((start..938).take(limit).collect())
    };

    let scroller = PageScroller::builder()
        .source(users)
        .cursor_extractor(|id: &u32| *id)
        .start(100)
        .page_size(10)
        .max_pages(3)
        .policy(policy)
        .build()
        .unwrap();

    let ids: Vec<u32> = scroller.entities().map(|id| id.unwrap()).collect();
    assert_eq!(ids, (100..130).collect::<Vec<_>>());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

// ============================================================================
// Mutation Tests
// ============================================================================

#[test_case(1)]
#[test_case(3)]
#[test_case(10)]
#[test_case(33)]
fn test_trim_last_survives_delete_while_iterating(page_size: usize) {
    let store = numbers(100);
    let scroller = scroller(&store, page_size, TrimPolicy::TrimLast);

    let mut visited = Vec::new();
    for id in &scroller {
        let id = id.unwrap();
        visited.push(id);
        store.remove(&id);
    }

    assert_eq!(visited, (1..=100).collect::<Vec<_>>());
    assert!(store.is_empty());
}

#[test]
fn test_trim_first_skips_records_when_visited_rows_are_deleted() {
    let store = numbers(100);
    let scroller = scroller(&store, 10, TrimPolicy::TrimFirst);

    let mut visited = Vec::new();
    for id in &scroller {
        let id = id.unwrap();
        visited.push(id);
        store.remove(&id);
    }

    // The row after each page boundary takes the dropped slot and is lost
    let missed: Vec<u64> = (1..=100).filter(|id| !visited.contains(id)).collect();
    assert_eq!(missed, vec![11, 22, 33, 44, 55, 66, 77, 88, 99]);
    assert_eq!(visited.iter().collect::<HashSet<_>>().len(), visited.len());
    assert_eq!(store.len(), missed.len());
}

#[test]
fn test_trim_first_without_deletion_is_complete() {
    let store = numbers(100);
    let scroller = scroller(&store, 10, TrimPolicy::TrimFirst);

    assert_eq!(drain(&scroller), (1..=100).collect::<Vec<_>>());
    assert_eq!(store.len(), 100);
}

// ============================================================================
// Re-traversal Tests
// ============================================================================

#[test_case(TrimPolicy::TrimFirst)]
#[test_case(TrimPolicy::TrimLast)]
fn test_traversals_are_independent(policy: TrimPolicy) {
    let store = numbers(45);
    let scroller = scroller(&store, 6, policy);

    let mut first = scroller.entities();
    let mut second = scroller.clone().entities();

    // Interleave the two traversals
    let mut a = Vec::new();
    let mut b = Vec::new();
    for _ in 0..20 {
        a.push(first.next().unwrap().unwrap());
    }
    b.extend(second.by_ref().map(|n| n.unwrap()));
    a.extend(first.map(|n| n.unwrap()));

    assert_eq!(a, b);
    assert_eq!(a, drain(&scroller));
}

// ============================================================================
// Dynamic Page Size Tests
// ============================================================================

#[test_case(TrimPolicy::TrimFirst, 7)]
#[test_case(TrimPolicy::TrimFirst, 42)]
#[test_case(TrimPolicy::TrimLast, 7)]
#[test_case(TrimPolicy::TrimLast, 42)]
fn test_random_page_sizes(policy: TrimPolicy, seed: u64) {
    let store = numbers(200);
    let rng = Mutex::new(StdRng::seed_from_u64(seed));
    let scroller = PageScroller::builder()
        .source(store.clone())
        .cursor_extractor(|n: &u64| *n)
        .page_size_fn(move || rng.lock().unwrap().gen_range(1..=10))
        .policy(policy)
        .build()
        .unwrap();

    assert_eq!(drain(&scroller), (1..=200).collect::<Vec<_>>());
}

#[test]
fn test_page_size_is_evaluated_per_fetch() {
    let sizes = Mutex::new(vec![5, 2, 3]);
    let store = numbers(100);
    let scroller = PageScroller::builder()
        .source(store.clone())
        .cursor_extractor(|n: &u64| *n)
        .page_size_fn(move || sizes.lock().unwrap().pop().unwrap_or(1))
        .policy(TrimPolicy::TrimLast)
        .max_pages(4)
        .build()
        .unwrap();

    let pages: Vec<Vec<u64>> = scroller.pages().map(|p| p.unwrap()).collect();
    assert_eq!(pages, vec![vec![1, 2, 3], vec![4, 5], vec![6, 7, 8, 9, 10], vec![11]]);
}

// ============================================================================
// Laziness Tests
// ============================================================================

#[test]
fn test_entities_fetch_on_demand() {
    let store = numbers(100);
    let scroller = scroller(&store, 10, TrimPolicy::TrimLast);

    assert_eq!(store.fetch_count(), 0);
    let mut entities = scroller.entities();
    assert_eq!(store.fetch_count(), 0);

    let head: Vec<u64> = entities.by_ref().take(10).map(|n| n.unwrap()).collect();
    assert_eq!(head, (1..=10).collect::<Vec<_>>());
    assert_eq!(store.fetch_count(), 1);
    assert_eq!(entities.buffered(), 0);

    assert_eq!(entities.next().unwrap().unwrap(), 11);
    assert_eq!(store.fetch_count(), 2);
    assert_eq!(entities.pages_fetched(), 2);
    assert_eq!(entities.buffered(), 9);
}

#[test]
fn test_early_termination_stops_fetching() {
    let store = numbers(1000);
    let scroller = scroller(&store, 10, TrimPolicy::TrimFirst);

    let found = scroller
        .entities()
        .map(|n| n.unwrap())
        .find(|n| n % 11 == 0);

    assert_eq!(found, Some(11));
    assert_eq!(store.fetch_count(), 2);
}

#[test]
fn test_size_hint_is_exact_once_exhausted() {
    let store = numbers(4);
    let scroller = scroller(&store, 10, TrimPolicy::TrimLast);

    let mut entities = scroller.entities();
    assert_eq!(entities.size_hint(), (0, None));
    entities.next();
    assert_eq!(entities.phase(), ScrollPhase::Exhausted);
    assert_eq!(entities.size_hint(), (3, Some(3)));
}

// ============================================================================
// Fetch Error Tests
// ============================================================================

#[test_case(TrimPolicy::TrimFirst)]
#[test_case(TrimPolicy::TrimLast)]
fn test_fetch_error_propagates_and_fuses(policy: TrimPolicy) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let flaky = move |cursor: Option<u64>, limit: usize| -> Result<Vec<u64>, String> {
        if counter.fetch_add(1, Ordering::SeqCst) == 1 {
            return Err("connection reset".to_string());
        }
        let start = cursor.unwrap_or(1);
        Ok((start..).take(limit).collect())
    };

    let scroller = PageScroller::builder()
        .source(flaky)
        .cursor_extractor(|n: &u64| *n)
        .page_size(5)
        .policy(policy)
        .build()
        .unwrap();

    let results: Vec<Result<u64, String>> = scroller.entities().collect();
    assert_eq!(results.len(), 6);
    assert_eq!(
        results[..5].iter().cloned().collect::<Result<Vec<_>, _>>().unwrap(),
        vec![1, 2, 3, 4, 5]
    );
    assert_eq!(results[5], Err("connection reset".to_string()));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
