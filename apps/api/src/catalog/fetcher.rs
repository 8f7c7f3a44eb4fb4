//! Job-Catalog Fetcher — retrieves every job matching a query from the paginated
//! CareerNet catalog and de-duplicates the merged result by job code.
//!
//! Flow: validate query → page 1 → remaining pages in fixed-size concurrent
//!       batches (each batch fully awaited before the next) → merge in page
//!       order → keep the first record seen for each code.
//!
//! Any failing page aborts the whole search. There is no partial result.

use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::catalog::client::{CatalogError, CatalogSource};
use crate::catalog::models::{CatalogPage, CatalogQuery, FetchSummary, JobRecord};

/// Default cap on concurrent page requests.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Upper bound on pages one search may walk. A larger page count means the
/// envelope is broken, not that the catalog really is that big.
pub const MAX_PAGES: u32 = 1_000;

/// Runs a full catalog search. `batch_size` bounds in-flight page requests.
pub async fn fetch_all_jobs(
    source: Arc<dyn CatalogSource>,
    query: CatalogQuery,
    batch_size: usize,
) -> Result<FetchSummary, CatalogError> {
    if !query.is_usable() {
        return Err(CatalogError::InvalidQuery(
            "at least one of keyword, aptitudeCodes or themeCode is required".to_string(),
        ));
    }
    let batch_size = batch_size.max(1);

    let first = source.fetch_page(&query, 1).await?;
    let total_count = first.count;
    if total_count == 0 {
        info!("Catalog search returned no results for {query:?}");
        return Ok(FetchSummary::empty());
    }

    let total_pages = first.total_pages().ok_or_else(|| {
        CatalogError::Malformed(format!(
            "count is {} but pageSize is 0",
            first.count
        ))
    })?;
    if total_pages > MAX_PAGES {
        return Err(CatalogError::Malformed(format!(
            "count {} with pageSize {} gives {} pages, more than {}",
            first.count, first.page_size, total_pages, MAX_PAGES
        )));
    }
    info!(
        "Catalog search: count={}, pageSize={}, totalPages={}",
        first.count, first.page_size, total_pages
    );

    let mut pages: Vec<(u32, CatalogPage)> = vec![(1, first)];
    let query = Arc::new(query);
    let step = u32::try_from(batch_size).unwrap_or(u32::MAX);

    let mut next = 2u32;
    while next <= total_pages {
        let batch = next..=next.saturating_add(step - 1).min(total_pages);
        debug!("Fetching catalog pages {:?}", batch);
        next = batch.end().saturating_add(1);
        pages.extend(fetch_batch(&source, &query, batch).await?);
    }

    pages.sort_by_key(|(index, _)| *index);
    let merged: Vec<JobRecord> = pages.into_iter().flat_map(|(_, p)| p.items).collect();
    let retrieved_count = merged.len();
    let jobs = dedup_by_code(merged);

    info!(
        "Catalog search merged {} records into {} unique jobs",
        retrieved_count,
        jobs.len()
    );

    Ok(FetchSummary {
        total_count,
        retrieved_count,
        unique_count: jobs.len(),
        jobs,
    })
}

/// Fetches every page in `batch` concurrently and waits for all of them.
/// Returns on the first failure; dropping the set cancels the rest.
async fn fetch_batch(
    source: &Arc<dyn CatalogSource>,
    query: &Arc<CatalogQuery>,
    batch: RangeInclusive<u32>,
) -> Result<Vec<(u32, CatalogPage)>, CatalogError> {
    let mut set = JoinSet::new();
    for page_index in batch {
        let source = Arc::clone(source);
        let query = Arc::clone(query);
        set.spawn(async move {
            source
                .fetch_page(&query, page_index)
                .await
                .map(|page| (page_index, page))
        });
    }

    let mut fetched = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        let page = joined.map_err(|e| CatalogError::Task(e.to_string()))??;
        fetched.push(page);
    }
    Ok(fetched)
}

/// Keeps the first record for each code, preserving first-occurrence order.
pub fn dedup_by_code(records: Vec<JobRecord>) -> Vec<JobRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(r.code.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    /// In-memory catalog that records calls and peak concurrency.
    struct FakeCatalog {
        count: u32,
        page_size: u32,
        /// Items per page index (1-based); missing pages are empty.
        items: Vec<Vec<JobRecord>>,
        fail_page: Option<u32>,
        calls: Mutex<Vec<u32>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeCatalog {
        fn new(count: u32, page_size: u32, items: Vec<Vec<JobRecord>>) -> Self {
            Self {
                count,
                page_size,
                items,
                fail_page: None,
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }

        fn failing_on(mut self, page: u32) -> Self {
            self.fail_page = Some(page);
            self
        }

        fn calls(&self) -> Vec<u32> {
            let mut calls = self.calls.lock().unwrap().clone();
            calls.sort_unstable();
            calls
        }
    }

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn fetch_page(
            &self,
            _query: &CatalogQuery,
            page_index: u32,
        ) -> Result<CatalogPage, CatalogError> {
            self.calls.lock().unwrap().push(page_index);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(10 * page_index as u64)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_page == Some(page_index) {
                return Err(CatalogError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }

            Ok(CatalogPage {
                count: self.count,
                page_size: self.page_size,
                page_index,
                items: self
                    .items
                    .get(page_index as usize - 1)
                    .cloned()
                    .unwrap_or_default(),
            })
        }
    }

    fn job(code: &str) -> JobRecord {
        JobRecord {
            name: format!("job-{code}"),
            code: code.to_string(),
        }
    }

    fn keyword(k: &str) -> CatalogQuery {
        CatalogQuery {
            keyword: Some(k.to_string()),
            ..Default::default()
        }
    }

    fn pages_of(count: u32, page_size: u32) -> Vec<Vec<JobRecord>> {
        (0..count)
            .map(|i| job(&i.to_string()))
            .collect::<Vec<_>>()
            .chunks(page_size as usize)
            .map(|c| c.to_vec())
            .collect()
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected_without_calls() {
        let fake = Arc::new(FakeCatalog::new(10, 10, vec![]));
        let err = fetch_all_jobs(fake.clone(), CatalogQuery::default(), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidQuery(_)));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_count_short_circuits_after_one_request() {
        let fake = Arc::new(FakeCatalog::new(0, 10, vec![]));
        let summary = fetch_all_jobs(fake.clone(), keyword("nothing"), 5)
            .await
            .unwrap();
        assert_eq!(fake.calls(), vec![1]);
        assert!(summary.jobs.is_empty());
        assert_eq!(summary.total_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_pages_fetched_and_merged() {
        let fake = Arc::new(FakeCatalog::new(47, 10, pages_of(47, 10)));
        let summary = fetch_all_jobs(fake.clone(), keyword("dev"), 5)
            .await
            .unwrap();

        assert_eq!(fake.calls(), vec![1, 2, 3, 4, 5]);
        assert_eq!(summary.total_count, 47);
        assert_eq!(summary.retrieved_count, 47);
        assert_eq!(summary.unique_count, 47);
        let codes: Vec<String> = summary.jobs.iter().map(|j| j.code.clone()).collect();
        let expected: Vec<String> = (0..47).map(|i| i.to_string()).collect();
        assert_eq!(codes, expected, "merge must follow page order");
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicates_across_pages_keep_first_occurrence() {
        let mut first_copy = job("A");
        first_copy.name = "first".to_string();
        let mut second_copy = job("A");
        second_copy.name = "second".to_string();

        let items = vec![
            vec![first_copy, job("B")],
            vec![job("C"), second_copy],
            vec![job("B")],
        ];
        let fake = Arc::new(FakeCatalog::new(6, 2, items));
        let summary = fetch_all_jobs(fake, keyword("dup"), 5).await.unwrap();

        assert_eq!(summary.retrieved_count, 5);
        assert_eq!(summary.unique_count, 3);
        assert!(summary.unique_count <= summary.retrieved_count);
        let codes: Vec<&str> = summary.jobs.iter().map(|j| j.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B", "C"]);
        assert_eq!(summary.jobs[0].name, "first");
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_requests_never_exceed_batch_size() {
        let fake = Arc::new(FakeCatalog::new(230, 10, pages_of(230, 10)));
        let summary = fetch_all_jobs(fake.clone(), keyword("many"), 5)
            .await
            .unwrap();

        assert_eq!(fake.calls().len(), 23);
        assert_eq!(summary.unique_count, 230);
        assert_eq!(fake.peak.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_batch_size_is_honoured() {
        let fake = Arc::new(FakeCatalog::new(100, 10, pages_of(100, 10)));
        fetch_all_jobs(fake.clone(), keyword("x"), 2).await.unwrap();
        assert_eq!(fake.peak.load(Ordering::SeqCst), 2);
        assert_eq!(fake.calls().len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_page_aborts_search() {
        let fake = Arc::new(FakeCatalog::new(47, 10, pages_of(47, 10)).failing_on(3));
        let err = fetch_all_jobs(fake, keyword("dev"), 5).await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 500, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_batch_stops_later_batches() {
        let fake = Arc::new(FakeCatalog::new(100, 10, pages_of(100, 10)).failing_on(2));
        assert!(fetch_all_jobs(fake.clone(), keyword("dev"), 2).await.is_err());
        let calls = fake.calls();
        assert!(calls.iter().all(|&p| p <= 3), "later batches ran: {calls:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_page_size_is_malformed() {
        let fake = Arc::new(FakeCatalog::new(12, 0, vec![]));
        let err = fetch_all_jobs(fake, keyword("dev"), 5).await.unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_absurd_page_count_is_malformed_without_more_requests() {
        let fake = Arc::new(FakeCatalog::new(4_000_000_000, 1, vec![]));
        let err = fetch_all_jobs(fake.clone(), keyword("dev"), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
        assert_eq!(fake.calls(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_count_at_limit_is_walked() {
        let fake = Arc::new(FakeCatalog::new(MAX_PAGES, 1, vec![]));
        fetch_all_jobs(fake.clone(), keyword("dev"), 50).await.unwrap();
        assert_eq!(fake.calls().len(), MAX_PAGES as usize);
        assert_eq!(fake.peak.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn test_dedup_by_code_on_empty_input() {
        assert!(dedup_by_code(vec![]).is_empty());
    }
}
