use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::fetch_error::FetchError;
use crate::fetcher::SheetFetcher;
use crate::normalizer;
use crate::period::PeriodKey;
use crate::report::PeriodReport;
use crate::sheets_client::{SheetSource, SheetsApiClient};

struct CachedReport {
    fetched_at: Instant,
    report: Arc<PeriodReport>,
}

/// Fetch + normalize per period, with a short-lived snapshot cache.
///
/// Entries are keyed by period only and expire after a fixed TTL. There is
/// no other invalidation. A failed refresh never falls back to the expired
/// snapshot.
#[derive(Clone)]
pub struct ReportService<S = SheetsApiClient> {
    fetcher: SheetFetcher<S>,
    cache: Arc<RwLock<HashMap<PeriodKey, CachedReport>>>,
    ttl: Duration,
}

impl<S: SheetSource> ReportService<S> {
    pub fn new(fetcher: SheetFetcher<S>, ttl: Duration) -> Self {
        Self {
            fetcher,
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Report for a period, served from cache while fresh.
    #[instrument(skip(self), fields(period = %period))]
    pub async fn get_report(&self, period: PeriodKey) -> Result<Arc<PeriodReport>, FetchError> {
        if let Some(report) = self.cached(period).await {
            debug!("Serving cached report for {}", period);
            return Ok(report);
        }

        let started = Instant::now();
        let result = self.fetcher.fetch(period).await;
        let rows = match result {
            Ok(rows) => rows,
            Err(e) => {
                // Drop the expired entry so nothing stale is served later, but
                // keep a snapshot a concurrent request stored after we started.
                let mut cache = self.cache.write().await;
                if cache
                    .get(&period)
                    .is_some_and(|entry| entry.fetched_at <= started)
                {
                    cache.remove(&period);
                }
                return Err(e);
            }
        };

        let report = Arc::new(normalizer::normalize(&rows));
        info!(
            "Built report for {}: {} organizations, {} requests",
            period,
            report.records.len(),
            report.totals.total
        );

        if !self.ttl.is_zero() {
            // Age counts from when the fetch started; an older fetch finishing
            // late does not replace a newer snapshot.
            let mut cache = self.cache.write().await;
            let newer_cached = cache
                .get(&period)
                .is_some_and(|entry| entry.fetched_at > started);
            if !newer_cached {
                cache.insert(
                    period,
                    CachedReport {
                        fetched_at: started,
                        report: Arc::clone(&report),
                    },
                );
            }
        }

        Ok(report)
    }

    /// Parse a period key supplied by a caller and build its report.
    pub async fn get_report_for_key(
        &self,
        key: &str,
    ) -> Result<(PeriodKey, Arc<PeriodReport>), FetchError> {
        let period: PeriodKey = key.parse()?;
        let report = self.get_report(period).await?;
        Ok((period, report))
    }

    async fn cached(&self, period: PeriodKey) -> Option<Arc<PeriodReport>> {
        let cache = self.cache.read().await;
        cache
            .get(&period)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.report))
    }
}
