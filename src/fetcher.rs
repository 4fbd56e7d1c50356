use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::{debug, info, instrument, warn};

use crate::fetch_error::{FetchError, SourceError};
use crate::normalizer::RawRow;
use crate::period::PeriodKey;
use crate::schema::RowWindow;
use crate::sheets_client::SheetSource;

/// How many times, and how patiently, a transient failure is retried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: usize,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Multiplier applied to the delay after every retry.
    pub factor: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            factor: 1.5,
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.base_delay.saturating_mul(64))
            .with_factor(self.factor)
            .with_max_times(self.max_attempts.saturating_sub(1))
    }
}

/// Reads the raw rows of a period sheet, retrying transient failures.
#[derive(Clone)]
pub struct SheetFetcher<S> {
    source: S,
    window: RowWindow,
    retry: RetryPolicy,
}

impl<S: SheetSource> SheetFetcher<S> {
    pub fn new(source: S) -> Self {
        Self::with_settings(source, RowWindow::default(), RetryPolicy::default())
    }

    pub fn with_settings(source: S, window: RowWindow, retry: RetryPolicy) -> Self {
        Self {
            source,
            window,
            retry,
        }
    }

    /// Fetch the configured window of the period's sheet.
    ///
    /// An empty region is a valid result, not an error.
    #[instrument(skip(self), fields(period = %period))]
    pub async fn fetch(&self, period: PeriodKey) -> Result<Vec<RawRow>, FetchError> {
        let sheet = period.sheet_name()?;
        let range = self.window.a1_range();
        debug!("Fetching sheet '{}' range {}", sheet, range);

        let mut attempts = 0usize;
        let result = (|| {
            attempts += 1;
            self.source.read_range(sheet, &range)
        })
        .retry(self.retry.backoff())
        .sleep(tokio::time::sleep)
        .when(SourceError::is_transient)
        .notify(|err: &SourceError, delay: Duration| {
            warn!(
                "Transient failure reading sheet '{}', retrying in {:?}: {}",
                sheet, delay, err
            );
        })
        .await;

        match result {
            Ok(rows) => {
                info!(
                    "Fetched {} rows from sheet '{}' in {} attempt(s)",
                    rows.len(),
                    sheet,
                    attempts
                );
                Ok(rows)
            }
            Err(err) => {
                warn!(
                    "Giving up on sheet '{}' after {} attempt(s): {}",
                    sheet, attempts, err
                );
                Err(FetchError::from_source(sheet, attempts, err))
            }
        }
    }

    /// Parse a period key and fetch it; unknown keys fail before any request.
    pub async fn fetch_key(&self, key: &str) -> Result<(PeriodKey, Vec<RawRow>), FetchError> {
        let period: PeriodKey = key.parse()?;
        let rows = self.fetch(period).await?;
        Ok((period, rows))
    }
}
