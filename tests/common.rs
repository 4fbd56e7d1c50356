#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dispatch_report_service::fetch_error::SourceError;
use dispatch_report_service::fetcher::RetryPolicy;
use dispatch_report_service::normalizer::{CellValue, RawRow};
use dispatch_report_service::sheets_client::SheetSource;

/// In-memory sheet source that replays a scripted list of responses.
///
/// Once the script runs out every further read returns an empty region.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    script: Arc<Mutex<VecDeque<Result<Vec<RawRow>, SourceError>>>>,
    calls: Arc<AtomicUsize>,
    requested: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Vec<RawRow>, SourceError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            ..Self::default()
        }
    }

    pub fn push(&self, response: Result<Vec<RawRow>, SourceError>) {
        self.script.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<(String, String)> {
        self.requested.lock().unwrap().clone()
    }
}

impl SheetSource for ScriptedSource {
    fn read_range(
        &self,
        sheet: &str,
        range: &str,
    ) -> impl Future<Output = Result<Vec<RawRow>, SourceError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .unwrap()
            .push((sheet.to_string(), range.to_string()));
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        async move { next }
    }
}

pub fn server_error() -> SourceError {
    SourceError::Server {
        status: 500,
        message: "Internal error encountered.".to_string(),
    }
}

pub fn not_found() -> SourceError {
    SourceError::NotFound {
        status: 400,
        message: "Unable to parse range".to_string(),
    }
}

/// Retry policy with millisecond delays so tests stay fast.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        factor: 1.5,
    }
}

pub fn row(cells: &[&str]) -> RawRow {
    cells.iter().map(|c| CellValue::from(*c)).collect()
}

/// The example block used across tests: two organizations and a spacer row.
pub fn sample_rows() -> Vec<RawRow> {
    vec![
        row(&["Org A", "10", "7", "2", "1", "0"]),
        row(&["", "", "", "", "", ""]),
        row(&["Org B", "4", "4", "0", "0", "0"]),
    ]
}
