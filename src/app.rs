use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::fetcher::SheetFetcher;
use crate::period::ConfigError;
use crate::schema::RowWindow;
use crate::services::ReportService;
use crate::sheets_client::SheetsApiClient;

/// Sheets client and retrying fetcher configured from `config`.
///
/// Shared by the server and the `period-report` CLI so both resolve auth,
/// timeout and retry settings the same way.
pub fn sheet_fetcher(config: &Config) -> Result<SheetFetcher<SheetsApiClient>, ConfigError> {
    let client = SheetsApiClient::new(
        config.sheets_api_url.clone(),
        config.spreadsheet_id.clone(),
        config.sheets_auth(),
        config.request_timeout(),
    )?;
    Ok(SheetFetcher::with_settings(
        client,
        RowWindow::default(),
        config.retry_policy(),
    ))
}

/// Running application: the HTTP server task.
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
}

impl Application {
    /// Wire client, fetcher, service and router, then spawn the server.
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let fetcher = sheet_fetcher(&config)?;

        info!(
            "Report cache TTL: {}s, fetch attempts: {}",
            config.cache_ttl_secs, config.fetch_max_attempts
        );
        let report_service = ReportService::new(fetcher, config.cache_ttl());

        let app = create_router(AppState { report_service }).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let server_handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await
        });

        info!("Application initialized successfully");

        Ok(Self { server_handle })
    }

    /// Run until the server stops.
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}
