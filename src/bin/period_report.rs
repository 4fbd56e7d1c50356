use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dispatch_report_service::app::sheet_fetcher;
use dispatch_report_service::config::Config;
use dispatch_report_service::normalizer;
use dispatch_report_service::report::PeriodReport;
use dispatch_report_service::schema::Field;

/// Connection, auth and retry settings come from the same environment
/// variables the server reads (see `Config::from_env`).
#[derive(Parser, Debug)]
#[command(name = "period-report")]
#[command(about = "Print the request report of one period", long_about = None)]
struct Cli {
    /// Period key: jan..dec or year
    #[arg(default_value = "year")]
    period: String,

    /// Total fetch attempts on transient failures, overrides FETCH_MAX_ATTEMPTS
    #[arg(long)]
    attempts: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("SPREADSHEET_ID must be set: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(attempts) = cli.attempts {
        config.fetch_max_attempts = attempts.max(1);
    }

    let fetcher = match sheet_fetcher(&config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let (period, rows) = match fetcher.fetch_key(&cli.period).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("could not load period {}: {}", cli.period, e);
            return ExitCode::FAILURE;
        }
    };

    let report = normalizer::normalize(&rows);
    let width = report
        .records
        .iter()
        .map(|r| r.organization.chars().count())
        .max()
        .unwrap_or(0)
        .max(Field::Organization.name().len());

    println!("Period {} ({})\n", period, period.label());
    print!("{:<width$}", Field::Organization.name());
    for field in Field::COUNTERS {
        print!(" {:>10}", field.name());
    }
    println!();

    for r in &report.records {
        println!(
            "{:<width$} {:>10} {:>10} {:>10} {:>10} {:>10}",
            r.organization, r.total, r.closed, r.open, r.cancelled, r.erroneous
        );
    }

    let t = &report.totals;
    println!(
        "{:<width$} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "TOTAL", t.total, t.closed, t.open, t.cancelled, t.erroneous
    );

    for line in highlight_lines(&report) {
        println!("\n{line}");
    }

    ExitCode::SUCCESS
}

fn highlight_lines(report: &PeriodReport) -> Vec<String> {
    let highlights = report.highlights();
    let t = &report.totals;
    let mut lines = Vec::new();
    if highlights.all_closed {
        lines.push("All requests closed".to_string());
    }
    if highlights.needs_attention {
        lines.push(format!("{} open request(s) need attention", t.open));
    }
    if highlights.has_cancellations {
        lines.push(format!("{} request(s) cancelled", t.cancelled));
    }
    if report.distribution().is_empty() {
        lines.push("No chart data for this period".to_string());
    }
    lines
}
