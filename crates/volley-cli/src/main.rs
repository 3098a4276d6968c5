use std::path::PathBuf;

use chrono::SecondsFormat;
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use volley_core::engine::execute_run;
use volley_core::results::export::{export_csv, export_json, write_csv};
use volley_core::results::RunResult;
use volley_core::run::{Body, Headers, HttpMethod, RunRequest};
use volley_core::VolleyError;

#[derive(Parser)]
#[command(name = "volley", version, about = "Drive controlled load against an HTTP endpoint")]
struct Cli {
    /// Target URL to drive load against.
    #[arg(long)]
    endpoint: String,

    /// HTTP method.
    #[arg(long, default_value = "GET")]
    method: HttpMethod,

    /// Number of concurrent workers.
    #[arg(long, default_value_t = 1)]
    parallel: u32,

    /// Per-request deadline in milliseconds (0 = bounded only by --max-duration).
    #[arg(long, default_value_t = 0)]
    request_timeout: u64,

    /// Total wall-clock budget in milliseconds (0 = run until Ctrl-C).
    #[arg(long, default_value_t = 0)]
    max_duration: u64,

    /// Extra request header as "Name: Value"; repeatable.
    #[arg(long = "header")]
    headers: Vec<String>,

    /// Request body. JSON is detected and sent with a JSON content type,
    /// anything else is sent verbatim.
    #[arg(long)]
    body: Option<String>,

    /// Output format for the run result.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Also write the outcome table as CSV to this path.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
    Csv,
}

impl Cli {
    fn into_request(self) -> (RunRequest, OutputFormat, Option<PathBuf>) {
        let headers = (!self.headers.is_empty())
            .then(|| Headers::Raw(self.headers.join("\n")));
        let body = self.body.map(|text| {
            serde_json::from_str(&text)
                .map(Body::Json)
                .unwrap_or(Body::Raw(text))
        });
        let request = RunRequest {
            method: self.method,
            endpoint: self.endpoint,
            parallel: self.parallel,
            request_timeout: self.request_timeout,
            max_duration: self.max_duration,
            headers,
            body,
        };
        (request, self.format, self.output)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), VolleyError> {
    let (request, format, output) = cli.into_request();

    // Ctrl-C is the external stop request: stop issuing new requests and
    // drain in-flight calls.
    let cancel = CancellationToken::new();
    let stop = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("stop requested, draining in-flight requests");
            stop.cancel();
        }
    });

    let result = execute_run(request, cancel).await?;

    match format {
        OutputFormat::Json => println!("{}", export_json(&result)?),
        OutputFormat::Csv => print!("{}", export_csv(&result)),
        OutputFormat::Text => print_text(&result),
    }

    if let Some(path) = output {
        write_csv(&result, &path)?;
        tracing::info!(path = %path.display(), "wrote CSV export");
    }

    Ok(())
}

fn print_text(result: &RunResult) {
    println!("Results:");
    println!(
        " {:>4}  {:<28} {:>6} {:>10}  {}",
        "#", "Time", "Status", "Duration", "Error"
    );
    for (i, outcome) in result.results.iter().enumerate() {
        let status = outcome
            .status_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            " {:>4}. {:<28} {:>6} {:>8}ms  {}",
            i + 1,
            outcome.time.to_rfc3339_opts(SecondsFormat::Millis, true),
            status,
            outcome.duration_ms,
            outcome.error.as_deref().unwrap_or("")
        );
    }
    let s = &result.summary;
    println!();
    println!("Summary:");
    println!("  Total requests: {}", s.total_requests);
    println!("  Success: {}", s.success_count);
    println!("  Errors: {}", s.error_count);
    println!("  Avg duration: {:.2}ms", s.avg_duration_ms);
    println!("Latency:");
    println!("  P50 {}ms", s.latency.p50_ms);
    println!("  P90 {}ms", s.latency.p90_ms);
    println!("  P99 {}ms", s.latency.p99_ms);
}
