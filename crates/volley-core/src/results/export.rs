use std::path::Path;

use chrono::SecondsFormat;

use crate::error::VolleyError;
use crate::results::RunResult;

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Export a finished run as CSV.
///
/// Produces a text document with:
/// - Leading comment lines (prefixed `#`) containing the run summary.
/// - A header row.
/// - One data row per outcome, in completion order. A call that never
///   received a response has an empty `status_code` field; a successful call
///   has an empty `error` field.
pub fn export_csv(result: &RunResult) -> String {
    let s = &result.summary;

    let mut out = String::new();

    out.push_str(&format!("# volley run {}\n", result.run_id.hyphenated()));
    out.push_str(&format!(
        "# Started:  {}\n",
        result.started_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    out.push_str(&format!(
        "# Finished: {}\n",
        result.finished_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    out.push_str(&format!("# Total requests: {}\n", s.total_requests));
    out.push_str(&format!("# Success: {}\n", s.success_count));
    out.push_str(&format!("# Errors: {}\n", s.error_count));
    out.push_str(&format!("# Avg duration: {:.2}ms\n", s.avg_duration_ms));
    out.push_str(&format!(
        "# P50: {}ms  P90: {}ms  P99: {}ms\n",
        s.latency.p50_ms, s.latency.p90_ms, s.latency.p99_ms
    ));
    out.push('\n');

    out.push_str("time,status_code,duration,error\n");

    for r in &result.results {
        let time = r.time.to_rfc3339_opts(SecondsFormat::Millis, true);
        let status = r
            .status_code
            .map(|code| code.to_string())
            .unwrap_or_default();
        let error = r.error.as_deref().map(csv_escape).unwrap_or_default();

        out.push_str(&format!("{},{},{},{}\n", time, status, r.duration_ms, error));
    }

    out
}

/// Write the CSV export to a file.
pub fn write_csv(result: &RunResult, path: &Path) -> Result<(), VolleyError> {
    std::fs::write(path, export_csv(result))?;
    Ok(())
}

/// Wrap a field value in quotes and escape any embedded quotes.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// JSON export
// ---------------------------------------------------------------------------

/// Export a finished run as pretty-printed JSON.
pub fn export_json(result: &RunResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::aggregator::summarize;
    use crate::results::RequestOutcome;
    use chrono::Utc;
    use std::time::Duration;
    use uuid::Uuid;

    fn make_run(outcomes: Vec<RequestOutcome>) -> RunResult {
        let now = Utc::now();
        let summary = summarize(&outcomes);
        RunResult {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            results: outcomes,
            summary,
        }
    }

    fn data_lines(csv: &str) -> Vec<&str> {
        csv.lines()
            .filter(|l| !l.starts_with('#') && !l.is_empty() && !l.starts_with("time,"))
            .collect()
    }

    // -----------------------------------------------------------------------
    // csv_escape
    // -----------------------------------------------------------------------

    #[test]
    fn csv_escape_plain_string() {
        assert_eq!(csv_escape("hello"), "hello");
    }

    #[test]
    fn csv_escape_string_with_comma() {
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
    }

    #[test]
    fn csv_escape_string_with_quotes() {
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn csv_escape_empty_string() {
        assert_eq!(csv_escape(""), "");
    }

    // -----------------------------------------------------------------------
    // export_csv
    // -----------------------------------------------------------------------

    #[test]
    fn export_csv_contains_header_row() {
        let run = make_run(vec![RequestOutcome::success(
            Utc::now(),
            200,
            Duration::from_millis(10),
        )]);
        let csv = export_csv(&run);
        assert!(csv.contains("time,status_code,duration,error"));
    }

    #[test]
    fn export_csv_one_data_row_per_outcome_in_order() {
        let outcomes = vec![
            RequestOutcome::success(Utc::now(), 200, Duration::from_millis(1)),
            RequestOutcome::success(Utc::now(), 201, Duration::from_millis(2)),
            RequestOutcome::failure(Utc::now(), Duration::from_millis(3), "boom"),
        ];
        let csv = export_csv(&make_run(outcomes));
        let lines = data_lines(&csv);
        assert_eq!(lines.len(), 3);
        // Completion order is preserved.
        assert!(lines[0].contains(",200,1,"));
        assert!(lines[1].contains(",201,2,"));
        assert!(lines[2].ends_with(",3,boom"));
    }

    #[test]
    fn export_csv_missing_error_renders_empty_field() {
        let run = make_run(vec![RequestOutcome::success(
            Utc::now(),
            200,
            Duration::from_millis(5),
        )]);
        let csv = export_csv(&run);
        let lines = data_lines(&csv);
        assert!(lines[0].ends_with(",200,5,"));
    }

    #[test]
    fn export_csv_missing_status_renders_empty_field() {
        let run = make_run(vec![RequestOutcome::failure(
            Utc::now(),
            Duration::from_millis(5),
            "host not found",
        )]);
        let csv = export_csv(&run);
        let lines = data_lines(&csv);
        assert!(lines[0].contains(",,5,host not found"));
    }

    #[test]
    fn export_csv_escapes_error_with_comma() {
        let run = make_run(vec![RequestOutcome::failure(
            Utc::now(),
            Duration::from_millis(5),
            "connection refused, server down",
        )]);
        let csv = export_csv(&run);
        assert!(csv.contains("\"connection refused, server down\""));
    }

    #[test]
    fn export_csv_summary_comments_present() {
        let run = make_run(Vec::new());
        let csv = export_csv(&run);
        assert!(csv.contains("# Total requests: 0"));
        assert!(csv.contains("# P50: 0ms"));
    }

    #[test]
    fn write_csv_round_trips_through_file() {
        let run = make_run(vec![RequestOutcome::success(
            Utc::now(),
            200,
            Duration::from_millis(9),
        )]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        write_csv(&run, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, export_csv(&run));
    }

    // -----------------------------------------------------------------------
    // export_json
    // -----------------------------------------------------------------------

    #[test]
    fn export_json_is_valid_json() {
        let run = make_run(vec![RequestOutcome::success(
            Utc::now(),
            200,
            Duration::from_millis(10),
        )]);
        let json_str = export_json(&run).expect("export_json should not fail");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.get("run_id").is_some());
        assert!(parsed.get("results").is_some());
        assert!(parsed.get("summary").is_some());
    }

    #[test]
    fn export_json_uses_wire_field_names() {
        let run = make_run(vec![RequestOutcome::success(
            Utc::now(),
            200,
            Duration::from_millis(10),
        )]);
        let parsed: serde_json::Value =
            serde_json::from_str(&export_json(&run).unwrap()).unwrap();
        assert_eq!(parsed["results"][0]["duration"], 10);
        assert_eq!(parsed["summary"]["avg_duration"], 10.0);
        assert!(parsed["summary"]["latency"].get("p50").is_some());
    }
}
