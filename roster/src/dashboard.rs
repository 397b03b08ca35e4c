//! HTML rendering for the statistics dashboard.
//!
//! The page polls `/stats/data` through htmx and swaps the fragment in
//! place. Rendering works off the typed metrics snapshot; no templating
//! engine, just string formatting.

use std::time::Duration;

use crate::metrics::MetricsSnapshot;

/// Full dashboard page served at `/stats`.
pub fn render_page(snapshot: &MetricsSnapshot) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Server Statistics</title>
    <script src="https://unpkg.com/htmx.org@1.9.11"></script>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            line-height: 1.6;
            max-width: 1200px;
            margin: 0 auto;
            padding: 20px;
            background-color: #f0f2f5;
            color: #333;
        }}
        header {{
            margin-bottom: 30px;
            border-bottom: 2px solid #eaeaea;
            padding-bottom: 20px;
            text-align: center;
        }}
        .stats-dashboard {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));
            gap: 20px;
            margin-top: 20px;
        }}
        .stat-card {{
            background-color: white;
            border-radius: 12px;
            padding: 25px;
            box-shadow: 0 4px 12px rgba(0, 0, 0, 0.1);
            border-top: 4px solid #4361ee;
        }}
        .stat-name {{
            font-size: 1.1rem;
            color: #666;
            margin-bottom: 8px;
            font-weight: 500;
        }}
        .stat-value {{
            font-size: 2rem;
            font-weight: 700;
            color: #2d3748;
        }}
    </style>
</head>
<body>
    <header>
        <h1>Server Statistics</h1>
        <p class="subtitle">live view, refreshed every 2 seconds</p>
    </header>
    <div id="stats" hx-get="/stats/data" hx-trigger="every 2s" hx-swap="innerHTML">
{fragment}
    </div>
</body>
</html>
"#,
        fragment = render_fragment(snapshot),
    )
}

/// Refresh fragment served at `/stats/data`.
pub fn render_fragment(snapshot: &MetricsSnapshot) -> String {
    let cards = [
        ("uptime", humantime::format_duration(seconds(snapshot.uptime)).to_string()),
        ("requests_total", snapshot.requests_total.to_string()),
        ("requests_succeeded", snapshot.requests_succeeded.to_string()),
        ("requests_failed", snapshot.requests_failed.to_string()),
        (
            "requests_per_second",
            format!("{:.2}", snapshot.requests_per_second),
        ),
        ("success_rate", format!("{:.2}%", snapshot.success_rate)),
        (
            "concurrent_requests",
            snapshot.concurrent_requests.to_string(),
        ),
        ("max_concurrent", snapshot.max_concurrent.to_string()),
        (
            "server_load",
            format!("{:.2}/10", snapshot.server_load * 10.0),
        ),
        (
            "memory_usage",
            format!("{:.2} MB", snapshot.memory_bytes as f64 / 1024.0 / 1024.0),
        ),
        ("cpu_usage", format!("{:.2}%", snapshot.cpu_fraction * 100.0)),
        ("p50_response_time", millis(snapshot.p50_response_time)),
        ("p90_response_time", millis(snapshot.p90_response_time)),
        ("p99_response_time", millis(snapshot.p99_response_time)),
        ("avg_response_time", millis(snapshot.avg_response_time)),
    ];

    let mut out = String::from("        <div class=\"stats-dashboard\">\n");
    for (name, value) in cards {
        out.push_str(&format!(
            "            <div class=\"stat-card\"><div class=\"stat-name\">{name}</div><div class=\"stat-value\">{value}</div></div>\n"
        ));
    }
    out.push_str("        </div>");
    out
}

/// Plain-text stats report, one metric per line.
pub fn render_report(snapshot: &MetricsSnapshot) -> String {
    format!(
        "## Web server statistics\n\
         ### uptime - {}\n\
         ### requests_total - {}\n\
         ### requests_succeeded - {}\n\
         ### requests_failed - {}\n\
         ### requests_per_second - {:.2}\n\
         ### success_rate - {:.2}%\n\
         ### concurrent_requests - {}\n\
         ### max_concurrent - {}\n\
         ### server_load - {:.2}/10\n\
         ### memory_usage - {:.2} MB\n\
         ### cpu_usage - {:.2}%\n\
         ### p50_response_time - {}\n\
         ### p90_response_time - {}\n\
         ### p99_response_time - {}\n\
         ### avg_response_time - {}",
        humantime::format_duration(seconds(snapshot.uptime)),
        snapshot.requests_total,
        snapshot.requests_succeeded,
        snapshot.requests_failed,
        snapshot.requests_per_second,
        snapshot.success_rate,
        snapshot.concurrent_requests,
        snapshot.max_concurrent,
        snapshot.server_load * 10.0,
        snapshot.memory_bytes as f64 / 1024.0 / 1024.0,
        snapshot.cpu_fraction * 100.0,
        millis(snapshot.p50_response_time),
        millis(snapshot.p90_response_time),
        millis(snapshot.p99_response_time),
        millis(snapshot.avg_response_time),
    )
}

fn millis(duration: Duration) -> String {
    format!("{:.2}ms", duration.as_secs_f64() * 1000.0)
}

/// Truncate to whole seconds so humantime doesn't print nanoseconds.
fn seconds(duration: Duration) -> Duration {
    Duration::from_secs(duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            started_at: Utc::now(),
            uptime: Duration::from_secs(90),
            requests_total: 120,
            requests_succeeded: 100,
            requests_failed: 20,
            requests_per_second: 1.33,
            success_rate: 83.33,
            concurrent_requests: 2,
            max_concurrent: 100,
            server_load: 0.02,
            memory_bytes: 4 * 1024 * 1024,
            cpu_fraction: 0.25,
            p50_response_time: Duration::from_millis(3),
            p90_response_time: Duration::from_millis(9),
            p99_response_time: Duration::from_millis(27),
            avg_response_time: Duration::from_millis(5),
        }
    }

    #[test]
    fn fragment_carries_every_metric() {
        let html = render_fragment(&snapshot());
        for field in [
            "uptime",
            "requests_total",
            "requests_succeeded",
            "requests_failed",
            "success_rate",
            "server_load",
            "memory_usage",
            "cpu_usage",
            "p99_response_time",
        ] {
            assert!(html.contains(field), "missing {field}");
        }
        assert!(html.contains("120"));
        assert!(html.contains("4.00 MB"));
        assert!(html.contains("25.00%"));
    }

    #[test]
    fn page_embeds_the_fragment_and_refresh_hook() {
        let html = render_page(&snapshot());
        assert!(html.contains("hx-get=\"/stats/data\""));
        assert!(html.contains("requests_per_second"));
    }

    #[test]
    fn report_is_one_metric_per_line() {
        let report = render_report(&snapshot());
        assert!(report.starts_with("## Web server statistics"));
        assert!(report.contains("### requests_total - 120"));
        assert!(report.contains("### p50_response_time - 3.00ms"));
        assert_eq!(report.lines().count(), 16);
    }
}
