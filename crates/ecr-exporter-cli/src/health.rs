//! Process health report.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Health report served on `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Always `"OK"` while the process serves requests.
    pub status: &'static str,
    /// Uptime, e.g. `1h2m3s`.
    pub uptime: String,
    /// Uptime in whole seconds.
    pub uptime_seconds: u64,
    /// Report time, RFC 3339.
    pub timestamp: String,
    /// Exporter version.
    pub version: &'static str,
    /// CPU and runtime figures.
    pub cpu: CpuStats,
}

/// CPU and runtime figures.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CpuStats {
    /// Available parallelism.
    pub num_cpu: usize,
    /// Tokio worker threads, 0 outside a runtime.
    pub runtime_workers: usize,
}

impl HealthStatus {
    /// Builds a report for a process started at `started`.
    pub fn collect(started: Instant) -> Self {
        let uptime = started.elapsed();
        let runtime_workers = tokio::runtime::Handle::try_current()
            .map(|handle| handle.metrics().num_workers())
            .unwrap_or(0);

        Self {
            status: "OK",
            uptime: humanize(uptime),
            uptime_seconds: uptime.as_secs(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            version: env!("CARGO_PKG_VERSION"),
            cpu: CpuStats {
                num_cpu: std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
                runtime_workers,
            },
        }
    }

    /// Renders the report as an auto-refreshing HTML page.
    pub fn to_html(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>ECR Exporter Health</title>
    <meta http-equiv="refresh" content="30">
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; }}
        .status {{ color: green; font-weight: bold; }}
        .value {{ font-weight: bold; color: #333; }}
        table {{ border-collapse: collapse; width: 100%; max-width: 600px; }}
        th, td {{ border: 1px solid #ddd; padding: 12px; text-align: left; }}
        th {{ background-color: #f2f2f2; }}
    </style>
</head>
<body>
    <h1>ECR Prometheus Exporter Health Status</h1>
    <p class="status">Status: {status}</p>
    <p>Last Updated: {timestamp}</p>

    <h2>System Metrics</h2>
    <table>
        <tr><th>Metric</th><th>Value</th></tr>
        <tr><td>Uptime</td><td class="value">{uptime}</td></tr>
        <tr><td>Version</td><td class="value">{version}</td></tr>
        <tr><td>CPU Cores</td><td class="value">{num_cpu}</td></tr>
        <tr><td>Runtime Workers</td><td class="value">{workers}</td></tr>
    </table>

    <p style="margin-top: 30px;">
        <a href="/">Home</a> |
        <a href="/metrics">View Metrics</a> |
        <a href="/health?format=json">JSON Format</a>
    </p>
</body>
</html>
"#,
            status = self.status,
            timestamp = self.timestamp,
            uptime = self.uptime,
            version = self.version,
            num_cpu = self.cpu.num_cpu,
            workers = self.cpu.runtime_workers,
        )
    }
}

/// Formats a duration as `XhYmZs`, dropping leading zero units.
pub fn humanize(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}
