use axum::http::StatusCode;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct RequestMetrics {
    counts: Mutex<HashMap<(String, u16), u64>>,
    latency_ns: Mutex<HashMap<String, Vec<u64>>>,
}

impl RequestMetrics {
    pub async fn observe_request(&self, route: &str, status: StatusCode, latency: Duration) {
        let mut counts = self.counts.lock().await;
        *counts
            .entry((route.to_string(), status.as_u16()))
            .or_insert(0) += 1;
        drop(counts);
        let mut latency_map = self.latency_ns.lock().await;
        latency_map
            .entry(route.to_string())
            .or_default()
            .push(latency.as_nanos() as u64);
    }

    /// Text exposition, one counter line per (route, status) and latency
    /// quantiles per route.
    pub async fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str("# TYPE nocap_requests_total counter\n");
        let counts = self.counts.lock().await;
        let mut count_lines: Vec<((String, u16), u64)> =
            counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
        drop(counts);
        count_lines.sort();
        for ((route, status), n) in count_lines {
            out.push_str(&format!(
                "nocap_requests_total{{route=\"{route}\",status=\"{status}\"}} {n}\n"
            ));
        }
        out.push_str("# TYPE nocap_request_latency_ms summary\n");
        let latency = self.latency_ns.lock().await;
        let mut routes: Vec<&String> = latency.keys().collect();
        routes.sort();
        for route in routes {
            let samples = &latency[route];
            for (quantile, value_ns) in [
                ("0.5", percentile(samples, 0.50)),
                ("0.95", percentile(samples, 0.95)),
                ("0.99", percentile(samples, 0.99)),
            ] {
                out.push_str(&format!(
                    "nocap_request_latency_ms{{route=\"{route}\",quantile=\"{quantile}\"}} {:.3}\n",
                    value_ns as f64 / 1_000_000.0
                ));
            }
        }
        out
    }
}

fn percentile(samples: &[u64], q: f64) -> u64 {
    if samples.is_empty() {
        return 0;
    }
    let mut sorted: Vec<u64> = samples.to_vec();
    sorted.sort_unstable();
    let idx = ((sorted.len() as f64) * q).ceil() as usize;
    sorted[idx.saturating_sub(1).min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exposition_contains_counters_and_quantiles() {
        let metrics = RequestMetrics::default();
        metrics
            .observe_request("/healthz", StatusCode::OK, Duration::from_millis(1))
            .await;
        metrics
            .observe_request("/healthz", StatusCode::OK, Duration::from_millis(3))
            .await;
        let text = metrics.render_text().await;
        assert!(text.contains("nocap_requests_total{route=\"/healthz\",status=\"200\"} 2"));
        assert!(text.contains("quantile=\"0.95\""));
    }

    #[test]
    fn percentile_of_empty_is_zero() {
        assert_eq!(percentile(&[], 0.95), 0);
    }

    #[test]
    fn percentile_picks_upper_rank() {
        let samples: Vec<u64> = (1..=100).collect();
        assert_eq!(percentile(&samples, 0.50), 50);
        assert_eq!(percentile(&samples, 0.95), 95);
    }
}
