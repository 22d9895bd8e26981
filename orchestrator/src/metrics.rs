use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};

pub static SEARCH_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "search_requests_total",
        "Search requests by retrieval mode",
        &["mode"]
    )
    .expect("search_requests_total registers once")
});

pub static SEARCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "search_request_duration_seconds",
        "End-to-end latency of execute_search"
    )
    .expect("search_request_duration_seconds registers once")
});

pub static UPSTREAM_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "search_upstream_errors_total",
        "Failed calls to the embedding or search service",
        &["stage"]
    )
    .expect("search_upstream_errors_total registers once")
});

/// Renders the default registry in the text exposition format.
pub fn render() -> (Vec<u8>, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    (buffer, encoder.format_type().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_render() {
        SEARCH_REQUESTS.with_label_values(&["hybrid"]).inc();

        let (body, content_type) = render();
        let text = String::from_utf8(body).unwrap();

        assert!(content_type.starts_with("text/plain"));
        assert!(text.contains("search_requests_total"));
    }
}
