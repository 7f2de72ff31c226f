use std::time::Duration;

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, TextEncoder};

use crate::models::NotificationKind;

static GRPC_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "notification_service_grpc_requests_total",
            "Total gRPC requests handled by notification-service",
        ),
        &["method", "code"],
    )
    .expect("failed to create notification_service_grpc_requests_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register notification_service_grpc_requests_total");
    counter
});

static GRPC_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let histogram = HistogramVec::new(
        HistogramOpts::new(
            "notification_service_grpc_request_duration_seconds",
            "gRPC request latency for notification-service",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
        &["method"],
    )
    .expect("failed to create notification_service_grpc_request_duration_seconds");
    prometheus::default_registry()
        .register(Box::new(histogram.clone()))
        .expect("failed to register notification_service_grpc_request_duration_seconds");
    histogram
});

static NOTIFICATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "notification_service_notifications_total",
            "Notifications received, by kind and outcome",
        ),
        &["kind", "outcome"],
    )
    .expect("failed to create notification_service_notifications_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register notification_service_notifications_total");
    counter
});

pub fn observe_grpc_request(method: &str, code: tonic::Code, elapsed: Duration) {
    let code_label = format!("{:?}", code);
    GRPC_REQUESTS_TOTAL
        .with_label_values(&[method, &code_label])
        .inc();
    GRPC_REQUEST_DURATION_SECONDS
        .with_label_values(&[method])
        .observe(elapsed.as_secs_f64());
}

pub fn record_notification(kind: NotificationKind, accepted: bool) {
    let outcome = if accepted { "accepted" } else { "rejected" };
    NOTIFICATIONS_TOTAL
        .with_label_values(&[kind.as_str(), outcome])
        .inc();
}

/// Encode every metric in the default registry in the text exposition format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

pub async fn serve_metrics() -> HttpResponse {
    match render_metrics() {
        Ok(body) => HttpResponse::Ok()
            .content_type(TextEncoder::new().format_type())
            .body(body),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifications_counted_by_kind_and_outcome() {
        let rejected = NOTIFICATIONS_TOTAL.with_label_values(&["unknown", "rejected"]);
        let accepted = NOTIFICATIONS_TOTAL.with_label_values(&["goodbye", "accepted"]);
        let rejected_before = rejected.get();
        let accepted_before = accepted.get();

        record_notification(NotificationKind::Unknown, false);
        record_notification(NotificationKind::Goodbye, true);

        assert!(rejected.get() > rejected_before);
        assert!(accepted.get() > accepted_before);

        let body = render_metrics().unwrap();
        assert!(body.contains(r#"kind="unknown",outcome="rejected""#));
    }

    #[test]
    fn test_recorded_metrics_are_rendered() {
        record_notification(NotificationKind::Hello, true);
        observe_grpc_request("SendMessage", tonic::Code::Ok, Duration::from_millis(3));

        let body = render_metrics().unwrap();
        assert!(body.contains("notification_service_notifications_total"));
        assert!(body.contains("notification_service_grpc_requests_total"));
        assert!(body.contains("notification_service_grpc_request_duration_seconds"));
    }
}
