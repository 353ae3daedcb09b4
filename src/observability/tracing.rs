use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    trace::{self, RandomIdGenerator, Sampler},
    Resource,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn, Subscriber};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{
    fmt::{format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Failed to initialize OpenTelemetry: {0}")]
    OpenTelemetryInit(#[from] opentelemetry::trace::TraceError),
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Initialize structured logging and, when an OTLP endpoint is configured,
/// OpenTelemetry trace export.
pub fn init_observability(
    service_name: &str,
    service_version: &str,
    otlp_endpoint: Option<&str>,
    log_level: &str,
    enable_json_logging: bool,
) -> Result<(), ObservabilityError> {
    let tracer = match otlp_endpoint.filter(|endpoint| !endpoint.is_empty()) {
        Some(endpoint) => Some(init_opentelemetry_tracer(
            service_name,
            service_version,
            endpoint,
        )?),
        None => None,
    };
    let exporting = tracer.is_some();
    let opentelemetry_layer = tracer.map(OpenTelemetryLayer::new);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter(service_name, log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(opentelemetry_layer)
        .with(fmt_layer(enable_json_logging, std::io::stdout))
        .try_init()
        .map_err(|e| ObservabilityError::TracingInit(e.to_string()))?;

    info!(
        service = service_name,
        version = service_version,
        otlp_export = exporting,
        "Observability initialized"
    );
    Ok(())
}

/// Default directives when `RUST_LOG` is unset: `log_level` for this service
/// and tower-http, warnings only from the Mongo driver.
pub(crate) fn log_filter(service_name: &str, log_level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "{}={},tower_http={},mongodb=warn",
        service_name.replace('-', "_"),
        log_level,
        log_level
    ))
}

/// Human-readable or JSON output; levels are left to the `EnvFilter`
pub(crate) fn fmt_layer<S, W>(json: bool, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_level(true)
            .with_file(false)
            .with_line_number(false)
            .log_internal_errors(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(writer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(false)
            .with_line_number(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(writer)
            .boxed()
    }
}

/// Extract the current trace ID from the active span context
pub fn get_current_trace_id() -> Option<String> {
    use opentelemetry::trace::TraceContextExt;
    use tracing_opentelemetry::OpenTelemetrySpanExt;

    let current_span = tracing::Span::current();
    let context = current_span.context();
    let span = context.span();
    let span_context = span.span_context();

    if span_context.is_valid() {
        Some(span_context.trace_id().to_string())
    } else {
        None
    }
}

/// Log an info message tagged with the active trace ID
#[macro_export]
macro_rules! info_with_trace {
    ($($arg:tt)*) => {
        if let Some(trace_id) = $crate::observability::tracing::get_current_trace_id() {
            tracing::info!(trace_id = %trace_id, $($arg)*);
        } else {
            tracing::info!($($arg)*);
        }
    };
}

/// Log an error message tagged with the active trace ID
#[macro_export]
macro_rules! error_with_trace {
    ($($arg:tt)*) => {
        if let Some(trace_id) = $crate::observability::tracing::get_current_trace_id() {
            tracing::error!(trace_id = %trace_id, $($arg)*);
        } else {
            tracing::error!($($arg)*);
        }
    };
}

/// Log a warning tagged with the active trace ID
#[macro_export]
macro_rules! warn_with_trace {
    ($($arg:tt)*) => {
        if let Some(trace_id) = $crate::observability::tracing::get_current_trace_id() {
            tracing::warn!(trace_id = %trace_id, $($arg)*);
        } else {
            tracing::warn!($($arg)*);
        }
    };
}

fn init_opentelemetry_tracer(
    service_name: &str,
    service_version: &str,
    otlp_endpoint: &str,
) -> Result<opentelemetry_sdk::trace::Tracer, ObservabilityError> {
    let resource = Resource::new(vec![
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("service.version", service_version.to_string()),
        KeyValue::new("service.namespace", "hungryharmony"),
        KeyValue::new("telemetry.sdk.name", "opentelemetry"),
        KeyValue::new("telemetry.sdk.language", "rust"),
    ]);

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(otlp_endpoint);

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            trace::config()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_max_events_per_span(64)
                .with_max_attributes_per_span(16)
                .with_resource(resource),
        )
        .with_batch_config(
            trace::BatchConfig::default()
                .with_max_queue_size(2048)
                .with_max_export_batch_size(512)
                .with_max_export_timeout(Duration::from_secs(30))
                .with_scheduled_delay(Duration::from_millis(500)),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)?;

    Ok(tracer)
}

/// Flush and shut down the tracer provider, giving up after five seconds
pub async fn shutdown_observability() {
    info!("Shutting down observability");

    // The provider shutdown blocks while spans are flushed
    let shutdown_task = tokio::task::spawn_blocking(|| {
        global::shutdown_tracer_provider();
    });

    match tokio::time::timeout(Duration::from_secs(5), shutdown_task).await {
        Ok(Ok(())) => {
            info!("Observability shutdown completed successfully");
        }
        Ok(Err(e)) => {
            warn!("Error during observability shutdown: {}", e);
        }
        Err(_) => {
            warn!("Observability shutdown timed out after 5 seconds");
        }
    }
}

/// In-memory log sink for asserting on formatted output
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

#[cfg(test)]
impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
impl CapturedLogs {
    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_observability_timeout() {
        let start = std::time::Instant::now();
        shutdown_observability().await;
        let elapsed = start.elapsed();

        assert!(
            elapsed < Duration::from_secs(6),
            "Shutdown took too long: {:?}",
            elapsed
        );
    }

    #[test]
    fn test_trace_id_absent_outside_spans() {
        assert!(get_current_trace_id().is_none());
    }

    fn capture(json: bool, log_level: &str) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::registry()
            .with(log_filter("hungryharmony-rs", log_level))
            .with(fmt_layer(json, move || writer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(target: "hungryharmony_rs::store", "debug detail");
            tracing::info!(target: "hungryharmony_rs::store", "info detail");
        });

        logs.text()
    }

    #[test]
    fn test_debug_level_reaches_output() {
        for json in [false, true] {
            let output = capture(json, "debug");
            assert!(output.contains("debug detail"), "json={}: {}", json, output);
            assert!(output.contains("info detail"));
        }
    }

    #[test]
    fn test_info_level_hides_debug() {
        let output = capture(false, "info");
        assert!(!output.contains("debug detail"));
        assert!(output.contains("info detail"));
    }

    #[test]
    fn test_log_filter_lowers_service_name() {
        let filter = log_filter("hungryharmony-rs", "trace").to_string();
        assert!(filter.contains("hungryharmony_rs=trace"));
        assert!(filter.contains("mongodb=warn"));
    }

    #[test]
    fn test_second_init_reports_error() {
        let _ = init_observability("test-service", "0.1.0", None, "info", false);
        let second = init_observability("test-service", "0.1.0", None, "info", true);

        assert!(matches!(second, Err(ObservabilityError::TracingInit(_))));
    }
}
