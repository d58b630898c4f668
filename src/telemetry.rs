//! Logging and distributed tracing setup

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{AppConfig, LogFormat};

/// Keeps the trace exporter alive; call [`TelemetryGuard::shutdown`] before
/// exit so buffered spans are flushed.
#[must_use]
pub struct TelemetryGuard {
    exporting: bool,
}

impl TelemetryGuard {
    /// Whether spans are being exported to a collector
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub fn shutdown(self) {
        #[cfg(feature = "otel")]
        if self.exporting {
            opentelemetry::global::shutdown_tracer_provider();
        }
    }
}

/// Install the global subscriber: env filter, optional OTLP export, then the
/// JSON or text formatter.
pub fn init_tracing(config: &AppConfig) -> Result<TelemetryGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.logging.level.clone()))
        .unwrap_or_else(|_| EnvFilter::new("album_service=info,tower_http=info"));

    #[cfg(feature = "otel")]
    let otel_layer = otlp::build_tracer(&config.telemetry)?
        .map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));
    #[cfg(not(feature = "otel"))]
    let otel_layer: Option<tracing_subscriber::layer::Identity> = None;

    let exporting = otel_layer.is_some();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer);

    match config.logging.format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }

    let telemetry = &config.telemetry;
    if exporting {
        tracing::info!(
            service = telemetry.service_name(),
            env = telemetry.environment(),
            version = telemetry.service_version(),
            endpoint = telemetry.otlp_endpoint.as_deref().unwrap_or_default(),
            "Exporting traces over OTLP"
        );
    } else if telemetry.otlp_endpoint.is_some() {
        tracing::warn!("telemetry.otlp_endpoint is set but this build lacks the `otel` feature");
    }

    Ok(TelemetryGuard { exporting })
}

#[cfg(feature = "otel")]
mod otlp {
    use anyhow::{Context, Result};
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};

    use crate::config::TelemetrySection;

    /// Build the OTLP batch pipeline and register it as the global provider.
    /// Returns `None` when no collector endpoint is configured.
    pub(super) fn build_tracer(telemetry: &TelemetrySection) -> Result<Option<sdktrace::Tracer>> {
        let Some(endpoint) = telemetry.otlp_endpoint.as_deref() else {
            return Ok(None);
        };

        let mut attributes = vec![
            KeyValue::new("service.name", telemetry.service_name().to_string()),
            KeyValue::new("deployment.environment", telemetry.environment().to_string()),
            KeyValue::new("service.version", telemetry.service_version().to_string()),
        ];
        if let Some(host) = hostname::get().ok().and_then(|h| h.into_string().ok()) {
            attributes.push(KeyValue::new("host.name", host));
        }

        let provider = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(
                opentelemetry_otlp::new_exporter()
                    .tonic()
                    .with_endpoint(endpoint),
            )
            .with_trace_config(sdktrace::Config::default().with_resource(Resource::new(attributes)))
            .install_batch(runtime::Tokio)
            .with_context(|| format!("failed to install OTLP exporter for {}", endpoint))?;

        let tracer = provider.tracer(telemetry.service_name().to_string());
        opentelemetry::global::set_tracer_provider(provider);

        Ok(Some(tracer))
    }
}
