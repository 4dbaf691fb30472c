//! Tracing subscriber initialization with structured logging and optional
//! OpenTelemetry trace export.
//!
//! # Usage
//!
//! ```no_run
//! // Human-readable logs at warn level
//! kindred_observe::tracing_setup::init_tracing("warn", false, false).unwrap();
//!
//! // JSON logs plus OpenTelemetry spans on stdout
//! kindred_observe::tracing_setup::init_tracing("info", true, true).unwrap();
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use std::sync::OnceLock;

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Default `EnvFilter` directive for a `-v` count.
pub fn default_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info,kindred=debug",
        _ => "trace",
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. `json` switches the fmt
/// layer to one JSON object per line. `enable_otel` additionally bridges
/// spans to OpenTelemetry through a stdout exporter.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(
    default_filter: &str,
    json: bool,
    enable_otel: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    if enable_otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("kindred");
        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// No-op when OTel was not enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}
