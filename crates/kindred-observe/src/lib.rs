//! Observability for Kindred: structured logging and optional OpenTelemetry
//! export of the `gen_ai.*` completion spans.

pub mod tracing_setup;
