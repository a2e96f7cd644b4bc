use std::io;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{
    fmt::{format::FmtSpan, time::UtcTime},
    prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

pub(crate) fn init() -> Result<()> {
    let fmt_env_filter = env_filter_merge_from_environment("info", "MEDIAMS_LOG_LEVEL")?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_timer(UtcTime::rfc_3339())
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_filter(fmt_env_filter);

    let registry = tracing_subscriber::registry().with(fmt_layer);

    #[cfg(feature = "otlp")]
    let registry = registry.with(otlp::layer()?);

    registry
        .try_init()
        .context("Failed to set global default tracing subscriber")?;

    Ok(())
}

fn env_filter_merge_from_environment(
    default_directives: &'static str,
    env_var: &'static str,
) -> Result<EnvFilter> {
    let mut filter = EnvFilter::builder()
        .parse(default_directives)
        .with_context(|| anyhow!("Default directives were invalid: {default_directives}"))?;

    if let Ok(env_value) = std::env::var(env_var) {
        for env_directive in env_value.split(',').filter(|d| !d.is_empty()) {
            match env_directive.parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(err) => eprintln!("WARN ignoring log directive: {env_directive:?}: {err}"),
            }
        }
    }

    Ok(filter)
}

#[cfg(feature = "otlp")]
mod otlp {
    use std::collections::HashMap;

    use anyhow::{anyhow, Context, Result};
    use opentelemetry::{
        global,
        propagation::TextMapPropagator,
        sdk::{
            propagation::{BaggagePropagator, TextMapCompositePropagator, TraceContextPropagator},
            trace as sdktrace, Resource,
        },
        KeyValue,
    };
    use opentelemetry_otlp::WithExportConfig;
    use tracing_subscriber::{registry::LookupSpan, Layer};
    use url::Url;

    const ENDPOINT: &str = "OTLP_ENDPOINT";
    const HEADER_PREFIX: &str = "OTLP_";

    /// OpenTelemetry export layer, enabled when `OTLP_ENDPOINT` is set.
    pub(super) fn layer<S>() -> Result<Option<impl Layer<S>>>
    where
        S: tracing::Subscriber + for<'span> LookupSpan<'span>,
    {
        let endpoint = match std::env::var(ENDPOINT) {
            Ok(endpoint) => endpoint,
            Err(_) => return Ok(None),
        };
        std::env::remove_var(ENDPOINT);

        global::set_text_map_propagator(new_propagator());
        let tracer = new_tracer(&endpoint).context("Failed to create tracer")?;

        let otel_env_filter =
            super::env_filter_merge_from_environment("trace,polling=off", "MEDIAMS_TRACE_LEVEL")?;
        Ok(Some(
            tracing_opentelemetry::layer()
                .with_tracer(tracer)
                .with_filter(otel_env_filter),
        ))
    }

    fn new_propagator() -> impl TextMapPropagator {
        TextMapCompositePropagator::new(vec![
            Box::new(BaggagePropagator::new()),
            Box::new(TraceContextPropagator::new()),
        ])
    }

    fn new_tracer(endpoint: &str) -> Result<sdktrace::Tracer> {
        let endpoint = Url::parse(endpoint).context("Invalid OTLP endpoint")?;

        let headers: HashMap<_, _> = std::env::vars()
            .filter_map(|(name, value)| {
                let header_name = name
                    .strip_prefix(HEADER_PREFIX)?
                    .replace('_', "-")
                    .to_ascii_lowercase();
                Some((header_name, value))
            })
            .collect();

        let endpoint = format!(
            "{}:{}",
            endpoint
                .host_str()
                .ok_or_else(|| anyhow!("OTLP endpoint has no host"))?,
            endpoint
                .port_or_known_default()
                .ok_or_else(|| anyhow!("OTLP endpoint has no port"))?
        );

        let exporter = opentelemetry_otlp::new_exporter()
            .grpcio()
            .with_endpoint(endpoint)
            .with_headers(headers)
            .with_tls(true);

        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(exporter)
            .with_trace_config(
                sdktrace::config().with_resource(Resource::new(vec![KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                    "mediams",
                )])),
            )
            .install_batch(opentelemetry::runtime::AsyncStd)?;

        Ok(tracer)
    }
}
