use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Installs the global subscriber. `RUST_LOG` wins over the built-in filter.
/// JSON output writes one object per line for log shippers.
pub fn init_logger(debug: bool, json: bool) {
    let fallback = if debug {
        "contact_backend=debug,tower_http=debug,info"
    } else {
        "contact_backend=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let output = if json {
        fmt::layer().json().with_current_span(false).boxed()
    } else {
        fmt::layer()
            .compact()
            .with_target(debug)
            .with_thread_ids(false)
            .boxed()
    };

    tracing_subscriber::registry().with(filter).with(output).init();
}
