pub mod build_info;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Default directive applied when neither `RUST_LOG` nor the config supplies one.
pub const DEFAULT_LOG_FILTER: &str = "catering_core=info";

/// Initializes tracing, preferring `RUST_LOG` over the supplied fallback directive.
pub fn init_tracing_with(fallback: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(fallback))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        // A subscriber installed elsewhere (tests, embedding hosts) wins.
        let _ = fmt().with_env_filter(filter).try_init();
    });
}
