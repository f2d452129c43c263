use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the stderr subscriber used by the binaries; `RUST_LOG` overrides the filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,grant_harvester=info,reqwest=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
