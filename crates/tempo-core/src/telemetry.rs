/// Initialise the global tracing subscriber.
///
/// Honours `RUST_LOG` when set, otherwise defaults to info-level output for
/// the tempo crates.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tempo=info".into()),
        )
        .init();
}
