use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "credclean=info,credclean_cleaner=info,credclean_io=info";
const QUIET_DIRECTIVES: &str = "warn";

/// Install the stderr subscriber. `RUST_LOG` wins over both defaults.
pub fn init(quiet: bool) {
    let fallback = if quiet { QUIET_DIRECTIVES } else { DEFAULT_DIRECTIVES };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second install (tests calling twice) is harmless; ignore it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
