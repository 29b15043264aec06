//! Logging initialisation for the host runtime.
//!
//! Core crate log macros are compiled against `tracing` here, so one
//! subscriber collects both runtime and controller events.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset; `verbose` raises it to debug.
pub fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("agrispray_core=debug,agrispray_sitl=debug,info")
    } else {
        EnvFilter::new("info")
    }
}

/// Initialise the global subscriber.
///
/// `RUST_LOG` takes precedence over `verbose`. Set `json` for one JSON
/// object per event.
pub fn init(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directives(filter: EnvFilter) -> Vec<String> {
        filter.to_string().split(',').map(str::to_owned).collect()
    }

    // The global subscriber can only be set once per process, so only the
    // filters are checked here.
    #[test]
    fn test_default_filter_is_info() {
        assert_eq!(directives(default_filter(false)), ["info"]);
    }

    #[test]
    fn test_verbose_filter_raises_own_crates() {
        let directives = directives(default_filter(true));
        assert_eq!(directives.len(), 3);
        assert!(directives.iter().any(|d| d == "agrispray_core=debug"));
        assert!(directives.iter().any(|d| d == "agrispray_sitl=debug"));
        assert!(directives.iter().any(|d| d == "info"));
    }
}
