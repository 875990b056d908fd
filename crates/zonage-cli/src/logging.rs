#![forbid(unsafe_code)]

use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "ZONAGE_LOG";

/// Filter directive for a run: `--verbose` wins, then `ZONAGE_LOG`, then
/// warnings only.
pub fn directive(verbose: bool, from_env: Option<&str>) -> String {
    match (verbose, from_env) {
        (true, _) => "debug".to_owned(),
        (false, Some(env)) if !env.trim().is_empty() => env.trim().to_owned(),
        _ => "warn".to_owned(),
    }
}

/// Install the stderr subscriber. A second call is a no-op.
pub fn init(verbose: bool) {
    let from_env = std::env::var(LOG_ENV).ok();
    let directive = directive(verbose, from_env.as_deref());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::directive;

    #[test]
    fn verbose_overrides_environment() {
        assert_eq!(directive(true, Some("zonage_layout=trace")), "debug");
    }

    #[test]
    fn environment_used_when_set() {
        assert_eq!(
            directive(false, Some(" zonage_layout=trace ")),
            "zonage_layout=trace"
        );
        assert_eq!(directive(false, Some("  ")), "warn");
        assert_eq!(directive(false, None), "warn");
    }

    #[test]
    fn init_twice_is_harmless() {
        super::init(false);
        super::init(true);
    }
}
