//! Logging setup shared by the binaries.

use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_DIRECTIVES: &[&str] = &["ragchat=info", "tower_http=info"];

/// Installs a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `directives` for targets `RUST_LOG` does not mention. Calling it twice is
/// harmless.
pub fn init_tracing(directives: &[&str]) {
    let mut filter = EnvFilter::from_default_env();
    for directive in directives {
        match directive.parse::<Directive>() {
            Ok(d) => filter = filter.add_directive(d),
            Err(e) => eprintln!("Ignoring invalid log directive '{}': {}", directive, e),
        }
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .try_init();
}
