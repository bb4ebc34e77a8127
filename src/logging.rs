use tracing_subscriber::{prelude::*, EnvFilter};

/// Initialize logging for the CLI and the MCP server.
/// This will:
/// - Use `RUST_LOG` when set, the given level otherwise
/// - Filter out noisy logs from the HTTP stack
/// - Write to stderr, since stdout carries command output or MCP messages
pub fn init_logging(level: &str) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    for directive in ["hyper=off", "hyper_util=off", "h2=off", "rustls=off"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();
}
