use tracing_subscriber::EnvFilter;

use crate::args::{Args, LogFormat};

/// Logs go to stderr; stdout carries the JSON output.
pub fn init(args: &Args) {
    // Start from RUST_LOG and let --log-level set the default directive.
    let filter = EnvFilter::from_default_env().add_directive(args.log_level.into());

    let trace_sub = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!args.no_color);

    match args.log_format {
        LogFormat::Structured => trace_sub.json().init(),
        LogFormat::Debug => trace_sub.pretty().init(),
        LogFormat::Text => trace_sub.init(),
    };
}
