use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber shared by both binaries.
///
/// `RUST_LOG` wins when set; otherwise only this library and the server
/// binary log, at `level`.
pub fn init(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!(
            "{}={},voucher_server={}",
            env!("CARGO_CRATE_NAME"),
            level,
            level
        )),
    };

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
