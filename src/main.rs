//! specbmc test harness entry point

fn main() {
    // Diagnostics go to stderr; stdout carries the test report.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    specbmc_harness::cli::run();
}
