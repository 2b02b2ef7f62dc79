use std::time::Instant;

use tracing_subscriber::EnvFilter;

/// Banner-style logger for long integration tests.
///
/// Creating one also routes `tracing` output of the library to the test
/// harness writer, filtered by `RUST_LOG` (default `skilltest=debug`).
pub struct TestLogger {
    test_name: String,
    start_time: Instant,
}

impl TestLogger {
    pub fn new(test_name: &str) -> Self {
        init_test_tracing();
        let separator = "=".repeat(60);
        println!("\n{separator}");
        println!("[TEST START] {test_name}");
        println!("{separator}");
        Self {
            test_name: test_name.to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn step(&self, description: &str) {
        println!("[STEP] {description}");
    }

    pub fn log_input<T: std::fmt::Debug>(&self, name: &str, value: &T) {
        println!("[INPUT] {name}: {value:?}");
    }

    pub fn log_expected<T: std::fmt::Debug>(&self, value: &T) {
        println!("[EXPECTED] {value:?}");
    }

    pub fn log_actual<T: std::fmt::Debug>(&self, value: &T) {
        println!("[ACTUAL] {value:?}");
    }

    pub fn pass(&self) {
        let elapsed = self.start_time.elapsed();
        println!("[RESULT] {} PASSED in {elapsed:?}", self.test_name);
        println!("{}\n", "=".repeat(60));
    }
}

/// Install a test-writer subscriber once per test binary.
pub fn init_test_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skilltest=debug"));
    // A second install in the same process fails; the first one wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
