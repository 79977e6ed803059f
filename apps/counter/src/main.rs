//! # Kasa Counter Entry Point
//!
//! Started by the host UI as a child process; talks JSON lines on
//! stdin/stdout. The actual setup is in lib.rs so tests can reach it.

use kasa_counter::config::CounterConfig;
use kasa_counter::CounterError;

#[tokio::main]
async fn main() -> Result<(), CounterError> {
    let config = CounterConfig::load()?;
    kasa_counter::init_tracing(&config.log_filter);

    kasa_counter::run(config).await
}
