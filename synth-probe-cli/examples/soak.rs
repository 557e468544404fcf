//! Runs the probe several times in a row against the database named by the `POSTGRES_*`
//! variables. can be run with `cargo run --example soak -- 100`

use std::error::Error;
use std::time::{Duration, Instant};

use log::{info, warn};
use rand::thread_rng;

use synth_probe::config::ProbeConfig;
use synth_probe::probe;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let runs: usize = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 10,
    };
    let config = ProbeConfig::from_env();
    let mut rng = thread_rng();

    let start = Instant::now();
    let mut failed = 0;
    let mut inserting = Duration::ZERO;
    for _ in 0..runs {
        match probe::run(&config, &mut rng) {
            Ok(report) => inserting += report.user_elapsed + report.order_elapsed,
            Err(e) => {
                warn!("Probe failed: {}", e.describe());
                failed += 1;
            }
        }
    }

    info!(
        "{} probes ({} failed) took: {:.2?}, {:.2?} of it in inserts",
        runs,
        failed,
        start.elapsed(),
        inserting
    );
    Ok(())
}
