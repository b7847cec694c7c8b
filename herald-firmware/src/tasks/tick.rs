//! Tick task for time-based updates
//!
//! Drives the engine's periodic work:
//! - Pending deletion timeout
//! - Idle completion of buffered writes
//! - Clock and relative-time refresh

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::board::HeraldEngine;

/// Tick task - advances the engine once per tick interval
#[embassy_executor::task]
pub async fn tick_task(engine: &'static HeraldEngine, interval_ms: u32) {
    info!("Tick task started ({}ms)", interval_ms);

    let mut ticker = Ticker::every(Duration::from_millis(interval_ms as u64));

    loop {
        ticker.next().await;
        engine.tick();
    }
}
