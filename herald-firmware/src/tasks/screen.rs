//! Screen task
//!
//! Redraws whenever the engine publishes a change. This board has no panel
//! driver yet, so the screen is written to the defmt log.

use defmt::*;

use crate::board::HeraldEngine;
use crate::channels::SCREEN_UPDATE;

/// Screen task - renders the published screen state
#[embassy_executor::task]
pub async fn screen_task(engine: &'static HeraldEngine) {
    info!("Screen task started");

    loop {
        SCREEN_UPDATE.wait().await;

        let (screen, age, security, rssi) = engine.lock(|e| {
            (
                e.hooks().screen().clone(),
                e.relative_time(e.store().cursor()),
                e.link().security_level(),
                e.link().rssi(),
            )
        });

        info!(
            "[{}] {} (L{}, {} dBm)",
            screen.clock.as_str(),
            screen.status.label(),
            security.as_u8(),
            rssi.unwrap_or(0)
        );

        if let Some(passkey) = screen.passkey {
            info!("Pairing - confirm passkey {}", passkey.digits().as_str());
            continue;
        }

        match (screen.position, screen.current) {
            (Some((index, total)), Some(current)) => {
                info!(
                    "{}/{} ({} unread){}",
                    index,
                    total,
                    screen.unread,
                    if screen.deleting { " - deleting, BACK to undo" } else { "" }
                );
                info!(
                    "{} {} | {} | {}",
                    current.category.label(),
                    current.app_name.as_str(),
                    current.title.as_str(),
                    age.as_ref().map(|a| a.as_str()).unwrap_or("")
                );
                info!("{}", current.body.as_str());
            }
            _ => info!("No notifications"),
        }
    }
}
