//! Button input task
//!
//! Turns presses on the four navigation buttons into engine actions:
//!
//! | Button | Short press | Long press |
//! |--------|-------------|------------|
//! | NEXT   | Advance     | Advance    |
//! | PREV   | GoBack      | GoBack     |
//! | OK     | Confirm while pairing, else MarkRead | RequestDelete |
//! | BACK   | Cancel      | Cancel     |

use defmt::*;
use embassy_futures::select::{select4, Either4};
use embassy_rp::gpio::Input;
use embassy_time::{with_timeout, Duration, Timer};

use herald_core::UserAction;

use crate::board::HeraldEngine;
use crate::LONG_PRESS_MS;

/// Debounce interval after an edge
const DEBOUNCE_MS: u64 = 20;

/// Navigation buttons (active low)
pub struct Buttons {
    pub next: Input<'static>,
    pub prev: Input<'static>,
    pub ok: Input<'static>,
    pub back: Input<'static>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
enum Button {
    Next,
    Prev,
    Ok,
    Back,
}

/// Input task - waits for button presses and forwards actions to the engine
#[embassy_executor::task]
pub async fn input_task(buttons: Buttons, engine: &'static HeraldEngine) {
    info!("Input task started");

    let Buttons {
        mut next,
        mut prev,
        mut ok,
        mut back,
    } = buttons;

    loop {
        let button = match select4(
            next.wait_for_falling_edge(),
            prev.wait_for_falling_edge(),
            ok.wait_for_falling_edge(),
            back.wait_for_falling_edge(),
        )
        .await
        {
            Either4::First(()) => Button::Next,
            Either4::Second(()) => Button::Prev,
            Either4::Third(()) => Button::Ok,
            Either4::Fourth(()) => Button::Back,
        };

        Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;

        let action = match button {
            Button::Next if next.is_low() => Some(UserAction::Advance),
            Button::Prev if prev.is_low() => Some(UserAction::GoBack),
            Button::Back if back.is_low() => Some(UserAction::Cancel),
            Button::Ok if ok.is_low() => {
                let released =
                    with_timeout(Duration::from_millis(LONG_PRESS_MS), ok.wait_for_rising_edge())
                        .await;
                match released {
                    Ok(()) if engine.lock(|e| e.link().is_pairing()) => Some(UserAction::Confirm),
                    Ok(()) => Some(UserAction::MarkRead),
                    Err(_) => {
                        ok.wait_for_rising_edge().await;
                        Some(UserAction::RequestDelete)
                    }
                }
            }
            // Bounce
            _ => None,
        };

        if let Some(action) = action {
            debug!("Button {:?} -> {:?}", button, action);
            if let Err(e) = engine.handle_action(action) {
                debug!("Action {:?} not applied: {:?}", action, e);
            }
        }

        // Debounce after release
        Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
    }
}
