//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.
//! Tasks that touch the engine share one [`HeraldEngine`](crate::board::HeraldEngine).

pub mod input;
pub mod radio_rx;
pub mod radio_tx;
pub mod screen;
pub mod tick;

pub use input::{input_task, Buttons};
pub use radio_rx::radio_rx_task;
pub use radio_tx::radio_tx_task;
pub use screen::screen_task;
pub use tick::tick_task;
