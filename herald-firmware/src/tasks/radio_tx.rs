//! Radio UART transmit task
//!
//! Sends queued host commands to the BLE coprocessor.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use herald_protocol::bridge::MAX_FRAME_SIZE;

use crate::channels::LINK_COMMANDS;

/// Radio TX task - drains the link command queue onto the UART
#[embassy_executor::task]
pub async fn radio_tx_task(mut tx: BufferedUartTx) {
    info!("Radio TX task started");

    let mut buf = [0u8; MAX_FRAME_SIZE];

    loop {
        let cmd = LINK_COMMANDS.receive().await;

        match cmd.to_frame().encode(&mut buf) {
            Ok(len) => {
                if let Err(e) = tx.write_all(&buf[..len]).await {
                    warn!("Failed to send {:?}: {:?}", cmd, e);
                } else {
                    trace!("Sent {:?}", cmd);
                }
            }
            Err(e) => warn!("Failed to encode {:?}: {:?}", cmd, e),
        }
    }
}
