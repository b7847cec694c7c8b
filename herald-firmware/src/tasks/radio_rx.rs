//! Radio UART receive task
//!
//! Receives frames from the BLE coprocessor and feeds them to the engine.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use herald_core::engine::EventError;
use herald_core::link::SecurityLevel;
use herald_core::{TransportEvent, WriteError};
use herald_protocol::bridge::{
    FrameParser, HostCommand, RadioEvent, ATT_ERROR_INSUFFICIENT_ENCRYPTION,
    ATT_ERROR_INVALID_OFFSET, ATT_SUCCESS,
};

use crate::board::HeraldEngine;
use crate::channels::LINK_COMMANDS;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Radio RX task - receives and parses frames from the coprocessor
#[embassy_executor::task]
pub async fn radio_rx_task(mut rx: BufferedUartRx, engine: &'static HeraldEngine) {
    info!("Radio RX task started");

    let mut parser = FrameParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(frame)) => match RadioEvent::from_frame(&frame) {
                            Ok(event) => handle_radio_event(engine, event).await,
                            Err(e) => warn!("Failed to parse radio event: {:?}", e),
                        },
                        Ok(None) => {}
                        Err(e) => warn!("Frame parse error: {:?}", e),
                    }
                }
            }
            Ok(_) => {}
            Err(e) => warn!("UART read error: {:?}", e),
        }
    }
}

/// Hand a radio event to the engine
///
/// Writes are always answered so the coprocessor can complete the ATT
/// transaction.
async fn handle_radio_event(engine: &HeraldEngine, event: RadioEvent<'_>) {
    let result = engine.handle_transport(transport_event(event));

    if let RadioEvent::Write { offset, data } = event {
        debug!("Write of {} bytes at offset {}", data.len(), offset);
        let att_status = att_status(&result);
        LINK_COMMANDS
            .send(HostCommand::WriteResult { att_status })
            .await;
    } else if let Err(e) = result {
        warn!("Radio event {:?} failed: {:?}", event, e);
    }
}

fn transport_event(event: RadioEvent<'_>) -> TransportEvent<'_> {
    match event {
        RadioEvent::Connected { status } => TransportEvent::Connected(status_result(status)),
        RadioEvent::Disconnected { reason } => TransportEvent::Disconnected { reason },
        RadioEvent::SecurityChanged { level, status } => TransportEvent::SecurityChanged {
            level: SecurityLevel::from_u8(level).unwrap_or(SecurityLevel::L1),
            result: status_result(status),
        },
        RadioEvent::Write { offset, data } => TransportEvent::Write {
            offset: u32::from(offset),
            data,
        },
        RadioEvent::Passkey(code) => TransportEvent::PasskeyRequested(code),
        RadioEvent::PairingCancelled => TransportEvent::PairingCancelled,
        RadioEvent::PairingComplete { bonded } => TransportEvent::PairingComplete { bonded },
        RadioEvent::PairingFailed { reason } => TransportEvent::PairingFailed { reason },
        RadioEvent::Rssi(dbm) => TransportEvent::Rssi(dbm),
    }
}

/// HCI status byte to a result; zero is success
fn status_result(status: u8) -> Result<(), u8> {
    if status == 0 {
        Ok(())
    } else {
        Err(status)
    }
}

fn att_status(result: &Result<(), EventError>) -> u8 {
    match result {
        Ok(()) => ATT_SUCCESS,
        Err(EventError::Write(WriteError::NotSecured)) => ATT_ERROR_INSUFFICIENT_ENCRYPTION,
        Err(_) => ATT_ERROR_INVALID_OFFSET,
    }
}
