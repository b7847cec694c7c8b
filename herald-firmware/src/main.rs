//! Herald - BLE Notification Receiver Firmware
//!
//! Main firmware binary for RP2040 boards paired with a BLE coprocessor.
//! The coprocessor runs the radio stack and talks to this MCU over UART;
//! everything else (reassembly, pairing, the notification store) runs here
//! in the shared engine.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use herald_core::config::{persist, DeletePreview, EngineConfig, OverflowPolicy};
use herald_core::link::SecurityLevel;
use herald_core::{Engine, SharedEngine};

mod board;
mod channels;
mod storage;
mod tasks;

use board::{BoardHooks, HeraldEngine};
use storage::ConfigStorage;

// Generated by build.rs from device.toml
include!(concat!(env!("OUT_DIR"), "/device_config.rs"));

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Large enough for a full-MTU write frame in each direction
static TX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();

static ENGINE: StaticCell<HeraldEngine> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Herald firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let mut storage = ConfigStorage::new(p.FLASH, p.DMA_CH0);
    let config = load_config(&mut storage).await;
    info!(
        "Engine config: tick={}ms delete={} ticks security={}",
        config.tick_interval_ms,
        config.delete_timeout_ticks,
        config.required_security
    );

    // Coprocessor UART (GPIO0 TX, GPIO1 RX)
    let uart_config = {
        let mut cfg = UartConfig::default();
        cfg.baudrate = UART_BAUDRATE;
        cfg
    };
    let tx_buf = TX_BUF.init([0u8; 1024]);
    let rx_buf = RX_BUF.init([0u8; 1024]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    info!("UART initialized for coprocessor communication");

    // Navigation buttons, active low
    let buttons = tasks::Buttons {
        next: Input::new(p.PIN_2, Pull::Up),
        prev: Input::new(p.PIN_3, Pull::Up),
        ok: Input::new(p.PIN_4, Pull::Up),
        back: Input::new(p.PIN_5, Pull::Up),
    };

    let engine: &'static HeraldEngine =
        ENGINE.init(SharedEngine::new(Engine::new(config, BoardHooks::new())));

    if let Err(e) = engine.start() {
        warn!("Failed to start advertising: {}", e.reason());
    }

    spawner.spawn(tasks::radio_tx_task(tx)).unwrap();
    spawner.spawn(tasks::radio_rx_task(rx, engine)).unwrap();
    spawner
        .spawn(tasks::tick_task(engine, config.tick_interval_ms))
        .unwrap();
    spawner.spawn(tasks::input_task(buttons, engine)).unwrap();
    spawner.spawn(tasks::screen_task(engine)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
        board::log_error_counts();
    }
}

/// Load the engine configuration from flash
///
/// Falls back to the device.toml defaults when flash holds nothing usable.
/// A blank flash is seeded with the defaults so later boots find them.
async fn load_config(storage: &mut ConfigStorage<'_>) -> EngineConfig {
    let mut buf = [0u8; persist::MAX_STORED_CONFIG_SIZE];

    match storage.read(&mut buf).await {
        Ok(Some(bytes)) => match persist::load(bytes) {
            Ok(config) => {
                info!("Loaded configuration from flash");
                return config;
            }
            Err(e) => warn!("Stored configuration rejected: {}", e.reason()),
        },
        Ok(None) => {
            info!("No configuration in flash, storing defaults");
            let mut out = [0u8; persist::MAX_STORED_CONFIG_SIZE];
            match persist::save(&DEVICE_CONFIG, &mut out) {
                Ok(bytes) => {
                    if let Err(e) = storage.write(bytes).await {
                        warn!("Failed to store defaults: {}", e);
                    }
                }
                Err(e) => warn!("Failed to encode defaults: {}", e.reason()),
            }
        }
        Err(e) => warn!("Flash read failed: {}", e),
    }

    DEVICE_CONFIG
}
