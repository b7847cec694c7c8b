//! Build script for herald-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml and turns it into compile-time defaults

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    generate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Values taken from device.toml, with the built-in defaults for missing keys
struct DeviceConfig {
    tick_interval_ms: i64,
    delete_timeout_ticks: i64,
    clock_refresh_ms: i64,
    relative_time_refresh_ms: i64,
    assembly_idle_ticks: i64,
    overflow_policy: &'static str,
    delete_preview: &'static str,
    cancel_delete_on_disconnect: bool,
    required_security: i64,
    weak_signal_rssi_dbm: i64,
    uart_baudrate: i64,
    long_press_ms: i64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            delete_timeout_ticks: 20,
            clock_refresh_ms: 60_000,
            relative_time_refresh_ms: 30_000,
            assembly_idle_ticks: 2,
            overflow_policy: "ResetBuffer",
            delete_preview: "KeepCursor",
            cancel_delete_on_disconnect: false,
            required_security: 2,
            weak_signal_rssi_dbm: -80,
            uart_baudrate: 115_200,
            long_press_ms: 800,
        }
    }
}

/// Validate device.toml and write `device_config.rs` into OUT_DIR
fn generate_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");
    let value = if config_path.exists() {
        let content = match fs::read_to_string(config_path) {
            Ok(content) => content,
            Err(e) => fail("Failed to read device.toml", &[e.to_string()]),
        };
        match toml::from_str::<toml::Value>(&content) {
            Ok(value) => Some(value),
            Err(e) => fail(
                "Invalid TOML syntax in device.toml",
                &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
            ),
        }
    } else {
        println!("cargo:warning=device.toml not found, using built-in defaults");
        None
    };

    let mut config = DeviceConfig::default();
    if let Some(value) = &value {
        let errors = apply(value, &mut config);
        if !errors.is_empty() {
            fail("Invalid configuration in device.toml", &errors);
        }
        println!("cargo:warning=device.toml validated successfully");
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("device_config.rs"), render(&config)).unwrap();
}

/// Read every known key into `config`, collecting validation errors
fn apply(value: &toml::Value, config: &mut DeviceConfig) -> Vec<String> {
    let mut errors = Vec::new();

    let mut int = |section: &str, key: &str, min: i64, max: i64, slot: &mut i64| {
        match value.get(section).and_then(|s| s.get(key)) {
            None => {}
            Some(toml::Value::Integer(v)) if (min..=max).contains(v) => *slot = *v,
            Some(toml::Value::Integer(_)) => {
                errors.push(format!("[{}] {} must be {}..={}", section, key, min, max))
            }
            Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
        }
    };

    int("engine", "tick_interval_ms", 1, 10_000, &mut config.tick_interval_ms);
    int("engine", "delete_timeout_ticks", 1, u16::MAX as i64, &mut config.delete_timeout_ticks);
    int("engine", "clock_refresh_ms", 1, u32::MAX as i64, &mut config.clock_refresh_ms);
    int(
        "engine",
        "relative_time_refresh_ms",
        1,
        u32::MAX as i64,
        &mut config.relative_time_refresh_ms,
    );
    int("engine", "assembly_idle_ticks", 0, u8::MAX as i64, &mut config.assembly_idle_ticks);
    int("link", "required_security", 1, 4, &mut config.required_security);
    int("link", "weak_signal_rssi_dbm", i8::MIN as i64, 0, &mut config.weak_signal_rssi_dbm);
    int("board", "uart_baudrate", 1_200, 3_000_000, &mut config.uart_baudrate);
    int("board", "long_press_ms", 100, 10_000, &mut config.long_press_ms);

    let mut choice = |section: &str, key: &str, options: &[(&str, &'static str)]| {
        match value.get(section).and_then(|s| s.get(key)) {
            None => None,
            Some(toml::Value::String(s)) => {
                let found = options.iter().find(|(name, _)| *name == s.as_str()).map(|(_, v)| *v);
                if found.is_none() {
                    let names: Vec<_> = options.iter().map(|(n, _)| format!("'{}'", n)).collect();
                    errors.push(format!("[{}] {} must be {}", section, key, names.join(" or ")));
                }
                found
            }
            Some(_) => {
                errors.push(format!("[{}] {} must be a string", section, key));
                None
            }
        }
    };

    if let Some(v) = choice(
        "engine",
        "overflow_policy",
        &[("reset_buffer", "ResetBuffer"), ("reject_write", "RejectWrite")],
    ) {
        config.overflow_policy = v;
    }
    if let Some(v) = choice(
        "engine",
        "delete_preview",
        &[("keep_cursor", "KeepCursor"), ("advance_cursor", "AdvanceCursor")],
    ) {
        config.delete_preview = v;
    }

    match value.get("engine").and_then(|s| s.get("cancel_delete_on_disconnect")) {
        None => {}
        Some(toml::Value::Boolean(b)) => config.cancel_delete_on_disconnect = *b,
        Some(_) => errors.push("[engine] cancel_delete_on_disconnect must be a boolean".into()),
    }

    errors
}

fn render(c: &DeviceConfig) -> String {
    format!(
        "/// Engine defaults from device.toml\n\
         pub const DEVICE_CONFIG: EngineConfig = EngineConfig {{\n    \
             delete_timeout_ticks: {},\n    \
             tick_interval_ms: {},\n    \
             clock_refresh_ms: {},\n    \
             relative_time_refresh_ms: {},\n    \
             assembly_idle_ticks: {},\n    \
             overflow_policy: OverflowPolicy::{},\n    \
             delete_preview: DeletePreview::{},\n    \
             required_security: SecurityLevel::L{},\n    \
             weak_signal_rssi_dbm: {},\n    \
             cancel_delete_on_disconnect: {},\n\
         }};\n\
         /// Coprocessor UART baud rate\n\
         pub const UART_BAUDRATE: u32 = {};\n\
         /// Hold time that turns a press into a long press\n\
         pub const LONG_PRESS_MS: u64 = {};\n",
        c.delete_timeout_ticks,
        c.tick_interval_ms,
        c.clock_refresh_ms,
        c.relative_time_refresh_ms,
        c.assembly_idle_ticks,
        c.overflow_policy,
        c.delete_preview,
        c.required_security,
        c.weak_signal_rssi_dbm,
        c.cancel_delete_on_disconnect,
        c.uart_baudrate,
        c.long_press_ms,
    )
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let truncated = if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.to_string()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
