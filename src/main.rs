//! camkeeper firmware entry point.
//!
//! One program run is one wake: build the adapters, hand them to the
//! wake service, and let it end in timer-woken deep sleep.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  FlashLed      DhtSensor      CameraDriver   PsramDetector     │
//! │  (FlashPort)   (Climate)      (CameraPort)   (MemorySource)    │
//! │  WifiAdapter   HttpUploader   PowerManager   RtcRetainedStore  │
//! │  (RadioPort)   (UploadPort)   (SuspendPort)  (RetainedStore)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              WakeService (pure logic)                  │    │
//! │  │  FSM · CycleCounter · CaptureSequencer                 │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::hal::gpio::PinDriver;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;

use camkeeper::adapters::http::HttpUploader;
use camkeeper::adapters::log_sink::LogEventSink;
use camkeeper::adapters::retained::RtcRetainedStore;
use camkeeper::adapters::wifi::WifiAdapter;
use camkeeper::app::ports::{Board, SuspendPort};
use camkeeper::app::service::WakeService;
use camkeeper::config::DeviceConfig;
use camkeeper::drivers::camera::{CameraDriver, PsramDetector};
use camkeeper::drivers::flash_led::FlashLed;
use camkeeper::power::PowerManager;
use camkeeper::sensors::dht11::DhtSensor;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  camkeeper v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = DeviceConfig::default();
    let fallback_secs = u64::from(config.intervals.keep_alive_interval_secs);

    if let Err(e) = run_wake(config) {
        // Without the peripherals there is nothing to do but keep the
        // powerbank cycle going and try again next wake.
        error!("bootstrap failed: {:#}, sleeping {} s", e, fallback_secs);
        let mut power = PowerManager::new();
        power.flush_log();
        power.sleep_for(fallback_secs);
    }
    Ok(())
}

fn run_wake(config: DeviceConfig) -> Result<()> {
    // ── 2. System services ────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 3. Construct adapters ─────────────────────────────────
    let mut flash = FlashLed::new();

    // DHT11 data line: GPIO13, open drain with an external pull-up.
    let dht_pin = PinDriver::input_output_od(peripherals.pins.gpio13)?;
    let mut climate = DhtSensor::new(dht_pin, Ets);

    let mut camera = CameraDriver::new();
    let memory = PsramDetector::new();

    let wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs))?;
    let mut radio = WifiAdapter::new(wifi);
    let mut http = HttpUploader::new();

    let mut power = PowerManager::new();
    let mut store = RtcRetainedStore::new();
    let mut sink = LogEventSink::new();
    let mut delay = FreeRtos;

    // ── 4. Run the wake ───────────────────────────────────────
    let mut board = Board {
        flash: &mut flash,
        climate: &mut climate,
        camera: &mut camera,
        memory: &memory,
        radio: &mut radio,
        http: &mut http,
        power: &mut power,
        delay: &mut delay,
    };

    let mut service = WakeService::new(config);
    let report = service.run_wake(&mut board, &mut store, &mut sink);

    // Only reached if deep sleep did not take.
    error!("wake ended without sleeping: {:?}", report.final_state);
    Ok(())
}
