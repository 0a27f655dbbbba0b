//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                   |
//! |------------|----------------|-------------------------------|
//! | `http`     | UploadPort     | ESP-IDF HTTP client           |
//! | `log_sink` | EventSink      | Serial log output             |
//! | `retained` | RetainedStore  | RTC slow memory               |
//! | `wifi`     | RadioPort      | ESP-IDF WiFi STA              |
//!
//! The flash LED, camera and DHT11 sit closer to the metal and live in
//! `drivers` and `sensors`.

pub mod http;
pub mod log_sink;
pub mod retained;
pub mod wifi;
