fn main() {
    // Credentials are baked in at compile time. A missing .env is fine:
    // the firmware falls back to placeholder values that fail at runtime.
    if let Err(e) = dotenvy::dotenv() {
        println!("cargo:warning=.env not loaded ({e}); using WIFI_SSID/WIFI_PASSWORD/SERVER_URL from the environment");
    }

    for key in ["WIFI_SSID", "WIFI_PASSWORD", "SERVER_URL"] {
        println!("cargo:rerun-if-env-changed={key}");
        if let Ok(value) = std::env::var(key) {
            println!("cargo:rustc-env={key}={value}");
        }
    }
    println!("cargo:rerun-if-changed=.env");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
