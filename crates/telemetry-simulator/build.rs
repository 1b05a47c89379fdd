//! Forwards build-time tunables to the simulator as compile-time env vars.
//!
//! Values come from the environment or an optional `.env` file; anything unset
//! falls back to the device defaults.

const TUNABLES: [(&str, &str); 5] = [
    ("TELEMETRY_LOAD_SPIKE_MIN_INTERVAL_MS", "1000"),
    ("TELEMETRY_LOAD_SPIKE_MAX_INTERVAL_MS", "5000"),
    ("TELEMETRY_LOAD_SPIKE_MIN_DURATION_MS", "50"),
    ("TELEMETRY_LOAD_SPIKE_MAX_DURATION_MS", "300"),
    ("TELEMETRY_SINK", "console"),
];

fn main() {
    // A missing .env is fine: defaults apply.
    if let Ok(path) = dotenvy::dotenv() {
        println!("cargo:rerun-if-changed={}", path.display());
    }

    for (key, default) in TUNABLES {
        println!("cargo:rerun-if-env-changed={key}");
        let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
        println!("cargo:rustc-env={key}={value}");
    }
}
