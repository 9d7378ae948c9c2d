/// Wall-clock time in microseconds since the Unix epoch.
///
/// Used as the capture timestamp of received records. Formatting is left
/// to the presentation layer.
#[cfg(target_arch = "wasm32")]
pub fn now_us() -> u64 {
    // Date.now() is milliseconds as f64
    (js_sys::Date::now() * 1000.0) as u64
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_us() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
