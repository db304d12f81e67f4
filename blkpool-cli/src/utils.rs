use blkpool_core::{PoolError, Result};

/// Parse a size given in bytes or with a binary K/M/G/T suffix
/// (`1048576`, `512M`, `10G`, `2GiB`).
pub fn parse_size(size: &str) -> Result<u64> {
    let size = size.trim().to_uppercase();
    let number = size.trim_end_matches("IB").trim_end_matches('B');

    let (digits, shift) = match number.chars().last() {
        Some('K') => (&number[..number.len() - 1], 10),
        Some('M') => (&number[..number.len() - 1], 20),
        Some('G') => (&number[..number.len() - 1], 30),
        Some('T') => (&number[..number.len() - 1], 40),
        _ => (number, 0),
    };

    let value = digits
        .trim()
        .parse::<u64>()
        .map_err(|_| PoolError::ConfigError(format!("Invalid size: {size}")))?;
    value
        .checked_mul(1u64 << shift)
        .ok_or_else(|| PoolError::ConfigError(format!("Size too large: {size}")))
}

/// Human-readable binary size for tables.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Run blocking pool work off the async runtime.
pub async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PoolError::Other(anyhow::anyhow!("Pool worker failed: {e}")))?
}
