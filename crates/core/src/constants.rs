/// Window during which every viewer of a signal key sees the same signal.
pub const DEFAULT_SIGNAL_TTL_SECS: u64 = 30;

/// Window during which every viewer of a quote key sees the same price.
pub const DEFAULT_QUOTE_TTL_SECS: u64 = 5;

/// Longest window a cache accepts.
pub const MAX_CACHE_TTL_SECS: u64 = 86_400;

/// Upper bound on a single upstream call before production falls back.
pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 4_000;

/// Quote lookups issued concurrently per batch.
pub const DEFAULT_QUOTE_BATCH_SIZE: usize = 10;

/// Pause between successive quote batches.
pub const DEFAULT_QUOTE_BATCH_PAUSE_MS: u64 = 100;

/// Default magnitude bands as `lo-hi:weight`, weights summing to 100.
pub const DEFAULT_MAGNITUDE_BANDS: &str = "65-70:10,71-77:25,78-84:35,85-89:20,90-92:10";

/// Minimum distance between consecutive magnitudes for one key.
pub const DEFAULT_MAGNITUDE_SPREAD: u8 = 3;

/// Length of the identifier minted for each produced signal.
pub const SIGNAL_ID_LEN: usize = 9;
