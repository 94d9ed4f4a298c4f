use std::path::PathBuf;

use bridge_consumer::snapshot::DEFAULT_MAX_AGE_MS;

/// Server-wide tunables (spec §4.4, §4.6, §6.3). Built from CLI flags or
/// programmatically; the core itself reads no environment variables (spec
/// §6.4).
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Tree-cache TTL in milliseconds. `0` disables caching.
    pub cache_ttl_ms: i64,
    pub snapshot_max_age_ms: i64,
    pub snapshot_dir: PathBuf,
    pub verify_delay_ms: u64,
    pub max_retries: u32,
    pub post_read_delay_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: 2_000,
            snapshot_max_age_ms: DEFAULT_MAX_AGE_MS,
            snapshot_dir: std::env::temp_dir(),
            verify_delay_ms: 100,
            max_retries: 3,
            post_read_delay_ms: 100,
        }
    }
}
