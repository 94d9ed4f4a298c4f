use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bridge_backend::Backend;
use parking_lot::Mutex;
use tracing::debug;

use crate::cache::TreeCache;
use crate::config::BridgeConfig;

/// The request engine: owns the tree cache, the provider mutex serializing
/// platform calls, and the backend handle (spec §4.4, §5).
pub struct Server {
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) cache: TreeCache,
    pub(crate) config: BridgeConfig,
    pub(crate) provider_lock: Mutex<()>,
}

impl Server {
    pub fn new(backend: Arc<dyn Backend>, config: BridgeConfig) -> Self {
        Self {
            cache: TreeCache::new(config.cache_ttl_ms),
            backend,
            config,
            provider_lock: Mutex::new(()),
        }
    }

    pub fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before unix epoch")
            .as_millis() as i64
    }

    /// Acquires the provider mutex for the duration of `f`, logging at
    /// `debug` as spec §4's ambient-logging section requires (spec §5: "the
    /// request engine holds a provider mutex; every handler acquires it for
    /// the duration of its platform calls").
    pub(crate) fn with_backend<T>(&self, f: impl FnOnce(&dyn Backend) -> T) -> T {
        let _guard = self.provider_lock.lock();
        debug!("provider mutex acquired");
        let result = f(self.backend.as_ref());
        debug!("provider mutex released");
        result
    }
}
