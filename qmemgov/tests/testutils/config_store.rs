//! In-memory configuration store that propagates changes to listeners

use parking_lot::Mutex;
use qmemgov::{ConfigChange, ConfigError, ConfigListener, RawConfig};
use std::sync::Arc;

/// Minimal key/value store with change propagation
///
/// A value is only kept when every listener accepts it.
#[derive(Default)]
pub struct InMemoryConfigStore {
    values: Mutex<RawConfig>,
    listeners: Mutex<Vec<Arc<dyn ConfigListener>>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: Arc<dyn ConfigListener>) {
        self.listeners.lock().push(listener);
    }

    /// Store a value and propagate it
    ///
    /// Returns one result per listener, in registration order.
    pub fn set(
        &self,
        key: &str,
        value: impl Into<serde_json::Value>,
    ) -> Vec<Result<ConfigChange, ConfigError>> {
        let change = RawConfig::new().with(key, value);
        let results: Vec<_> = self
            .listeners
            .lock()
            .iter()
            .map(|listener| listener.on_config_change(&change))
            .collect();

        if results.iter().all(Result::is_ok) {
            let mut values = self.values.lock();
            if let Some(cfg) = results.first().and_then(|r| r.as_ref().ok()) {
                *values = RawConfig::from_limits(&cfg.current);
            }
        }
        results
    }

    pub fn values(&self) -> RawConfig {
        self.values.lock().clone()
    }
}
