//! Node fixture for governor integration tests
//!
//! Each start writes a settings file into a private temp directory and boots
//! the governor from it, so a restart exercises the same path a redeployed
//! node takes.

use qmemgov::{
    GovernorError, GovernorService, GovernorSettings, NodeMemoryProfile, RawConfig, VariableRow,
};
use std::sync::Arc;

/// Node with a restartable governor
pub struct NodeFixture {
    node_id: u32,
    profile: NodeMemoryProfile,
    governor: Option<Arc<GovernorService>>,
    temp_dir: tempfile::TempDir,
}

impl NodeFixture {
    /// Node whose pool spans `capacity` bytes, not yet started
    pub fn new(capacity: u64) -> Self {
        Self::with_profile(NodeMemoryProfile::with_capacity(capacity))
    }

    /// Node with an explicit memory profile, not yet started
    pub fn with_profile(profile: NodeMemoryProfile) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            node_id: 1,
            profile,
            governor: None,
            temp_dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Node already started with the given limits
    pub fn started(capacity: u64, use_pool: u64, reserve: u64, single: u64) -> Self {
        let mut fixture = Self::new(capacity);
        fixture
            .restart(use_pool, reserve, single)
            .expect("Failed to start governor");
        fixture
    }

    pub fn limits(use_pool: u64, reserve: u64, single: u64) -> RawConfig {
        RawConfig::new()
            .with("queryUseMemoryPool", use_pool.to_string())
            .with("minReservedMemorySize", reserve)
            .with("singleQueryMaxMemorySize", single)
    }

    /// Stop the node and start it again with new limits
    ///
    /// A failed start leaves the node down.
    pub fn restart(
        &mut self,
        use_pool: u64,
        reserve: u64,
        single: u64,
    ) -> Result<(), GovernorError> {
        self.governor = None;

        let settings = GovernorSettings::new(self.node_id, self.profile)
            .with_limits(Self::limits(use_pool, reserve, single));
        let path = self.temp_dir.path().join("node.json");
        std::fs::write(&path, serde_json::to_string_pretty(&settings).expect("serialize"))
            .expect("Failed to write settings");

        let loaded = GovernorSettings::load(&path)?;
        self.governor = Some(Arc::new(GovernorService::from_settings(&loaded)?));
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.governor.is_some()
    }

    pub fn governor(&self) -> &Arc<GovernorService> {
        self.governor.as_ref().expect("Node is not running")
    }

    /// `show variables like <key>` on the running node
    pub fn variables_like(&self, key: &str) -> Result<Vec<VariableRow>, String> {
        match &self.governor {
            Some(governor) => governor.show_variables(Some(key)).map_err(|e| e.to_string()),
            None => Err(format!("node {} is not running", self.node_id)),
        }
    }

    /// Assert the three pool variables read back as expected
    pub fn assert_variables(&self, use_pool: u64, reserve: u64, single: u64) {
        for (key, expected) in [
            ("queryUseMemoryPool", use_pool),
            ("minReservedMemorySize", reserve),
            ("singleQueryMaxMemorySize", single),
        ] {
            let rows = self
                .variables_like(key)
                .unwrap_or_else(|e| panic!("show variables like '{}' failed: {}", key, e));
            assert_eq!(rows.len(), 1, "expected one row for {}", key);
            assert_eq!(rows[0].node_id, self.node_id);
            assert_eq!(rows[0].key, key);
            assert_eq!(rows[0].value, expected.to_string(), "value of {}", key);
        }
    }

    /// Assert the variables cannot be read, i.e. the node is down
    pub fn assert_variables_unavailable(&self) {
        for key in [
            "queryUseMemoryPool",
            "minReservedMemorySize",
            "singleQueryMaxMemorySize",
        ] {
            assert!(
                self.variables_like(key).is_err(),
                "show variables like '{}' should fail",
                key
            );
        }
    }
}
