use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::db::Store;
use crate::storage::{FileKv, KvBackend};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let backend = Arc::new(FileKv::open(&config.data_dir)?) as Arc<dyn KvBackend>;
        Self::from_parts(backend, config)
    }

    pub fn from_parts(backend: Arc<dyn KvBackend>, config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let store = Arc::new(Store::new(backend));
        store.init().context("initialize store")?;
        Ok(Self { store, config })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{FeatureFlags, SessionConfig, Settings};
        use crate::storage::MemoryKv;

        let config = Arc::new(AppConfig {
            data_dir: "unused".into(),
            host: "127.0.0.1".into(),
            port: 0,
            session: SessionConfig {
                secret: "test-secret".into(),
                ttl_minutes: 60,
            },
            settings: Settings::default(),
            features: FeatureFlags::default(),
        });
        let backend = Arc::new(MemoryKv::default()) as Arc<dyn KvBackend>;
        Self::from_parts(backend, config).expect("in-memory store initializes")
    }
}
