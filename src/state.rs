use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::{
    catalog::Catalog,
    config::AppConfig,
    services::{
        auth_service::AuthService, cart_service::CartManager, language_service::LanguageSwitch,
    },
    store::{FileStore, MemoryStore, SharedStore, StoreResult},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: SharedStore,
    pub catalog: Arc<RwLock<Catalog>>,
    pub cart: Arc<Mutex<CartManager>>,
    pub language: Arc<Mutex<LanguageSwitch>>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Hydrates cart and language from `store`.
    pub fn new(config: AppConfig, store: SharedStore) -> Self {
        let cart = CartManager::hydrate(store.clone());
        let language = LanguageSwitch::hydrate(store.clone());
        let auth = AuthService::new(store.clone(), &config);
        Self {
            config: Arc::new(config),
            store,
            catalog: Arc::new(RwLock::new(Catalog::seeded())),
            cart: Arc::new(Mutex::new(cart)),
            language: Arc::new(Mutex::new(language)),
            auth: Arc::new(auth),
        }
    }

    /// Opens the file store named in the config, or an in-memory one.
    pub fn from_config(config: AppConfig) -> StoreResult<Self> {
        let store: SharedStore = match &config.store_path {
            Some(path) => Arc::new(FileStore::open(path)?),
            None => MemoryStore::shared(),
        };
        Ok(Self::new(config, store))
    }
}
