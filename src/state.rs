use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AccountService, SeaOrmAccountService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub account_service: Arc<dyn AccountService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let account_service = Arc::new(SeaOrmAccountService::new(
            store.clone(),
            config.accounts.clone(),
            config.security.clone(),
        )) as Arc<dyn AccountService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            account_service,
        })
    }
}
