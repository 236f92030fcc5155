//! Estado compartido de la aplicación

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::services::telematics_client::TelematicsClient;
use crate::utils::errors::AppResult;

/// Estado compartido entre todos los handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub telematics: Arc<TelematicsClient>,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> AppResult<Self> {
        let telematics = Arc::new(TelematicsClient::new(&config)?);
        Ok(Self {
            pool,
            config,
            telematics,
        })
    }
}
