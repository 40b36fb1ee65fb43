use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::email::EmailProvider;
use crate::services::messaging::MessagingProvider;
use crate::services::payments::PaymentGateway;

/// Everything a handler needs, passed explicitly through axum `State`.
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub payments: Box<dyn PaymentGateway>,
    pub email: Box<dyn EmailProvider>,
    pub messaging: Box<dyn MessagingProvider>,
}

impl AppState {
    /// Locks the store. The guard must be dropped before any `.await`.
    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("database lock poisoned")))
    }
}
