use std::sync::Arc;

use common::storage::FileStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::services::UploadLocks;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub avatar_store: Arc<dyn FileStore>,
    pub upload_locks: Arc<UploadLocks>,
}
