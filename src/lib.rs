pub mod api;
pub mod auth;
pub mod config;
pub mod db;

pub use db::DbPool;

use auth::AuthService;
use config::Config;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        let auth = AuthService::new(db.clone());
        Self { config, db, auth }
    }
}
