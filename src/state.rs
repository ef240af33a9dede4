use axum::extract::FromRef;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: AppConfig,
}

// Lets handlers that only run plain sqlx queries extract `State<DbPool>`
// directly from the shared state.
impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> DbPool {
        state.pool.clone()
    }
}
