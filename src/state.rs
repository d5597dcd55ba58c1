use crate::{config::AppConfig, db::OrmConn};

/// Everything a request handler needs, passed down explicitly instead of
/// living in process-wide globals.
#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub config: AppConfig,
}
