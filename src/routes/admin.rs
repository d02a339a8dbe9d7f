use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Pages restricted to the `admin` role. Mounted under `/admin`. Anyone else is
/// redirected to the login page by the handler's role gate.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/dashboard.php
        .route("/dashboard.php", get(handlers::admin_dashboard))
}
