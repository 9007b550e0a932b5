//! Route definitions for the complaint management API
//!
//! Public routes serve passengers (submission, tracking, chatbot). Everything
//! under `/admin`, plus `/auth/logout` and `/auth/me`, requires a bearer token.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::database::AppState;
use crate::handler::{admin, auth, chatbot, complaint, meta};
use crate::middleware::auth_middleware;

/// Creates the application router with all routes
///
/// # Route Definitions
///
/// Public:
/// - `POST /complaints` - submit a complaint
/// - `GET /complaints/track/{complaint_id}` - track by complaint code
/// - `GET /complaints/track-by-email/{email}` - list a passenger's complaints
/// - `POST /chatbot/step` - one turn of the intake dialogue
/// - `GET /meta/options` - enum values and labels
/// - `GET /health`
/// - `POST /auth/login`, `POST /auth/refresh`
///
/// Bearer token required:
/// - `POST /auth/logout`, `GET /auth/me`
/// - `GET /admin/complaints`
/// - `GET|PATCH|DELETE /admin/complaints/{id}`
/// - `GET /admin/dashboard/metrics`, `GET /admin/dashboard/charts`
///
/// # Example Usage
///
/// ```no_run
/// # use railcomplaint::auth::jwt::JwtConfig;
/// # use railcomplaint::config::Config;
/// # use railcomplaint::database::{init_db, AppState};
/// # use railcomplaint::route::create_app;
/// # let jwt = JwtConfig { secret: "secret".into(), access_token_expiry_mins: 60, refresh_token_expiry_days: 7 };
/// let db = init_db("complaints.db").unwrap();
/// let app = create_app(AppState::new(db, Config::new(jwt)));
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let admin_routes = Router::new()
        .route("/complaints", get(admin::list_complaints))
        .route(
            "/complaints/{id}",
            get(admin::get_complaint)
                .patch(admin::update_complaint)
                .delete(admin::delete_complaint),
        )
        .route("/dashboard/metrics", get(admin::dashboard_metrics_handler))
        .route("/dashboard/charts", get(admin::dashboard_charts))
        .layer(require_auth.clone());

    let auth_routes = Router::new()
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .layer(require_auth)
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh));

    Router::new()
        .route("/complaints", post(complaint::create_complaint))
        .route(
            "/complaints/track/{complaint_id}",
            get(complaint::track_complaint),
        )
        .route(
            "/complaints/track-by-email/{email}",
            get(complaint::track_by_email),
        )
        .route("/chatbot/step", post(chatbot::chatbot_step))
        .route("/meta/options", get(meta::options))
        .route("/health", get(meta::health))
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .with_state(state)
}
