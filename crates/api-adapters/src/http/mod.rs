//! # HTTP transport (axum)
//!
//! JSON API under `/api`, plus `/health` and `/metrics`. Every request is
//! traced, tagged with an `x-request-id` and counted; responses produced by
//! a policy refusal also bump the denial counter.

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::Router;
use services::Services;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::metrics::Metrics;
use error::AuthzDenial;
use handlers::{admin, auth, boards, comments, feedback, system, tags};

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(services: Services, metrics: Arc<Metrics>) -> Self {
        Self { services, metrics }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/boards", get(boards::list).post(boards::create))
        .route(
            "/boards/{id}",
            get(boards::get).patch(boards::update).delete(boards::delete),
        )
        .route("/tags", get(tags::list).post(tags::create))
        .route(
            "/tags/{id}",
            get(tags::get).patch(tags::update).delete(tags::delete),
        )
        .route("/feedback", get(feedback::list).post(feedback::create))
        .route("/feedback/by_board", get(feedback::by_board))
        .route("/feedback/most_upvoted", get(feedback::most_upvoted))
        .route("/feedback/kanban", get(feedback::kanban))
        .route(
            "/feedback/{id}",
            get(feedback::get)
                .patch(feedback::update)
                .delete(feedback::delete),
        )
        .route("/feedback/{id}/upvote", post(feedback::upvote))
        .route("/feedback/{id}/change_status", post(feedback::change_status))
        .route("/feedback/{id}/comments", get(feedback::comment_thread))
        .route("/comments", get(comments::list).post(comments::create))
        .route(
            "/comments/{id}",
            get(comments::get)
                .patch(comments::update)
                .delete(comments::delete),
        )
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}/role", put(admin::set_role))
        .route("/admin/groups", get(admin::list_groups).post(admin::create_group))
        .route("/admin/groups/{id}/members", post(admin::add_member))
        .route(
            "/admin/groups/{id}/members/{user_id}",
            axum::routing::delete(admin::remove_member),
        );

    Router::new()
        .nest("/api", api)
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics))
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn track_requests(State(metrics): State<Arc<Metrics>>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let response = next.run(request).await;
    metrics.record_request(method.as_str(), response.status().as_u16());
    if let Some(denial) = response.extensions().get::<AuthzDenial>() {
        metrics.record_denial(denial.entity);
    }
    response
}
