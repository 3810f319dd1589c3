use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer, Config};
use crate::handlers::{self, events, purchases, tickets, users};
use crate::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/users", post(users::register_user))
        .route("/api/users/me", get(users::current_user))
        .route(
            "/api/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/api/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/api/events/:id/tickets",
            get(tickets::list_event_tickets).post(tickets::create_ticket),
        )
        .route(
            "/api/tickets/:id",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/api/tickets/:id/purchase", post(purchases::purchase_ticket))
        .route("/api/purchases", get(purchases::list_purchases))
        .route("/api/purchases/verify", post(purchases::verify_credential))
        .route("/api/purchases/:id", get(purchases::get_purchase))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&config.cors_allowed_origins)),
        )
        .with_state(state);

    apply_security_headers(router)
}
