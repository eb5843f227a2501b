use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use tower_http::trace::TraceLayer;

use std::{net::SocketAddr, sync::Arc};

use crate::{ServerError, categories, transactions, users, wallets};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves the bearer token and stores the session in the request
/// extensions. Nothing downstream runs for an unknown or expired token.
async fn auth(
    auth_header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Ok(TypedHeader(Authorization(bearer))) = auth_header else {
        tracing::warn!("request without bearer token rejected");
        return ServerError::from(EngineError::Unauthorized).into_response();
    };

    match state.engine.identity(bearer.token()).await {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(err) => {
            if matches!(err, EngineError::Unauthorized) {
                tracing::warn!("request with invalid bearer token rejected");
            }
            ServerError::from(err).into_response()
        }
    }
}

fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/categories", post(categories::create).get(categories::list))
        .route(
            "/categories/{id}",
            axum::routing::put(categories::update).delete(categories::delete),
        )
        .route("/wallets", post(wallets::create).get(wallets::list))
        .route("/wallets/total-balance", get(wallets::total_balance))
        .route("/wallets/recompute", post(wallets::recompute))
        .route(
            "/wallets/{id}",
            get(wallets::get)
                .put(wallets::update)
                .delete(wallets::delete),
        )
        .route("/wallets/{id}/transactions", get(wallets::transactions))
        .route(
            "/transactions",
            post(transactions::create).get(transactions::list),
        )
        .route("/transactions/date-range", get(transactions::date_range))
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The full HTTP surface over `engine`.
pub fn app(engine: Engine) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
    })
}

pub async fn run(engine: Engine, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(engine, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine)).await
}
