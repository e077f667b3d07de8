use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{SyncClient, accounts, categories, dashboard, settings, sync};
use engine::{Engine, users};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
    pub sync: Option<Arc<SyncClient>>,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<users::Model> = users::Entity::find()
        .filter(users::Column::Username.eq(auth_header.username()))
        .filter(users::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|err| {
            tracing::error!("auth lookup failed: {err}");
            StatusCode::UNAUTHORIZED
        })?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/settings", get(settings::get))
        .route("/settings/colorMode", put(settings::set_color_mode))
        .route(
            "/categories/{kind}",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{kind}/{index}",
            axum::routing::patch(categories::update).delete(categories::delete),
        )
        .route("/accounts", get(accounts::list).post(accounts::upsert))
        .route("/accounts/{id}", axum::routing::patch(accounts::update))
        .route("/dashboard", get(dashboard::get))
        .route("/sync", post(sync::trigger))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

/// Build the API router. Used by the listener below and by tests.
pub fn app(engine: Engine, db: DatabaseConnection, sync: Option<SyncClient>) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
        db,
        sync: sync.map(Arc::new),
    })
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    sync: Option<SyncClient>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);
    if sync.is_none() {
        tracing::info!("bank sync disabled");
    }

    axum::serve(listener, app(engine, db, sync)).await
}
