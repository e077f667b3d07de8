use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{app, run_with_listener};
pub use sync::{SyncClient, SyncError, SyncOutcome};

mod accounts;
mod categories;
mod dashboard;
mod server;
mod settings;
mod sync;

pub mod types {
    pub mod settings {
        pub use api_types::settings::{ColorMode, ColorModeUpdate, SettingsView};
    }

    pub mod category {
        pub use api_types::category::{
            CategoryDelete, CategoryDeleted, CategoryListResponse, CategoryNew,
            CategoryStructureView, CategoryUpdate, CategoryView,
        };
    }

    pub mod account {
        pub use api_types::account::{
            AccountList, AccountListResponse, AccountNew, AccountSource, AccountUpdate,
            AccountView, AccountsUpsert, AccountsUpserted,
        };
    }

    pub mod dashboard {
        pub use api_types::dashboard::{BucketView, CategoryCountView, Dashboard};
    }

    pub mod sync {
        pub use api_types::sync::SyncResponse;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Sync(SyncError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::Category(_) | EngineError::InvalidAmount(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Serialization(json_err) => {
            tracing::error!("settings serialization error: {json_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

fn status_for_sync_error(err: &SyncError) -> StatusCode {
    match err {
        SyncError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        SyncError::InvalidUrl(_) | SyncError::Transport(_) | SyncError::Upstream { .. } => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Sync(err) => {
                tracing::warn!("sync failed: {err}");
                (status_for_sync_error(&err), err.to_string())
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<SyncError> for ServerError {
    fn from(value: SyncError) -> Self {
        Self::Sync(value)
    }
}

#[cfg(test)]
mod tests {
    use engine::CategoryError;

    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let res = ServerError::from(EngineError::from(CategoryError::CapExceeded { max: 100 }))
            .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn database_error_maps_to_500() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("disk on fire".to_string()));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn sync_errors_map_to_gateway_statuses() {
        let res = ServerError::from(SyncError::NotConfigured).into_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        let res = ServerError::from(SyncError::Upstream {
            status: 500,
            body: "boom".to_string(),
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
