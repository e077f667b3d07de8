//! Settings API endpoints.

use api_types::settings::{ColorMode, ColorModeUpdate, SettingsView};
use axum::{Extension, Json, extract::State};
use engine::{UserSettings, users};

use crate::{ServerError, categories::map_structure, server::ServerState};

fn map_mode(mode: engine::ColorMode) -> ColorMode {
    match mode {
        engine::ColorMode::Light => ColorMode::Light,
        engine::ColorMode::Dark => ColorMode::Dark,
        engine::ColorMode::System => ColorMode::System,
    }
}

fn engine_mode(mode: ColorMode) -> engine::ColorMode {
    match mode {
        ColorMode::Light => engine::ColorMode::Light,
        ColorMode::Dark => engine::ColorMode::Dark,
        ColorMode::System => engine::ColorMode::System,
    }
}

fn map_settings(settings: &UserSettings) -> SettingsView {
    SettingsView {
        id: settings.user_id.clone(),
        color_mode: map_mode(settings.color_mode),
        dark_mode: settings.color_mode.dark_mode(),
        categories: map_structure(&settings.categories),
        version: settings.version,
        updated_at: settings.updated_at,
        last_sync: settings.last_sync,
    }
}

/// Return the settings document, creating it with default categories on
/// first access.
pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<SettingsView>, ServerError> {
    let settings = state.engine.settings(&user.username).await?;
    Ok(Json(map_settings(&settings)))
}

pub async fn set_color_mode(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ColorModeUpdate>,
) -> Result<Json<SettingsView>, ServerError> {
    let settings = state
        .engine
        .set_color_mode(&user.username, engine_mode(payload.mode))
        .await?;
    Ok(Json(map_settings(&settings)))
}
