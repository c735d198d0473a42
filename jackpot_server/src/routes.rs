use std::path::Path as FsPath;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use chrono::Utc;
use jackpot_core::registry;
use jackpot_core::settings as settings_ops;
use jackpot_core::{engine, AudioKind, CombinationId, MediaSlot};
use jackpot_shared::{
    CombinationPatch, CombinationResponse, ComboTextRequest, OkResponse, PatchCombinationResponse,
    SettingsPatch, SettingsResponse, SpinRequest, SpinResponse, StateResponse, UploadResponse,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::AppError;
use crate::media;
use crate::state::AppState;

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// JSON body whose rejections answer with the API's `{error}` shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

type ApiResult<T> = Result<Json<T>, AppError>;

pub fn router(state: AppState, static_dir: &FsPath) -> Router {
    let uploads = Router::new()
        .route(
            "/api/upload/background",
            post(upload_background).delete(remove_background),
        )
        .route("/api/upload/audio/:type", post(upload_audio).delete(remove_audio))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    let api = Router::new()
        .route("/api/state", get(get_state))
        .route("/api/spin", post(spin))
        .route("/api/combinations", post(add_combination))
        .route("/api/combinations/by-text", delete(remove_combination))
        .route("/api/combinations/shuffle", post(shuffle_combinations))
        .route("/api/combinations/:id", patch(patch_combination))
        .route("/api/reset/defaults", post(reset_defaults))
        .route("/api/reset/stats", post(reset_stats))
        .route("/api/settings", patch(patch_settings))
        .merge(uploads);

    let client = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/healthz", get(health))
        .merge(api)
        .nest_service(media::UPLOADS_URL_PREFIX, ServeDir::new(state.uploads_dir()))
        .fallback_service(client)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}

async fn get_state(State(state): State<AppState>) -> ApiResult<StateResponse> {
    Ok(Json(state.read(registry::snapshot).await?))
}

async fn spin(
    State(state): State<AppState>,
    body: Option<ApiJson<SpinRequest>>,
) -> ApiResult<SpinResponse> {
    let winner_name = body.and_then(|ApiJson(req)| req.winner_name);
    let outcome = state
        .transact(move |doc| {
            let mut rng = rand::thread_rng();
            engine::spin(doc, winner_name.as_deref(), &mut rng, Utc::now())
        })
        .await?;
    info!(
        combination_id = outcome.combination_id,
        spin_count = outcome.spin_count,
        "spin"
    );
    Ok(Json(outcome))
}

async fn patch_combination(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    ApiJson(body): ApiJson<CombinationPatch>,
) -> ApiResult<PatchCombinationResponse> {
    let id: CombinationId = raw_id
        .parse()
        .map_err(|_| AppError::BadCombinationId(raw_id))?;
    let combination = state
        .transact(move |doc| registry::patch(doc, id, body))
        .await?;
    Ok(Json(PatchCombinationResponse {
        ok: true,
        combination,
    }))
}

async fn add_combination(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ComboTextRequest>,
) -> Result<(StatusCode, Json<CombinationResponse>), AppError> {
    let combination = state
        .transact(move |doc| registry::add(doc, &body.combo))
        .await?;
    info!(id = combination.id, combo = %combination.combo, "added combination");
    Ok((StatusCode::CREATED, Json(CombinationResponse { combination })))
}

async fn remove_combination(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ComboTextRequest>,
) -> ApiResult<OkResponse> {
    state
        .transact(move |doc| registry::remove_by_text(doc, &body.combo))
        .await?;
    Ok(Json(OkResponse::ok()))
}

async fn shuffle_combinations(State(state): State<AppState>) -> ApiResult<OkResponse> {
    state
        .transact(|doc| {
            registry::shuffle(doc, &mut rand::thread_rng());
            Ok(())
        })
        .await?;
    Ok(Json(OkResponse::ok()))
}

async fn reset_defaults(State(state): State<AppState>) -> ApiResult<OkResponse> {
    state
        .transact(|doc| {
            registry::reset_defaults(doc);
            Ok(())
        })
        .await?;
    info!("combinations reset to defaults");
    Ok(Json(OkResponse::ok()))
}

async fn reset_stats(State(state): State<AppState>) -> ApiResult<OkResponse> {
    state
        .transact(|doc| {
            registry::reset_stats(doc);
            Ok(())
        })
        .await?;
    info!("statistics reset");
    Ok(Json(OkResponse::ok()))
}

async fn patch_settings(
    State(state): State<AppState>,
    body: Result<Json<SettingsPatch>, JsonRejection>,
) -> ApiResult<SettingsResponse> {
    let body = match body {
        Ok(Json(patch)) => patch,
        Err(JsonRejection::MissingJsonContentType(_)) => SettingsPatch::default(),
        Err(rejection) => return Err(rejection.into()),
    };
    let settings = state
        .transact(move |doc| {
            settings_ops::apply_patch(&mut doc.settings, body);
            Ok(doc.settings.clone())
        })
        .await?;
    Ok(Json(SettingsResponse { ok: true, settings }))
}

async fn upload_background(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UploadResponse> {
    replace_media(&state, MediaSlot::Background, multipart?).await
}

async fn remove_background(State(state): State<AppState>) -> ApiResult<OkResponse> {
    clear_media(&state, MediaSlot::Background).await
}

async fn upload_audio(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UploadResponse> {
    let kind: AudioKind = kind.parse()?;
    replace_media(&state, MediaSlot::Audio(kind), multipart?).await
}

async fn remove_audio(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<OkResponse> {
    let kind: AudioKind = kind.parse()?;
    clear_media(&state, MediaSlot::Audio(kind)).await
}

/// Store the `file` field, point the slot at it, then drop the file the slot
/// pointed at before.
async fn replace_media(
    state: &AppState,
    slot: MediaSlot,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await?;
        upload = Some((file_name, bytes));
        break;
    }
    let (file_name, bytes) = upload.ok_or(AppError::MissingFile)?;

    let stored = media::store(state.uploads_dir(), slot, file_name.as_deref(), bytes)
        .await
        .map_err(AppError::Upload)?;

    let url = stored.url.clone();
    let previous = match state
        .transact(move |doc| Ok(settings_ops::set_media_url(doc, slot, url)))
        .await
    {
        Ok(previous) => previous,
        Err(e) => {
            media::remove(state.uploads_dir(), &stored.url).await;
            return Err(e);
        }
    };
    if let Some(previous) = previous {
        media::remove(state.uploads_dir(), &previous).await;
    }

    Ok(Json(UploadResponse { url: stored.url }))
}

async fn clear_media(state: &AppState, slot: MediaSlot) -> ApiResult<OkResponse> {
    let previous = state
        .transact(move |doc| Ok(settings_ops::set_media_url(doc, slot, String::new())))
        .await?;
    if let Some(previous) = previous {
        media::remove(state.uploads_dir(), &previous).await;
    }
    Ok(Json(OkResponse::ok()))
}
