use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Json, Router};
use engine_logging::engine_info;
use finder_core::{CoreError, JobId, ListingView, ResultView, SearchService, Submission};
use serde::{Deserialize, Serialize};

use crate::render;

#[derive(Clone)]
pub struct AppState {
    pub service: SearchService,
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(form_page).post(submit_form))
        .route("/result/:action", get(listing_page))
        .route("/url/:id", get(result_page))
        .route("/favicon.ico", get(favicon))
        .route("/api/jobs", get(list_jobs).post(submit_job))
        .route("/api/jobs/:id", get(job_status))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    engine_info!("Request method={} uri={}", request.method(), request.uri());
    next.run(request).await
}

/// Browser-facing failure: an HTML error page with a matching status.
struct HtmlError(CoreError);

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        (status_for(&self.0), Html(render::error(&self.0.to_string()))).into_response()
    }
}

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
}

/// JSON API failure.
struct ApiError(CoreError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            status_for(&self.0),
            Json(ApiErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::UnknownUrl(_) | CoreError::AlreadyComplete => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn form_page() -> Html<String> {
    Html(render::form())
}

#[derive(Debug, Deserialize)]
struct QueryForm {
    #[serde(default)]
    query: String,
}

async fn submit_form(
    State(state): State<AppState>,
    Form(form): Form<QueryForm>,
) -> Result<Html<String>, HtmlError> {
    let submission = Submission::from_json(&form.query).map_err(HtmlError)?;
    let id = state.service.submit(submission).map_err(HtmlError)?;
    Ok(Html(render::submitted(id)))
}

async fn listing_page(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> Result<Html<String>, HtmlError> {
    if action != "check" {
        return Err(HtmlError(CoreError::NotFound(action)));
    }
    Ok(Html(render::listing(&ListingView::of(
        state.service.registry(),
    ))))
}

async fn result_page(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, HtmlError> {
    let view = result_view(&state, &raw_id).map_err(HtmlError)?;
    Ok(Html(render::result(&view)))
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub id: JobId,
}

async fn submit_job(
    State(state): State<AppState>,
    payload: Result<Json<Submission>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitResponse>), Response> {
    let Json(submission) = payload.map_err(reject_payload)?;
    let id = state
        .service
        .submit(submission)
        .map_err(|err| ApiError(err).into_response())?;
    Ok((StatusCode::CREATED, Json(SubmitResponse { id })))
}

/// Unreadable JSON is invalid input like any other bad submission; only an
/// oversized body keeps axum's own 413.
fn reject_payload(rejection: JsonRejection) -> Response {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return rejection.into_response();
    }
    ApiError(CoreError::InvalidInput(rejection.body_text())).into_response()
}

async fn list_jobs(State(state): State<AppState>) -> Json<ListingView> {
    Json(ListingView::of(state.service.registry()))
}

async fn job_status(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ResultView>, ApiError> {
    result_view(&state, &raw_id).map(Json).map_err(ApiError)
}

fn result_view(state: &AppState, raw_id: &str) -> Result<ResultView, CoreError> {
    let (id, job) = state.service.registry().resolve(raw_id)?;
    Ok(ResultView::of(id, &job))
}
