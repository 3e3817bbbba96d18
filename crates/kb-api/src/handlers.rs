//! # kb-api Handlers
//!
//! Thin translation between HTTP requests and the `BoardService` / upload
//! side-channel. Thread ids arrive as path segments and are parsed by hand
//! so a malformed id is a 400, not a routing miss.

use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt as _;
use serde::{Deserialize, Serialize};

use kb_core::error::AppError;
use kb_core::models::Category;
use kb_core::service::{CreatePostInput, CreateThreadInput};
use kb_core::traits::MAX_IMAGE_BYTES;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ThreadListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateThreadRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub image_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub body: Option<String>,
    pub author: Option<String>,
    pub image_path: Option<String>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// `GET /threads?category=<name|all>`
pub async fn list_threads(
    state: web::Data<AppState>,
    query: web::Query<ThreadListQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = Category::parse_filter(query.category.as_deref())?;
    let threads = state.service.list_threads(filter).await?;
    Ok(HttpResponse::Ok().json(threads))
}

/// `POST /threads`
pub async fn create_thread(
    state: web::Data<AppState>,
    body: web::Json<CreateThreadRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    let thread = state
        .service
        .create_thread(CreateThreadInput {
            title: req.title,
            author: req.author,
            category: req.category,
            image_path: req.image_path,
        })
        .await?;
    Ok(HttpResponse::Created().json(thread))
}

/// `GET /threads/{id}`
pub async fn get_thread(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    match state.service.get_thread(id).await? {
        Some(thread) => Ok(HttpResponse::Ok().json(thread)),
        None => Err(AppError::NotFound("thread", id).into()),
    }
}

/// `GET /posts/{threadId}` — empty list for an unknown thread, by contract.
pub async fn list_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let thread_id = parse_id(&path)?;
    let posts = state.service.list_posts(thread_id).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// `POST /posts/{threadId}` — answers with the full refreshed post list.
pub async fn create_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, ApiError> {
    let thread_id = parse_id(&path)?;
    let req = body.into_inner();
    let posts = state
        .service
        .create_post(
            thread_id,
            CreatePostInput {
                body: req.body,
                author: req.author,
                image_path: req.image_path,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(posts))
}

/// `POST /upload` — multipart with a single `image` field.
///
/// The field is streamed with a running size check so an oversize payload is
/// rejected without buffering it whole; the media store re-validates size and
/// type before anything is written.
pub async fn upload_image(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(bad_multipart)?;
        if field.name() != "image" {
            // Unrelated form fields are drained and ignored.
            while let Some(chunk) = field.next().await {
                chunk.map_err(bad_multipart)?;
            }
            continue;
        }

        let content_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_default();

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(bad_multipart)?;
            if data.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(AppError::UploadRejected(
                    "image exceeds the 5 MiB limit".to_string(),
                )
                .into());
            }
            data.extend_from_slice(&chunk);
        }

        let url = state.media.save_upload(&data, &content_type).await?;
        return Ok(HttpResponse::Ok().json(UploadResponse { url }));
    }

    Err(AppError::Validation("image field is required".to_string()).into())
}

pub async fn allow_get() -> HttpResponse {
    method_not_allowed("GET")
}

pub async fn allow_post() -> HttpResponse {
    method_not_allowed("POST")
}

pub async fn allow_get_post() -> HttpResponse {
    method_not_allowed("GET, POST")
}

fn method_not_allowed(allow: &'static str) -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, allow))
        .finish()
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::Validation(format!("invalid thread id: {raw}")).into())
}

fn bad_multipart(err: actix_multipart::MultipartError) -> ApiError {
    AppError::Validation(format!("invalid multipart payload: {err}")).into()
}
