//! Request handlers.

use actix_web::http::Method;
use actix_web::{HttpResponse, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{AppData, ServerError, storage};
use crate::data_uri;
use crate::html::render_page;
use crate::render::render_gallery;
use crate::types::{Collection, Filter, LinksPayload};

/// Register every route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/links")
            .route(web::get().to(get_links))
            .route(web::post().to(post_links))
            .route(web::method(Method::OPTIONS).to(preflight))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/api/upload")
            .route(web::post().to(upload))
            .route(web::method(Method::OPTIONS).to(preflight))
            .default_service(web::to(method_not_allowed)),
    )
    .service(web::resource("/blobs/{key:.*}").route(web::get().to(get_blob)))
    .service(web::resource("/").route(web::get().to(gallery_page)));
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "error": message }))
}

async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(json!({ "error": "Method not allowed" }))
}

/// Stored list, seeding it first when it is empty and a seed is configured.
async fn load_or_seed(data: &AppData) -> Result<Collection, ServerError> {
    let links = data.links.load().await?;
    if !links.is_empty() {
        return Ok(links);
    }
    let Some(seed_file) = &data.seed_file else {
        return Ok(links);
    };
    let seed = storage::read_seed(seed_file).await?;
    tracing::info!(count = seed.len(), path = %seed_file.display(), "seeding empty link list");
    data.links.replace(seed).await?;
    data.links.load().await
}

async fn get_links(data: web::Data<AppData>) -> Result<HttpResponse, ServerError> {
    let links = load_or_seed(&data).await?;
    Ok(HttpResponse::Ok().json(LinksPayload { links }))
}

async fn post_links(
    data: web::Data<AppData>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ServerError> {
    let mut body = body.into_inner();
    let raw = match body.get_mut("links").map(Value::take) {
        Some(raw @ Value::Array(_)) => raw,
        _ => return Ok(bad_request("links must be an array")),
    };
    let mut links: Collection = match serde_json::from_value(raw) {
        Ok(links) => links,
        Err(e) => return Ok(bad_request(&format!("invalid link entry: {e}"))),
    };

    let now = Utc::now();
    for link in links.iter_mut().filter(|l| l.updated_at.is_none()) {
        link.updated_at = Some(now);
    }

    let count = links.len();
    data.links.replace(links).await?;
    tracing::info!(count, "link list replaced");
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

#[derive(Deserialize)]
struct UploadBody {
    filename: Option<String>,
    data: Option<String>,
}

async fn upload(
    data: web::Data<AppData>,
    body: web::Json<UploadBody>,
) -> Result<HttpResponse, ServerError> {
    let UploadBody { filename, data: payload } = body.into_inner();
    let (filename, payload) = match (filename, payload) {
        (Some(f), Some(p)) if !f.trim().is_empty() && !p.trim().is_empty() => (f, p),
        _ => return Ok(bad_request("filename and data are required")),
    };

    let decoded = if data_uri::is_data_uri(&payload) {
        data_uri::decode(&payload)
            .map(|d| d.bytes)
            .map_err(|e| e.to_string())
    } else {
        STANDARD.decode(payload.trim()).map_err(|e| e.to_string())
    };
    let bytes = match decoded {
        Ok(bytes) => bytes,
        Err(e) => return Ok(bad_request(&format!("invalid data: {e}"))),
    };

    let key = data.blobs.put(&filename, &bytes).await?;
    Ok(HttpResponse::Ok().json(json!({ "url": data.blobs.public_url(&key) })))
}

async fn get_blob(
    data: web::Data<AppData>,
    key: web::Path<String>,
) -> Result<HttpResponse, ServerError> {
    Ok(match data.blobs.get(&key).await? {
        Some(blob) => HttpResponse::Ok()
            .content_type(blob.content_type)
            .body(blob.bytes),
        None => HttpResponse::NotFound().json(json!({ "error": "Not found" })),
    })
}

#[derive(Deserialize)]
struct PageQuery {
    category: Option<String>,
}

async fn gallery_page(
    data: web::Data<AppData>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ServerError> {
    let links = load_or_seed(&data).await?;
    let filter = Filter::parse(query.category.as_deref().unwrap_or("all"));
    let view = render_gallery(&links, &filter, false, &data.render);
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_page(&view, &data.page).into_string()))
}
