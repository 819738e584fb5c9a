//! The user-facing web server: one route that shows the upload form on GET and
//! runs the upload through the gateway on POST. This is the "front end";
//! everything hard happens on the remote inference service.

use super::pages;
use super::WebError;
use crate::config::MAX_UPLOAD_BYTES;
use crate::gateway::{Gateway, UploadOutcome, UploadedImage};
use actix_multipart::Multipart;
use actix_web::http::header::{self, ContentType};
use actix_web::{get, post, web, HttpResponse, Responder};
use futures_util::TryStreamExt;
use tracing::info;

type Result<T> = std::result::Result<T, WebError>;

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(pages::index(None, None))
}

#[post("/")]
pub async fn classify(
    mut payload: Multipart,
    state: web::Data<Gateway>,
) -> Result<HttpResponse> {
    let upload = read_upload(&mut payload).await?;

    match state.handle_upload(upload).await? {
        UploadOutcome::NoFile => Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/"))
            .finish()),
        UploadOutcome::Failed => Ok(html(pages::index(Some("Prediction failed."), None))),
        UploadOutcome::Classified { label, image_url } => {
            info!("finished serving classification request");
            Ok(html(pages::index(Some(&label), Some(&image_url))))
        }
    }
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

/// Pull the `file` field out of the multipart body, enforcing the upload
/// ceiling before anything downstream touches the bytes
async fn read_upload(payload: &mut Multipart) -> Result<Option<UploadedImage>> {
    while let Some(mut field) = payload.try_next().await? {
        if field.name() != "file" {
            continue;
        }

        let filename = field
            .content_disposition()
            .get_filename()
            .unwrap_or_default()
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(WebError::payload_too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(Some(UploadedImage { filename, bytes }));
    }

    Ok(None)
}
