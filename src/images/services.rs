use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::ai::ImagePayload;
use crate::errors::AppError;
use crate::state::AppState;

/// Assumed when the client sends bare base64 without a data-URL header.
const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// A client image after base64 decoding.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub bytes: Bytes,
    pub content_type: String,
    /// Canonical base64 of `bytes`, as sent to the AI.
    pub base64: String,
}

impl DecodedImage {
    pub fn payload(&self) -> ImagePayload<'_> {
        ImagePayload {
            base64: &self.base64,
            mime_type: &self.content_type,
        }
    }

    pub fn content_hash(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

/// Accepts `data:<mime>;base64,<payload>` or bare base64.
pub fn decode_image(raw: &str) -> Result<DecodedImage, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::BadRequest("image is required".into()));
    }

    let (content_type, payload) = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| AppError::BadRequest("malformed data URL".into()))?;
            let mut parts = header.split(';');
            let mime = parts.next().unwrap_or_default().trim();
            if !parts.any(|p| p.trim() == "base64") {
                return Err(AppError::BadRequest("data URL must be base64 encoded".into()));
            }
            let mime = if mime.is_empty() { DEFAULT_CONTENT_TYPE } else { mime };
            (mime.to_ascii_lowercase(), payload)
        }
        None => (DEFAULT_CONTENT_TYPE.to_owned(), raw),
    };

    let compact: String = payload.split_ascii_whitespace().collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| AppError::BadRequest("image is not valid base64".into()))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("image is empty".into()));
    }

    Ok(DecodedImage {
        base64: STANDARD.encode(&bytes),
        bytes: Bytes::from(bytes),
        content_type,
    })
}

pub async fn upload_meal_photo(
    st: &AppState,
    meal_id: Uuid,
    image: &DecodedImage,
) -> anyhow::Result<String> {
    let ext = ext_from_mime(&image.content_type).unwrap_or("bin");
    let key = format!("meals/{meal_id}.{ext}");
    st.storage
        .put_object(&key, image.bytes.clone(), &image.content_type)
        .await
        .with_context(|| format!("put_object {key}"))?;
    Ok(key)
}

pub async fn photo_url(st: &AppState, key: &str) -> anyhow::Result<String> {
    st.storage
        .presign_get(key, st.config.storage.url_ttl_secs)
        .await
        .with_context(|| format!("presign url for {key}"))
}

pub async fn delete_photo(st: &AppState, key: &str) -> anyhow::Result<()> {
    st.storage.delete_object(key).await
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}
