use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use futures_util::TryStreamExt;
use std::collections::BTreeMap;

use crate::error::Error;

/// Upload cap, matching what the original gateway accepted.
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

fn bad_multipart(error: actix_multipart::MultipartError) -> Error {
    Error::custom(StatusCode::BAD_REQUEST, error)
}

/// Drain a multipart request into at most one file plus its text fields.
/// When several file parts are sent the last one wins, like the original's
/// single-file upload middleware.
pub async fn read_multipart(
    mut payload: Multipart,
) -> Result<(Option<UploadedFile>, BTreeMap<String, String>), Error> {
    let mut file = None;
    let mut fields = BTreeMap::new();

    while let Some(mut field) = payload.try_next().await.map_err(bad_multipart)? {
        let name = field.name().to_owned();
        let file_name = field
            .content_disposition()
            .get_filename()
            .map(str::to_owned);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(Error::custom(
                    StatusCode::BAD_REQUEST,
                    format!("file too large, limit is {} bytes", MAX_UPLOAD_BYTES),
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        match file_name {
            Some(file_name) => {
                let content_type = match field.content_type() {
                    Some(mime) => mime.to_string(),
                    None => mime_guess::from_path(&file_name)
                        .first_or_octet_stream()
                        .to_string(),
                };
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            None => {
                fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
            }
        }
    }

    Ok((file, fields))
}

pub fn require_field<'a>(fields: &'a BTreeMap<String, String>, name: &str) -> Result<&'a str, Error> {
    match fields.get(name).map(String::as_str) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::custom(
            StatusCode::BAD_REQUEST,
            format!("missing required field: {}", name),
        )),
    }
}

/// Only media that wallets can render is accepted.
pub fn check_media_type(content_type: &str) -> Result<(), Error> {
    if content_type.starts_with("video/") || content_type.starts_with("image/") {
        Ok(())
    } else {
        Err(Error::custom(
            StatusCode::BAD_REQUEST,
            format!("unsupported file type: {}", content_type),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_check_media_type() {
        assert!(check_media_type("video/mp4").is_ok());
        assert!(check_media_type("video/quicktime").is_ok());
        assert!(check_media_type("image/png").is_ok());
        assert!(check_media_type("image/jpeg").is_ok());
        assert!(check_media_type("application/pdf").is_err());
        assert!(check_media_type("text/html").is_err());
    }

    #[test]
    fn test_require_field() {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_owned(), "Clip".to_owned());
        fields.insert("empty".to_owned(), String::new());

        assert_eq!(require_field(&fields, "name").unwrap(), "Clip");
        let err = require_field(&fields, "empty").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(require_field(&fields, "symbol").is_err());
    }
}
