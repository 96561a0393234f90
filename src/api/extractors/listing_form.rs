//! Listing submission extractor accepting JSON or multipart form data.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::domain::listing::parse_list;
use crate::domain::{ListingImage, ListingInput};
use crate::errors::{AppError, AppResult};

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Listing create/update payload.
///
/// Multipart `image*` file parts are inlined as `data:` URLs.
#[derive(Debug)]
pub struct ListingForm {
    pub input: ListingInput,
    /// Whether the payload arrived as `multipart/form-data`
    pub multipart: bool,
}

#[async_trait]
impl<S> FromRequest<S> for ListingForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            return Ok(Self {
                input: read_multipart(multipart).await?,
                multipart: true,
            });
        }

        let Json(input) = Json::<ListingInput>::from_request(req, state)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e.body_text(), "Unreadable listing payload");
                AppError::validation("Invalid data format provided")
            })?;

        Ok(Self {
            input,
            multipart: false,
        })
    }
}

async fn read_multipart(mut multipart: Multipart) -> AppResult<ListingInput> {
    let mut input = ListingInput::default();
    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name.starts_with("image") {
            let mime = field
                .content_type()
                .unwrap_or(DEFAULT_IMAGE_MIME)
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            if !bytes.is_empty() {
                images.push(ListingImage {
                    url: format!("data:{mime};base64,{}", STANDARD.encode(&bytes)),
                    alt: String::new(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        if value.is_empty() {
            continue;
        }

        match name.as_str() {
            "name" => input.name = Some(value),
            "description" => input.description = Some(value),
            "price" => input.price = Some(parse_number(&value)),
            "originalPrice" => input.original_price = Some(parse_number(&value)),
            "discount" => input.discount = Some(parse_number(&value).round() as i32),
            "quantity" => input.quantity = Some(parse_number(&value) as i32),
            "category" => input.category = Some(value),
            "subcategory" => input.subcategory = Some(value),
            "features" => input.features = Some(parse_list(&value)),
            "tags" => input.tags = Some(parse_list(&value)),
            "isActive" => input.is_active = Some(value.trim().eq_ignore_ascii_case("true")),
            _ => {}
        }
    }

    if !images.is_empty() {
        input.images = Some(images);
    }
    Ok(input)
}

/// Numeric form field; anything unparsable counts as 0.
fn parse_number(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;

    const BOUNDARY: &str = "XBOUNDARYX";

    fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request {
        let mut body = String::new();
        for (name, filename, value) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        http::Request::builder()
            .method("POST")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn test_parse_number_falls_back_to_zero() {
        assert_eq!(parse_number(" 12.5 "), 12.5);
        assert_eq!(parse_number("abc"), 0.0);
        assert_eq!(parse_number("NaN"), 0.0);
    }

    #[tokio::test]
    async fn test_multipart_fields_and_images() {
        let request = multipart_request(&[
            ("name", None, "Jute bags"),
            ("price", None, "forty"),
            ("quantity", None, "12"),
            ("features", None, "organic, bulk"),
            ("tags", None, "[\"sack\",\"eco\"]"),
            ("isActive", None, "false"),
            ("image0", Some("a.png"), "PNGDATA"),
        ]);

        let form = ListingForm::from_request(request, &()).await.unwrap();

        assert!(form.multipart);
        assert_eq!(form.input.name.as_deref(), Some("Jute bags"));
        assert_eq!(form.input.price, Some(0.0));
        assert_eq!(form.input.quantity, Some(12));
        assert_eq!(
            form.input.features,
            Some(vec!["organic".to_string(), "bulk".to_string()])
        );
        assert_eq!(form.input.tags, Some(vec!["sack".to_string(), "eco".to_string()]));
        assert_eq!(form.input.is_active, Some(false));

        let images = form.input.images.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(
            images[0].url,
            format!("data:image/png;base64,{}", STANDARD.encode("PNGDATA"))
        );
    }

    #[tokio::test]
    async fn test_json_payload() {
        let request = http::Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"Rice","price":40,"isActive":true}"#))
            .unwrap();

        let form = ListingForm::from_request(request, &()).await.unwrap();

        assert!(!form.multipart);
        assert_eq!(form.input.price, Some(40.0));
        assert!(form.input.images.is_none());
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let request = http::Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let err = ListingForm::from_request(request, &()).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid data format provided");
    }
}
