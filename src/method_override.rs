use axum::{
    Form,
    body::{Body, to_bytes},
    extract::{FromRequest, Request},
    http::{Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

/// Largest form body the override will buffer; axum's default request body limit.
const MAX_FORM_BYTES: usize = 2 * 1024 * 1024;

#[derive(Deserialize)]
struct Override {
    #[serde(rename = "_method", default)]
    method: String,
}

/// method_override
///
/// HTML forms can only send GET and POST. A urlencoded POST carrying `_method=PUT` or
/// `_method=DELETE` is re-dispatched with that method. Must run before routing, so it wraps
/// the whole router (see `create_app`). Only `/recipes/{id}` answers PUT and DELETE, so
/// every other POST passes through unbuffered.
pub async fn method_override(request: Request, next: Next) -> Response {
    if request.method() != Method::POST
        || !is_urlencoded(&request)
        || !is_recipe_path(request.uri().path())
    {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_FORM_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "form body rejected");
            return axum::http::StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let peek = Request::from_parts(parts.clone(), Body::from(bytes.clone()));
    if let Ok(Form(Override { method })) = Form::<Override>::from_request(peek, &()).await {
        match method.to_ascii_uppercase().as_str() {
            "PUT" => parts.method = Method::PUT,
            "DELETE" => parts.method = Method::DELETE,
            _ => {}
        }
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn is_urlencoded(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// `/recipes/{id}`: exactly one segment after `/recipes/`.
fn is_recipe_path(path: &str) -> bool {
    path.strip_prefix("/recipes/")
        .is_some_and(|id| !id.is_empty() && !id.contains('/'))
}
