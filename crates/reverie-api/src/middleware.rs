use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

fn key_matches(provided: Option<&str>, expected: &str) -> bool {
    provided.is_some_and(|key| !expected.is_empty() && key == expected)
}

/// Gate for the dashboard routes: a shared admin key in the `X-Admin-Key`
/// header. The editors are a small trusted group; per-user accounts are a
/// future feature.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, StatusCode> {
    let provided = req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    let expected =
        std::env::var("REVERIE_ADMIN_KEY").unwrap_or_else(|_| "dev-admin-change-me".into());

    if !key_matches(provided, &expected) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(req).await)
}
