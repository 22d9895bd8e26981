use thiserror::Error;
use warp::{reject::Reject, Reply, Rejection};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Authentication failed")]
    AuthenticationError,

    #[error("Access control error: {0}")]
    AccessControl(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl Reject for ApiError {}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) | ApiError::BadRequest(_) => 400,
            ApiError::AuthenticationError => 401,
            ApiError::Upstream(_) | ApiError::HttpError(_) => 502,
            ApiError::AccessControl(_) => 500,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "Invalid input",
            ApiError::BadRequest(_) => "Bad request",
            ApiError::AuthenticationError => "Authentication failed",
            ApiError::Upstream(_) | ApiError::HttpError(_) => "Upstream service error",
            ApiError::AccessControl(_) => "Internal server error",
        }
    }
}

pub async fn handle_rejection(err: Rejection) -> std::result::Result<impl Reply, Rejection> {
    if let Some(api_err) = err.find::<ApiError>() {
        let json = warp::reply::json(&serde_json::json!({
            "error": api_err.public_message(),
            "details": api_err.to_string(),
        }));

        let code = warp::http::StatusCode::from_u16(api_err.status_code())
            .unwrap_or(warp::http::StatusCode::INTERNAL_SERVER_ERROR);
        Ok(warp::reply::with_status(json, code))
    } else if let Some(body_err) = err.find::<warp::filters::body::BodyDeserializeError>() {
        let json = warp::reply::json(&serde_json::json!({
            "error": "Bad request",
            "details": body_err.to_string(),
        }));
        Ok(warp::reply::with_status(json, warp::http::StatusCode::BAD_REQUEST))
    } else {
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let err = ApiError::InvalidInput("content must be a string".to_string());
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "Invalid input: content must be a string");
    }

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        assert_eq!(ApiError::Upstream("search returned 503".into()).status_code(), 502);
        assert_eq!(ApiError::AccessControl("no auth".into()).status_code(), 500);
    }
}
