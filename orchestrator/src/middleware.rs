/// CORS for the browser search page, which posts JSON and, once login is
/// enabled, a bearer token.
pub fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["Content-Type", "Authorization", "Accept"])
        .allow_methods(vec!["POST", "GET", "OPTIONS"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp::Filter;

    fn preflight(request_headers: &str) -> warp::test::RequestBuilder {
        warp::test::request()
            .method("OPTIONS")
            .path("/search")
            .header("origin", "https://search.example.com")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", request_headers)
    }

    #[tokio::test]
    async fn preflight_allows_json_with_bearer_token() {
        let route = warp::any().map(warp::reply).with(cors());

        let response = preflight("content-type, authorization").reply(&route).await;

        assert_eq!(response.status(), 200);
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn preflight_rejects_unlisted_headers() {
        let route = warp::any().map(warp::reply).with(cors());

        let response = preflight("x-forwarded-user").reply(&route).await;

        assert_eq!(response.status(), 403);
    }
}
