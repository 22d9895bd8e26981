use std::sync::Arc;

use warp::{Filter, Rejection, Reply};

use crate::approaches::SearchApproach;
use crate::auth::AuthHelper;
use crate::error::handle_rejection;

mod search;

pub fn routes(
    approach: Arc<SearchApproach>,
    auth_helper: Arc<AuthHelper>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let search_route = warp::path("search")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(64 * 1024))
        .and(warp::body::json())
        .and(warp::header::optional::<String>("authorization"))
        .and(with_approach(approach.clone()))
        .and(with_auth(auth_helper.clone()))
        .and_then(search::handle_search);

    let run_route = warp::path("api")
        .and(warp::path("v1"))
        .and(warp::path("search"))
        .and(warp::path("run"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(1024 * 1024))
        .and(warp::body::json())
        .and(warp::header::optional::<String>("authorization"))
        .and(with_approach(approach))
        .and(with_auth(auth_helper))
        .and_then(search::handle_run);

    search_route.or(run_route).recover(handle_rejection)
}

fn with_approach(
    approach: Arc<SearchApproach>,
) -> impl Filter<Extract = (Arc<SearchApproach>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || approach.clone())
}

fn with_auth(
    auth_helper: Arc<AuthHelper>,
) -> impl Filter<Extract = (Arc<AuthHelper>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || auth_helper.clone())
}
