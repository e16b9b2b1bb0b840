use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::catalog::handlers;
use crate::features::catalog::resource::Resource;
use crate::features::catalog::services::ResourceService;

/// Role-gated CRUD routes for one resource: `/api/{path}` and `/api/{path}/{id}`.
///
/// The caller is read from request extensions, so mount these behind the token middleware.
pub fn routes<R: Resource>(service: Arc<ResourceService<R>>) -> Router {
    Router::new()
        .route(
            &format!("/api/{}", R::PATH),
            get(handlers::list::<R>).post(handlers::create::<R>),
        )
        .route(
            &format!("/api/{}/{{id}}", R::PATH),
            get(handlers::get::<R>)
                .put(handlers::update::<R>)
                .delete(handlers::delete::<R>),
        )
        .with_state(service)
}

/// Open filter/sort route: `/{path}/filter`. No authentication required.
pub fn filter_routes<R: Resource>(service: Arc<ResourceService<R>>) -> Router {
    Router::new()
        .route(
            &format!("/{}/filter", R::PATH),
            get(handlers::filter::<R>),
        )
        .with_state(service)
}
