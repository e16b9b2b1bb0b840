//! HTTP application wiring.
//!
//! Builds every router on top of a single data store so `main` stays small and the
//! whole application can be exercised in tests against [`MemoryStore`].
//!
//! [`MemoryStore`]: crate::core::store::memory::MemoryStore

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::{AuthConfig, Config};
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::store::{AccountStore, Lookup, Repository};
use crate::features::auth::routes as auth_routes;
use crate::features::auth::{AuthService, TokenService};
use crate::features::catalog::resource::Resource;
use crate::features::catalog::routes as catalog_routes;
use crate::features::catalog::ResourceService;
use crate::features::regions::{CityResource, ProvinceResource};
use crate::features::tourism_types::TourismTypeResource;
use crate::features::tourist_spots::TouristSpotResource;

/// Everything the application needs from a data store.
pub trait CatalogStore:
    Lookup
    + AccountStore
    + Repository<ProvinceResource>
    + Repository<CityResource>
    + Repository<TourismTypeResource>
    + Repository<TouristSpotResource>
    + 'static
{
}

impl<T> CatalogStore for T where
    T: Lookup
        + AccountStore
        + Repository<ProvinceResource>
        + Repository<CityResource>
        + Repository<TourismTypeResource>
        + Repository<TouristSpotResource>
        + 'static
{
}

fn resource_service<R, S>(store: &Arc<S>) -> Arc<ResourceService<R>>
where
    R: Resource,
    S: CatalogStore + Repository<R>,
{
    let repo: Arc<dyn Repository<R>> = store.clone();
    let lookup: Arc<dyn Lookup> = store.clone();
    Arc::new(ResourceService::new(repo, lookup))
}

/// Catalog, filter and auth routes, without the transport layers.
pub fn api_router<S: CatalogStore>(store: Arc<S>, auth: &AuthConfig) -> Router {
    let accounts: Arc<dyn AccountStore> = store.clone();
    let token_service = Arc::new(TokenService::new(accounts.clone(), auth.token_ttl));
    let auth_service = Arc::new(AuthService::new(
        accounts,
        Arc::clone(&token_service),
        auth.password_min_length,
    ));

    let provinces = resource_service::<ProvinceResource, S>(&store);
    let cities = resource_service::<CityResource, S>(&store);
    let tourism_types = resource_service::<TourismTypeResource, S>(&store);
    let tourist_spots = resource_service::<TouristSpotResource, S>(&store);

    // Role-gated routes: the caller is resolved from the token header
    let protected_routes = Router::new()
        .merge(catalog_routes::routes(Arc::clone(&tourist_spots)))
        .merge(catalog_routes::routes(Arc::clone(&provinces)))
        .merge(catalog_routes::routes(Arc::clone(&cities)))
        .merge(catalog_routes::routes(Arc::clone(&tourism_types)))
        .route_layer(from_fn_with_state(
            Arc::clone(&token_service),
            middleware::auth_middleware,
        ));

    // Open filter/sort routes (no auth required)
    let filter_routes = Router::new()
        .merge(catalog_routes::filter_routes(tourist_spots))
        .merge(catalog_routes::filter_routes(provinces))
        .merge(catalog_routes::filter_routes(cities))
        .merge(catalog_routes::filter_routes(tourism_types));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> StatusCode {
        StatusCode::OK
    }

    Router::new()
        .merge(protected_routes)
        .merge(filter_routes)
        .merge(auth_routes::public_routes(auth_service))
        .route("/health", get(health_check))
}

/// Full application: API routes plus Swagger UI, CORS, request ids, tracing and body limit.
pub fn build_router<S: CatalogStore>(store: Arc<S>, config: &Config) -> Router {
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    Router::new()
        .merge(swagger)
        .merge(api_router(store, &config.auth))
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use chrono::{DateTime, Utc};
    use serde_json::{json, Map, Value};

    use crate::shared::constants::{
        MSG_ADMIN_ONLY, MSG_INVALID_CREDENTIALS, MSG_INVALID_TOKEN, MSG_NOT_AUTHENTICATED,
        MSG_PASSWORD_MISMATCH, MSG_PERMISSION_DENIED,
    };
    use crate::shared::test_helpers::{with_token, TestApp, TEST_PASSWORD};

    async fn create(app: &TestApp, token: &str, path: &str, body: Value) -> Value {
        let response = with_token(app.server.post(path), token).json(&body).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = TestApp::new().await;
        app.server.get("/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_province_lifecycle() {
        let app = TestApp::new().await;
        let admin = app.login("admin").await;

        let province = create(
            &app,
            &admin,
            "/api/provinces",
            json!({"name": "Jawa Barat", "abbreviation": "JB"}),
        )
        .await;
        let id = province["id"].as_i64().unwrap();
        let item = format!("/api/provinces/{}", id);

        let response = with_token(app.server.get(&item), &admin).await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["message"], "Province found");
        assert_eq!(body["data"]["name"], "Jawa Barat");

        let response = with_token(app.server.put(&item), &admin)
            .json(&json!({"capital_city": "Bandung"}))
            .await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["message"], "Province successfully updated");
        assert_eq!(body["data"]["capital_city"], "Bandung");
        assert_eq!(body["data"]["name"], "Jawa Barat");
        assert_eq!(body["data"]["abbreviation"], "JB");

        let response = with_token(app.server.delete(&item), &admin).await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({"status": 200, "message": "Province successfully deleted", "data": {}})
        );

        let response = with_token(app.server.get(&item), &admin).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>(),
            json!({"status": 400, "message": "Province not found", "data": {}})
        );
    }

    #[tokio::test]
    async fn test_crud_round_trip_for_every_resource() {
        let app = TestApp::new().await;
        let admin = app.login("admin").await;
        let province = create(&app, &admin, "/api/provinces", json!({"name": "Bali"})).await;
        let city = create(
            &app,
            &admin,
            "/api/cities",
            json!({"name": "Denpasar", "province": province["id"]}),
        )
        .await;

        // (path, label, create body, updated field, new value)
        let cases = [
            (
                "/api/provinces",
                "Province",
                json!({
                    "name": "Nusa Tenggara Barat",
                    "abbreviation": "NTB",
                    "capital_city": "Mataram",
                    "population": 5320092,
                    "area_km2": 20153.15
                }),
                "capital_city",
                json!("Kota Mataram"),
            ),
            (
                "/api/cities",
                "City",
                json!({
                    "name": "Singaraja",
                    "province": province["id"],
                    "is_capital": false,
                    "area_code": "0362",
                    "latitude": "-8.112000",
                    "longitude": "115.088000",
                    "population": 150000
                }),
                "population",
                json!(160000),
            ),
            (
                "/api/tourism-types",
                "Tourism type",
                json!({"name": "Temple", "description": "Hindu temples"}),
                "is_active",
                json!(false),
            ),
            (
                "/api/tourist-spots",
                "Tourist spot",
                json!({
                    "name": "Pura Tanah Lot",
                    "description": "Sea temple",
                    "address": "Beraban, Kediri",
                    "city": city["id"],
                    "distance_from_city": "20.50",
                    "status": "Active"
                }),
                "name",
                json!("Tanah Lot"),
            ),
        ];

        for (path, label, body, field, value) in cases {
            let created = create(&app, &admin, path, body.clone()).await;
            for (key, sent) in body.as_object().unwrap() {
                assert_eq!(&created[key], sent, "{} {}", path, key);
            }

            let item = format!("{}/{}", path, created["id"]);
            let response = with_token(app.server.get(&item), &admin).await;
            response.assert_status_ok();
            assert_eq!(response.json::<Value>()["data"], created, "{}", path);

            tokio::time::sleep(Duration::from_millis(5)).await;
            let mut change = Map::new();
            change.insert(field.to_string(), value.clone());
            let response = with_token(app.server.put(&item), &admin)
                .json(&Value::Object(change))
                .await;
            response.assert_status_ok();
            let updated = response.json::<Value>()["data"].clone();
            assert_eq!(updated[field], value, "{}", path);

            for (key, before) in created.as_object().unwrap() {
                if key == field || key == "updated_by" || key == "last_modified" {
                    continue;
                }
                assert_eq!(&updated[key], before, "{} {}", path, key);
            }
            if let Some(stamp) = created["last_modified"].as_str() {
                let before = stamp.parse::<DateTime<Utc>>().unwrap();
                let after = updated["last_modified"]
                    .as_str()
                    .unwrap()
                    .parse::<DateTime<Utc>>()
                    .unwrap();
                assert!(after > before, "{}", path);
                assert_eq!(updated["updated_by"], 1);
            }

            with_token(app.server.delete(&item), &admin)
                .await
                .assert_status_ok();
            let response = with_token(app.server.get(&item), &admin).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            assert_eq!(
                response.json::<Value>()["message"],
                format!("{} not found", label)
            );
        }
    }

    #[tokio::test]
    async fn test_wrong_json_type_is_reported_under_its_field() {
        let app = TestApp::new().await;
        let admin = app.login("admin").await;

        let response = with_token(app.server.post("/api/provinces"), &admin)
            .json(&json!({"name": "Bali", "population": "lots"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["message"], "Invalid input.");
        assert!(body["data"]["population"][0].is_string());
        assert!(body["data"].get("name").is_none());
    }

    #[tokio::test]
    async fn test_non_numeric_id_uses_the_envelope() {
        let app = TestApp::new().await;
        let admin = app.login("admin").await;

        let response = with_token(app.server.get("/api/provinces/abc"), &admin).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["status"], 400);
        assert!(body["message"].is_string());
        assert_eq!(body["data"], json!({}));
    }

    #[tokio::test]
    async fn test_role_gate_precedes_id_parsing() {
        let app = TestApp::new().await;

        let response = app.server.delete("/api/provinces/abc").await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(response.json::<Value>()["message"], MSG_NOT_AUTHENTICATED);

        let visitor = app.login("visitor").await;
        let response = with_token(app.server.get("/api/cities/abc"), &visitor).await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(response.json::<Value>()["message"], MSG_PERMISSION_DENIED);
    }

    #[tokio::test]
    async fn test_long_address_is_stored() {
        let app = TestApp::new().await;
        let admin = app.login("admin").await;
        let province = create(&app, &admin, "/api/provinces", json!({"name": "Bali"})).await;
        let city = create(
            &app,
            &admin,
            "/api/cities",
            json!({"name": "Denpasar", "province": province["id"]}),
        )
        .await;

        let address = format!("{}Bali", "Jalan Raya Ubud ".repeat(20));
        let spot = create(
            &app,
            &admin,
            "/api/tourist-spots",
            json!({
                "name": "Monkey Forest",
                "address": address,
                "city": city["id"],
                "distance_from_city": "1.25"
            }),
        )
        .await;
        assert_eq!(spot["address"], address.as_str());
    }

    #[tokio::test]
    async fn test_list_returns_bare_array() {
        let app = TestApp::new().await;
        let admin = app.login("admin").await;
        create(&app, &admin, "/api/tourism-types", json!({"name": "Beach"})).await;

        let response = with_token(app.server.get("/api/tourism-types"), &admin).await;
        response.assert_status_ok();
        let rows = response.json::<Value>();
        assert_eq!(rows.as_array().map(Vec::len), Some(1));
        assert_eq!(rows[0]["is_active"], true);
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_forbidden() {
        let app = TestApp::new().await;
        let response = app.server.get("/api/provinces").await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(response.json::<Value>()["message"], MSG_NOT_AUTHENTICATED);
    }

    #[tokio::test]
    async fn test_account_without_roles_is_forbidden() {
        let app = TestApp::new().await;
        let visitor = app.login("visitor").await;
        let response = with_token(app.server.get("/api/cities"), &visitor).await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(response.json::<Value>()["message"], MSG_PERMISSION_DENIED);
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let app = TestApp::new().await;
        let response = with_token(app.server.get("/api/provinces"), "deadbeef").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], MSG_INVALID_TOKEN);
    }

    #[tokio::test]
    async fn test_editor_cannot_create_but_can_update() {
        let app = TestApp::new().await;
        let admin = app.login("admin").await;
        let editor = app.login("editor").await;

        let province = create(&app, &admin, "/api/provinces", json!({"name": "Bali"})).await;
        let city = create(
            &app,
            &admin,
            "/api/cities",
            json!({"name": "Denpasar", "province": province["id"]}),
        )
        .await;

        let response = with_token(app.server.post("/api/tourist-spots"), &editor)
            .json(&json!({
                "name": "Pantai Sanur",
                "address": "Sanur",
                "city": city["id"],
                "distance_from_city": "7.5"
            }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(response.json::<Value>()["message"], MSG_ADMIN_ONLY);

        let response = with_token(
            app.server.put(&format!("/api/cities/{}", city["id"])),
            &editor,
        )
        .json(&json!({"is_capital": true}))
        .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["is_capital"], true);
    }

    #[tokio::test]
    async fn test_tourist_spot_audit_and_cascade() {
        let app = TestApp::new().await;
        let admin = app.login("admin").await;
        let editor = app.login("editor").await;

        let province = create(&app, &admin, "/api/provinces", json!({"name": "Bali"})).await;
        let city = create(
            &app,
            &admin,
            "/api/cities",
            json!({"name": "Denpasar", "province": province["id"]}),
        )
        .await;
        let kind = create(&app, &admin, "/api/tourism-types", json!({"name": "Beach"})).await;

        let spot = create(
            &app,
            &admin,
            "/api/tourist-spots",
            json!({
                "name": "Pantai Sanur",
                "address": "Sanur",
                "city": city["id"],
                "tourism_type": kind["id"],
                "distance_from_city": "12.5",
                "created_by": 99
            }),
        )
        .await;
        assert_eq!(spot["distance_from_city"], "12.50");
        assert_eq!(spot["status"], "Active");
        assert_eq!(spot["created_by"], 1);
        assert_eq!(spot["updated_by"], Value::Null);

        let item = format!("/api/tourist-spots/{}", spot["id"]);
        let response = with_token(app.server.put(&item), &editor)
            .json(&json!({"status": "Inactive"}))
            .await;
        response.assert_status_ok();
        let updated = response.json::<Value>()["data"].clone();
        assert_eq!(updated["status"], "Inactive");
        assert_eq!(updated["created_by"], 1);
        assert_eq!(updated["updated_by"], 2);
        assert_eq!(updated["created_on"], spot["created_on"]);

        // Deleting the tourism type keeps the spot
        with_token(
            app.server.delete(&format!("/api/tourism-types/{}", kind["id"])),
            &admin,
        )
        .await
        .assert_status_ok();
        let response = with_token(app.server.get(&item), &admin).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["tourism_type"], Value::Null);

        // Deleting the province removes its cities and their spots
        with_token(
            app.server.delete(&format!("/api/provinces/{}", province["id"])),
            &admin,
        )
        .await
        .assert_status_ok();
        with_token(app.server.get(&item), &admin)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        let response = app.server.get("/cities/filter").await;
        assert_eq!(response.json::<Value>(), json!([]));
    }

    #[tokio::test]
    async fn test_unknown_foreign_key_is_a_validation_error() {
        let app = TestApp::new().await;
        let admin = app.login("admin").await;

        let response = with_token(app.server.post("/api/cities"), &admin)
            .json(&json!({"name": "Nowhere", "province": 999}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["message"], "Invalid input.");
        assert_eq!(
            body["data"]["province"][0],
            "Invalid pk \"999\" - object does not exist."
        );
    }

    #[tokio::test]
    async fn test_missing_required_fields() {
        let app = TestApp::new().await;
        let admin = app.login("admin").await;

        let response = with_token(app.server.post("/api/tourist-spots"), &admin)
            .json(&json!({"name": "  "}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let data = response.json::<Value>()["data"].clone();
        assert_eq!(data["name"][0], "This field may not be blank.");
        assert_eq!(data["address"][0], "This field is required.");
        assert_eq!(data["city"][0], "This field is required.");
        assert_eq!(data["distance_from_city"][0], "This field is required.");
    }

    #[tokio::test]
    async fn test_duplicate_province_name() {
        let app = TestApp::new().await;
        let admin = app.login("admin").await;
        create(&app, &admin, "/api/provinces", json!({"name": "Aceh"})).await;

        let response = with_token(app.server.post("/api/provinces"), &admin)
            .json(&json!({"name": "Aceh"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["data"]["name"][0],
            "province with this name already exists."
        );
    }

    #[tokio::test]
    async fn test_filter_is_open_and_ignores_unknown_keys() {
        let app = TestApp::new().await;
        let admin = app.login("admin").await;

        let west = create(&app, &admin, "/api/provinces", json!({"name": "Jawa Barat"})).await;
        let east = create(&app, &admin, "/api/provinces", json!({"name": "Jawa Timur"})).await;
        for (name, province) in [("Bogor", &west), ("Bandung", &west), ("Malang", &east)] {
            create(
                &app,
                &admin,
                "/api/cities",
                json!({"name": name, "province": province["id"]}),
            )
            .await;
        }

        let response = app
            .server
            .get(&format!("/cities/filter?province={}&ordering=name", west["id"]))
            .await;
        response.assert_status_ok();
        let names: Vec<Value> = response
            .json::<Vec<Value>>()
            .into_iter()
            .map(|city| city["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("Bandung"), json!("Bogor")]);

        let response = app.server.get("/cities/filter?bogus=x").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Vec<Value>>().len(), 3);

        let response = app.server.get("/cities/filter?province=abc").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_returns_same_token() {
        let app = TestApp::new().await;
        let first = app.login("editor").await;
        let second = app.login("editor").await;
        assert_eq!(first, second);

        let response = app
            .server
            .post("/login")
            .json(&json!({"username": "editor", "password": "wrong-password"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], MSG_INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_register_with_mismatched_passwords_persists_nothing() {
        let app = TestApp::new().await;

        let response = app
            .server
            .post("/register")
            .json(&json!({
                "username": "budi",
                "email": "budi@example.com",
                "first_name": "Budi",
                "last_name": "Santoso",
                "password1": TEST_PASSWORD,
                "password2": "something-else"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["data"]["password2"][0],
            MSG_PASSWORD_MISMATCH
        );

        let response = app
            .server
            .post("/login")
            .json(&json!({"username": "budi", "password": TEST_PASSWORD}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], MSG_INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let app = TestApp::new().await;

        let response = app
            .server
            .post("/register")
            .json(&json!({
                "username": "budi",
                "email": "budi@example.com",
                "first_name": "Budi",
                "last_name": "Santoso",
                "password1": TEST_PASSWORD,
                "password2": TEST_PASSWORD
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["message"], "User registered successfully");
        assert_eq!(body["data"]["is_admin"], false);

        let token = app.login("budi").await;
        assert_eq!(token.len(), 40);
    }
}
