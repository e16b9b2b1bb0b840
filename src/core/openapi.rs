use utoipa::openapi::path::{HttpMethod, OperationBuilder};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::ResponseBuilder;
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::auth::dtos as auth_dtos;
use crate::features::catalog::resource::Resource;
use crate::features::regions::{
    dtos as regions_dtos, models as regions_models, CityResource, ProvinceResource,
};
use crate::features::tourism_types::{
    dtos as tourism_types_dtos, models as tourism_types_models, TourismTypeResource,
};
use crate::features::tourist_spots::{
    dtos as tourist_spots_dtos, models as tourist_spots_models, TouristSpotResource,
};
use crate::shared::types::{ApiResponse, EmptyData};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::register,
        auth::handlers::login,
    ),
    components(
        schemas(
            ApiResponse<EmptyData>,
            EmptyData,
            // Auth
            auth_dtos::RegisterRequestDto,
            auth_dtos::RegisteredAccountDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::LoginResponseDto,
            // Regions
            regions_models::Province,
            regions_models::City,
            regions_dtos::ProvinceInputDto,
            regions_dtos::CityInputDto,
            // Tourism types
            tourism_types_models::TourismType,
            tourism_types_dtos::TourismTypeInputDto,
            // Tourist spots
            tourist_spots_models::TouristSpot,
            tourist_spots_models::SpotStatus,
            tourist_spots_dtos::TouristSpotInputDto,
        )
    ),
    tags(
        (name = "auth", description = "Account registration and token login"),
        (name = "tourist-spots", description = "Tourist spots (admin/editor, creation admin only)"),
        (name = "provinces", description = "Provinces (admin/editor, creation admin only)"),
        (name = "cities", description = "Cities (admin/editor, creation admin only)"),
        (name = "tourism-types", description = "Tourism types (admin only)"),
    ),
    modifiers(&SecurityAddon, &CatalogPaths),
    info(
        title = "Tourism Catalog API",
        version = "0.1.0",
        description = "API documentation for the tourism catalog",
    )
)]
pub struct ApiDoc;

/// Adds the opaque token security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("opaque")
                        .build(),
                ),
            );
        }
    }
}

/// Catalog handlers are generic over the resource, so their paths are registered here
/// instead of through `#[utoipa::path]`.
struct CatalogPaths;

impl CatalogPaths {
    fn add<R: Resource>(openapi: &mut utoipa::openapi::OpenApi) {
        let collection = format!("/api/{}", R::PATH);
        let item = format!("/api/{}/{{id}}", R::PATH);
        let filter = format!("/{}/filter", R::PATH);

        let operations = [
            (&collection, HttpMethod::Get, "list", format!("List {}", R::TABLE), "200"),
            (&collection, HttpMethod::Post, "create", format!("Create {}", R::LABEL), "201"),
            (&item, HttpMethod::Get, "get", format!("Get {} by id", R::LABEL), "200"),
            (&item, HttpMethod::Put, "update", format!("Update {}", R::LABEL), "200"),
            (&item, HttpMethod::Delete, "delete", format!("Delete {}", R::LABEL), "200"),
            (&filter, HttpMethod::Get, "filter", format!("Filter and sort {}", R::TABLE), "200"),
        ];

        for (path, method, action, summary, status) in operations {
            let operation = OperationBuilder::new()
                .tag(R::PATH)
                .operation_id(Some(format!("{}_{}", action, R::TABLE)))
                .summary(Some(summary))
                .response(status, ResponseBuilder::new().description("Success").build())
                .response(
                    "400",
                    ResponseBuilder::new()
                        .description("Validation error or unknown id")
                        .build(),
                )
                .build();
            openapi
                .paths
                .add_path_operation(path.as_str(), vec![method], operation);
        }
    }
}

impl Modify for CatalogPaths {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        Self::add::<TouristSpotResource>(openapi);
        Self::add::<ProvinceResource>(openapi);
        Self::add::<CityResource>(openapi);
        Self::add::<TourismTypeResource>(openapi);
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
