use axum::{
    extract::{Path, Query, State},
    handler::Handler,
    http::StatusCode,
    middleware,
    routing::{delete, get},
    Json, Router,
};
use tower::ServiceBuilder;

use crate::dto::envelope::{ApiResponse, PaginatedResponse};
use crate::dto::vehicle_dto::{AddPhotoRequest, CreateVehicleRequest, UpdateVehicleRequest};
use crate::dto::vehicle_query::{VehicleQuery, VehicleQueryParams};
use crate::middleware::auth::{admin_only_middleware, auth_middleware};
use crate::models::vehicle::{Vehicle, VehiclePhoto, VehicleWithRelations};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::{parse_uuid, ValidatedJson};

/// Lecturas públicas; mutaciones sólo para ADMIN
pub fn create_vehicle_router(state: &AppState) -> Router<AppState> {
    let admin = ServiceBuilder::new()
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(middleware::from_fn(admin_only_middleware));

    Router::new()
        .route(
            "/",
            get(list_vehicles).post(create_vehicle.layer(admin.clone())),
        )
        .route("/photos/:photo_id", delete(remove_photo.layer(admin.clone())))
        .route(
            "/:id",
            get(get_vehicle)
                .patch(update_vehicle.layer(admin.clone()))
                .delete(delete_vehicle.layer(admin.clone())),
        )
        .route(
            "/:id/photos",
            get(list_photos).post(add_photo.layer(admin)),
        )
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(params): Query<VehicleQueryParams>,
) -> Result<Json<PaginatedResponse<VehicleWithRelations>>, AppError> {
    let query = VehicleQuery::try_from(params)?;
    let page = state.vehicle_service.list(&query).await?;
    Ok(Json(PaginatedResponse {
        data: page.vehicles,
        pagination: page.pagination,
        message: "Vehicles retrieved successfully".to_string(),
    }))
}

async fn create_vehicle(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vehicle>>), AppError> {
    let vehicle = state.vehicle_service.create(request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(vehicle, "Vehicle created successfully")),
    ))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<VehicleWithRelations>>, AppError> {
    let id = parse_uuid("id", &id)?;
    let vehicle = state.vehicle_service.get(id).await?;
    Ok(Json(ApiResponse::success_with_message(vehicle, "Vehicle retrieved successfully")))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let id = parse_uuid("id", &id)?;
    let vehicle = state.vehicle_service.update(id, request.into()).await?;
    Ok(Json(ApiResponse::success_with_message(vehicle, "Vehicle updated successfully")))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let id = parse_uuid("id", &id)?;
    let vehicle = state.vehicle_service.delete(id).await?;
    Ok(Json(ApiResponse::success_with_message(vehicle, "Vehicle removed successfully")))
}

async fn add_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<AddPhotoRequest>,
) -> Result<(StatusCode, Json<ApiResponse<VehiclePhoto>>), AppError> {
    let id = parse_uuid("id", &id)?;
    let photo = state.vehicle_service.add_photo(id, request.url).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(photo, "Photo added successfully")),
    ))
}

async fn list_photos(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<VehiclePhoto>>>, AppError> {
    let id = parse_uuid("id", &id)?;
    let photos = state.vehicle_service.list_photos(id).await?;
    Ok(Json(ApiResponse::success_with_message(photos, "Photos retrieved successfully")))
}

async fn remove_photo(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> Result<Json<ApiResponse<VehiclePhoto>>, AppError> {
    let photo_id = parse_uuid("photoId", &photo_id)?;
    let photo = state.vehicle_service.remove_photo(photo_id).await?;
    Ok(Json(ApiResponse::success_with_message(photo, "Photo removed successfully")))
}
