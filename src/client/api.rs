//! Cliente HTTP tipado de la API
//!
//! Cada llamada recibe la `Session` explícitamente. Un 401 limpia la sesión
//! y los errores se traducen a mensajes para el usuario según la operación.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

use crate::client::errors::{ClientError, Operation};
use crate::client::session::Session;
use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest};
use crate::dto::envelope::{ApiResponse, PaginatedResponse};
use crate::dto::vehicle_dto::{AddPhotoRequest, CreateVehicleRequest, UpdateVehicleRequest};
use crate::dto::vehicle_query::VehicleQuery;
use crate::models::user::PublicUser;
use crate::models::vehicle::{Vehicle, VehiclePhoto, VehicleWithRelations};

/// Resultado de crear un vehículo con fotos; cada foto falla por separado
#[derive(Debug)]
pub struct VehicleCreation {
    pub vehicle: Vehicle,
    pub photos: Vec<PhotoUpload>,
}

#[derive(Debug)]
pub struct PhotoUpload {
    pub url: String,
    pub result: Result<VehiclePhoto, ClientError>,
}

impl VehicleCreation {
    pub fn failed_photos(&self) -> impl Iterator<Item = &PhotoUpload> {
        self.photos.iter().filter(|photo| photo.result.is_err())
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Envía la request con el bearer de la sesión y decodifica el body
    async fn send<T: DeserializeOwned>(
        &self,
        session: &mut Session,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let request = match session.bearer() {
            Some(bearer) => request.header(reqwest::header::AUTHORIZATION, bearer),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        debug!("🌐 {:?} -> {}", operation, status);

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ClientError::Decode(e.to_string()));
        }

        if status == StatusCode::UNAUTHORIZED {
            warn!("🔒 Sesión rechazada por el servidor, se limpia el token");
            session.clear();
        }
        Err(ClientError::from_status(operation, status.as_u16()))
    }

    pub async fn login(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        request.validate()?;

        let response: LoginResponse = self
            .send(
                session,
                Operation::Login,
                self.client.post(self.url("/auth/login")).json(&request),
            )
            .await?;
        session.set_token(response.access_token)
    }

    pub async fn register(
        &self,
        session: &mut Session,
        request: &RegisterRequest,
    ) -> Result<PublicUser, ClientError> {
        request.validate()?;
        self.send(
            session,
            Operation::Register,
            self.client.post(self.url("/auth/register")).json(request),
        )
        .await
    }

    pub async fn profile(&self, session: &mut Session) -> Result<PublicUser, ClientError> {
        self.send(session, Operation::Profile, self.client.get(self.url("/auth/profile")))
            .await
    }

    pub async fn list_vehicles(
        &self,
        session: &mut Session,
        query: &VehicleQuery,
    ) -> Result<PaginatedResponse<VehicleWithRelations>, ClientError> {
        let request = self
            .client
            .get(self.url("/vehicles"))
            .query(&query.to_query_pairs());
        self.send(session, Operation::ListVehicles, request).await
    }

    pub async fn get_vehicle(
        &self,
        session: &mut Session,
        id: Uuid,
    ) -> Result<VehicleWithRelations, ClientError> {
        let response: ApiResponse<VehicleWithRelations> = self
            .send(
                session,
                Operation::GetVehicle,
                self.client.get(self.url(&format!("/vehicles/{}", id))),
            )
            .await?;
        Ok(response.data)
    }

    pub async fn create_vehicle(
        &self,
        session: &mut Session,
        request: &CreateVehicleRequest,
    ) -> Result<Vehicle, ClientError> {
        request.validate()?;
        let response: ApiResponse<Vehicle> = self
            .send(
                session,
                Operation::CreateVehicle,
                self.client.post(self.url("/vehicles")).json(request),
            )
            .await?;
        Ok(response.data)
    }

    /// Crea el vehículo y luego sube cada foto; una foto fallida no deshace el vehículo
    pub async fn create_vehicle_with_photos(
        &self,
        session: &mut Session,
        request: &CreateVehicleRequest,
        photo_urls: &[String],
    ) -> Result<VehicleCreation, ClientError> {
        let vehicle = self.create_vehicle(session, request).await?;

        let mut photos = Vec::with_capacity(photo_urls.len());
        for url in photo_urls {
            let result = self.add_photo(session, vehicle.id, url).await;
            if let Err(e) = &result {
                warn!("📷 No se pudo agregar la foto {}: {}", url, e);
            }
            photos.push(PhotoUpload {
                url: url.clone(),
                result,
            });
        }

        Ok(VehicleCreation { vehicle, photos })
    }

    pub async fn update_vehicle(
        &self,
        session: &mut Session,
        id: Uuid,
        request: &UpdateVehicleRequest,
    ) -> Result<Vehicle, ClientError> {
        request.validate()?;
        let response: ApiResponse<Vehicle> = self
            .send(
                session,
                Operation::UpdateVehicle,
                self.client
                    .patch(self.url(&format!("/vehicles/{}", id)))
                    .json(request),
            )
            .await?;
        Ok(response.data)
    }

    pub async fn delete_vehicle(&self, session: &mut Session, id: Uuid) -> Result<Vehicle, ClientError> {
        let response: ApiResponse<Vehicle> = self
            .send(
                session,
                Operation::DeleteVehicle,
                self.client.delete(self.url(&format!("/vehicles/{}", id))),
            )
            .await?;
        Ok(response.data)
    }

    pub async fn add_photo(
        &self,
        session: &mut Session,
        vehicle_id: Uuid,
        url: &str,
    ) -> Result<VehiclePhoto, ClientError> {
        let request = AddPhotoRequest {
            url: url.to_string(),
        };
        request.validate()?;
        let response: ApiResponse<VehiclePhoto> = self
            .send(
                session,
                Operation::AddPhoto,
                self.client
                    .post(self.url(&format!("/vehicles/{}/photos", vehicle_id)))
                    .json(&request),
            )
            .await?;
        Ok(response.data)
    }

    pub async fn list_photos(
        &self,
        session: &mut Session,
        vehicle_id: Uuid,
    ) -> Result<Vec<VehiclePhoto>, ClientError> {
        let response: ApiResponse<Vec<VehiclePhoto>> = self
            .send(
                session,
                Operation::ListPhotos,
                self.client
                    .get(self.url(&format!("/vehicles/{}/photos", vehicle_id))),
            )
            .await?;
        Ok(response.data)
    }

    pub async fn remove_photo(
        &self,
        session: &mut Session,
        photo_id: Uuid,
    ) -> Result<VehiclePhoto, ClientError> {
        let response: ApiResponse<VehiclePhoto> = self
            .send(
                session,
                Operation::RemovePhoto,
                self.client
                    .delete(self.url(&format!("/vehicles/photos/{}", photo_id))),
            )
            .await?;
        Ok(response.data)
    }
}
