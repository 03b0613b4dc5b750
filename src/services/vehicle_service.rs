//! Servicio de vehículos
//!
//! Listado paginado con filtros, detalle con relaciones y mutaciones con
//! verificación de existencia.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dto::envelope::Pagination;
use crate::dto::vehicle_query::VehicleQuery;
use crate::models::vehicle::{NewVehicle, Vehicle, VehicleChanges, VehiclePhoto, VehicleWithRelations};
use crate::repositories::vehicle_repository::VehicleStore;
use crate::utils::errors::{not_found_error, AppResult};

/// Página de vehículos con su metadato de paginación
#[derive(Debug, Clone)]
pub struct VehiclePage {
    pub vehicles: Vec<VehicleWithRelations>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct VehicleService {
    store: Arc<dyn VehicleStore>,
}

impl VehicleService {
    pub fn new(store: Arc<dyn VehicleStore>) -> Self {
        Self { store }
    }

    /// Listado: total y página se consultan en paralelo
    pub async fn list(&self, query: &VehicleQuery) -> AppResult<VehiclePage> {
        let (total, vehicles) =
            futures::try_join!(self.store.count(&query.filter), self.store.find_page(query))?;

        debug!(
            "🚗 Listado de vehículos: page={} limit={} total={} filas={}",
            query.page,
            query.limit,
            total,
            vehicles.len()
        );

        Ok(VehiclePage {
            vehicles: self.with_relations(vehicles).await?,
            pagination: Pagination::new(query.page, query.limit, total),
        })
    }

    /// Adjunta fotos y registros comerciales a cada vehículo
    async fn with_relations(&self, vehicles: Vec<Vehicle>) -> AppResult<Vec<VehicleWithRelations>> {
        if vehicles.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = vehicles.iter().map(|v| v.id).collect();
        let (photos, activity) =
            futures::try_join!(self.store.photos_for(&ids), self.store.activity_for(&ids))?;

        let mut by_vehicle: HashMap<Uuid, VehicleWithRelations> = HashMap::with_capacity(ids.len());
        for vehicle in &vehicles {
            by_vehicle.insert(
                vehicle.id,
                VehicleWithRelations {
                    vehicle: vehicle.clone(),
                    photos: Vec::new(),
                    leads: Vec::new(),
                    sales: Vec::new(),
                    test_drive: Vec::new(),
                },
            );
        }
        for photo in photos {
            if let Some(entry) = by_vehicle.get_mut(&photo.vehicle_id) {
                entry.photos.push(photo);
            }
        }
        for lead in activity.leads {
            if let Some(entry) = lead.vehicle_id.and_then(|id| by_vehicle.get_mut(&id)) {
                entry.leads.push(lead);
            }
        }
        for sale in activity.sales {
            if let Some(entry) = by_vehicle.get_mut(&sale.vehicle_id) {
                entry.sales.push(sale);
            }
        }
        for test_drive in activity.test_drives {
            if let Some(entry) = by_vehicle.get_mut(&test_drive.vehicle_id) {
                entry.test_drive.push(test_drive);
            }
        }

        Ok(ids
            .iter()
            .filter_map(|id| by_vehicle.remove(id))
            .collect())
    }

    async fn require_vehicle(&self, id: Uuid) -> AppResult<Vehicle> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))
    }

    /// Detalle con fotos, leads, ventas y test drives
    pub async fn get(&self, id: Uuid) -> AppResult<VehicleWithRelations> {
        let vehicle = self.require_vehicle(id).await?;
        self.with_relations(vec![vehicle])
            .await?
            .pop()
            .ok_or_else(|| not_found_error("Vehicle"))
    }

    pub async fn create(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        let created = self.store.insert(vehicle).await?;
        info!("🚗 Vehículo creado: {} {} {} ({})", created.brand, created.model, created.year, created.id);
        Ok(created)
    }

    /// Actualización parcial; sólo los campos presentes cambian
    pub async fn update(&self, id: Uuid, changes: VehicleChanges) -> AppResult<Vehicle> {
        let updated = self
            .store
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))?;
        info!("✏️ Vehículo actualizado: {}", updated.id);
        Ok(updated)
    }

    /// Borra y devuelve el último estado conocido del vehículo
    pub async fn delete(&self, id: Uuid) -> AppResult<Vehicle> {
        let removed = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))?;
        info!("🗑️ Vehículo eliminado: {}", removed.id);
        Ok(removed)
    }

    pub async fn add_photo(&self, vehicle_id: Uuid, url: String) -> AppResult<VehiclePhoto> {
        self.require_vehicle(vehicle_id).await?;
        let photo = self.store.add_photo(vehicle_id, url).await?;
        info!("📷 Foto agregada al vehículo {}", vehicle_id);
        Ok(photo)
    }

    pub async fn list_photos(&self, vehicle_id: Uuid) -> AppResult<Vec<VehiclePhoto>> {
        self.require_vehicle(vehicle_id).await?;
        self.store.photos_for(&[vehicle_id]).await
    }

    pub async fn remove_photo(&self, photo_id: Uuid) -> AppResult<VehiclePhoto> {
        let photo = self
            .store
            .delete_photo(photo_id)
            .await?
            .ok_or_else(|| not_found_error("Photo"))?;
        info!("🗑️ Foto eliminada: {}", photo.id);
        Ok(photo)
    }
}
