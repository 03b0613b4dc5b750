//! Registros comerciales asociados a un vehículo
//!
//! Leads, ventas y test drives son de sólo lectura para esta API: se cargan
//! con el seed y se exponen en el detalle del vehículo.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Type;
use uuid::Uuid;

use crate::models::user::UserRef;

/// Estado del lead - mapea al ENUM lead_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "lead_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    New,
    Contacted,
    TestDrive,
    Proposal,
    Closed,
    Lost,
}

/// Referencia corta a un lead
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub seller: Option<UserRef>,
}

impl LeadRecord {
    pub fn to_ref(&self) -> LeadRef {
        LeadRef {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub seller: UserRef,
    pub lead: Option<LeadRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestDriveRecord {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub date: DateTime<Utc>,
    pub lead: LeadRef,
    pub seller: UserRef,
}

/// Datos para registrar un lead (usado por el seed)
#[derive(Debug, Clone)]
pub struct NewLead {
    pub vehicle_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: LeadStatus,
    pub seller: Option<UserRef>,
}

#[derive(Debug, Clone)]
pub struct NewTestDrive {
    pub vehicle_id: Uuid,
    pub date: DateTime<Utc>,
    pub lead: LeadRef,
    pub seller: UserRef,
}

#[derive(Debug, Clone)]
pub struct NewSale {
    pub vehicle_id: Uuid,
    pub amount: Decimal,
    pub seller: UserRef,
    pub lead: Option<LeadRef>,
}

/// Registros comerciales de un conjunto de vehículos
#[derive(Debug, Clone, Default)]
pub struct VehicleActivity {
    pub leads: Vec<LeadRecord>,
    pub sales: Vec<SaleRecord>,
    pub test_drives: Vec<TestDriveRecord>,
}
