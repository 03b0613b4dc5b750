//! Consulta de listado de vehículos
//!
//! Los parámetros llegan como strings crudos del query string y se validan
//! aquí para producir un `VehicleQuery` tipado. Cualquier valor mal formado o
//! fuera de rango se reporta como error de validación por campo.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::ValidationErrors;

use crate::models::vehicle::VehicleStatus;
use crate::utils::errors::{field_error, AppError};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;
pub const MIN_YEAR: i32 = 1900;

/// Columna de ordenación permitida
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortBy {
    Brand,
    Model,
    Year,
    Price,
    Mileage,
    #[default]
    CreatedAt,
}

impl SortBy {
    pub const ALL: [SortBy; 6] = [
        SortBy::Brand,
        SortBy::Model,
        SortBy::Year,
        SortBy::Price,
        SortBy::Mileage,
        SortBy::CreatedAt,
    ];

    /// Nombre del parámetro en la API
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Brand => "brand",
            SortBy::Model => "model",
            SortBy::Year => "year",
            SortBy::Price => "price",
            SortBy::Mileage => "mileage",
            SortBy::CreatedAt => "createdAt",
        }
    }

    /// Expresión SQL de ordenamiento, los textos sin distinguir mayúsculas
    pub fn column(&self) -> &'static str {
        match self {
            SortBy::Brand => "LOWER(brand)",
            SortBy::Model => "LOWER(model)",
            SortBy::Year => "year",
            SortBy::Price => "price",
            SortBy::Mileage => "mileage",
            SortBy::CreatedAt => "created_at",
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortBy::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "sortBy must be one of brand, model, year, price, mileage, createdAt (got '{}')",
                    s
                )
            })
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("sortOrder must be asc or desc (got '{}')", s)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predicado de filtrado; los campos ausentes no restringen
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VehicleFilter {
    pub status: Option<VehicleStatus>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub price_from: Option<Decimal>,
    pub price_to: Option<Decimal>,
}

impl VehicleFilter {
    pub fn is_empty(&self) -> bool {
        *self == VehicleFilter::default()
    }
}

/// Consulta validada del listado
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VehicleQuery {
    pub page: u32,
    pub limit: u32,
    pub filter: VehicleFilter,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl Default for VehicleQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            filter: VehicleFilter::default(),
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl VehicleQuery {
    /// Filas a saltar antes de la página pedida
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Parámetros del query string, omitiendo filtros ausentes
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        let filter = &self.filter;
        if let Some(status) = filter.status {
            pairs.push(("status", status.to_string()));
        }
        for (key, value) in [
            ("brand", &filter.brand),
            ("model", &filter.model),
            ("color", &filter.color),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((key, value.to_string()));
            }
        }
        if let Some(year) = filter.year_from {
            pairs.push(("yearFrom", year.to_string()));
        }
        if let Some(year) = filter.year_to {
            pairs.push(("yearTo", year.to_string()));
        }
        if let Some(price) = filter.price_from {
            pairs.push(("priceFrom", price.to_string()));
        }
        if let Some(price) = filter.price_to {
            pairs.push(("priceTo", price.to_string()));
        }
        pairs.push(("sortBy", self.sort_by.to_string()));
        pairs.push(("sortOrder", self.sort_order.to_string()));
        pairs
    }
}

/// Parámetros crudos tal como llegan en la URL
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleQueryParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub year_from: Option<String>,
    pub year_to: Option<String>,
    pub price_from: Option<String>,
    pub price_to: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Valor presente y no vacío
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Acumula errores por campo mientras se parsean los parámetros
struct QueryParser {
    errors: ValidationErrors,
}

impl QueryParser {
    fn parse<T>(&mut self, field: &'static str, raw: &Option<String>, check: impl Fn(&T) -> Result<(), String>) -> Option<T>
    where
        T: FromStr,
    {
        let value = present(raw)?;
        let parsed = match value.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                self.errors
                    .add(field, field_error("invalid", format!("{} has an invalid value '{}'", field, value)));
                return None;
            }
        };
        match check(&parsed) {
            Ok(()) => Some(parsed),
            Err(message) => {
                self.errors.add(field, field_error("range", message));
                None
            }
        }
    }

    fn parse_enum<T>(&mut self, field: &'static str, raw: &Option<String>) -> Option<T>
    where
        T: FromStr<Err = String>,
    {
        let value = present(raw)?;
        match value.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(message) => {
                self.errors.add(field, field_error("invalid", message));
                None
            }
        }
    }
}

fn text(value: &Option<String>) -> Option<String> {
    present(value).map(str::to_string)
}

impl TryFrom<VehicleQueryParams> for VehicleQuery {
    type Error = AppError;

    fn try_from(params: VehicleQueryParams) -> Result<Self, Self::Error> {
        let mut parser = QueryParser {
            errors: ValidationErrors::new(),
        };

        let page = parser.parse::<u32>("page", &params.page, |page| {
            if *page >= 1 {
                Ok(())
            } else {
                Err("page must be 1 or greater".to_string())
            }
        });
        let limit = parser.parse::<u32>("limit", &params.limit, |limit| {
            if (1..=MAX_LIMIT).contains(limit) {
                Ok(())
            } else {
                Err(format!("limit must be between 1 and {}", MAX_LIMIT))
            }
        });
        let year_check = |year: &i32| {
            if *year >= MIN_YEAR {
                Ok(())
            } else {
                Err(format!("year must be {} or later", MIN_YEAR))
            }
        };
        let price_check = |price: &Decimal| {
            if *price > Decimal::ZERO {
                Ok(())
            } else {
                Err("price must be a positive number".to_string())
            }
        };
        let year_from = parser.parse::<i32>("yearFrom", &params.year_from, year_check);
        let year_to = parser.parse::<i32>("yearTo", &params.year_to, year_check);
        let price_from = parser.parse::<Decimal>("priceFrom", &params.price_from, price_check);
        let price_to = parser.parse::<Decimal>("priceTo", &params.price_to, price_check);
        let status = parser.parse_enum::<VehicleStatus>("status", &params.status);
        let sort_by = parser.parse_enum::<SortBy>("sortBy", &params.sort_by);
        let sort_order = parser.parse_enum::<SortOrder>("sortOrder", &params.sort_order);

        if !parser.errors.is_empty() {
            return Err(AppError::Validation(parser.errors));
        }

        Ok(Self {
            page: page.unwrap_or(DEFAULT_PAGE),
            limit: limit.unwrap_or(DEFAULT_LIMIT),
            filter: VehicleFilter {
                status,
                brand: text(&params.brand),
                model: text(&params.model),
                color: text(&params.color),
                year_from,
                year_to,
                price_from,
                price_to,
            },
            sort_by: sort_by.unwrap_or_default(),
            sort_order: sort_order.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> VehicleQueryParams {
        let mut params = VehicleQueryParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "page" => params.page = value,
                "limit" => params.limit = value,
                "status" => params.status = value,
                "brand" => params.brand = value,
                "model" => params.model = value,
                "color" => params.color = value,
                "yearFrom" => params.year_from = value,
                "yearTo" => params.year_to = value,
                "priceFrom" => params.price_from = value,
                "priceTo" => params.price_to = value,
                "sortBy" => params.sort_by = value,
                "sortOrder" => params.sort_order = value,
                other => panic!("unknown key {}", other),
            }
        }
        params
    }

    fn error_fields(result: Result<VehicleQuery, AppError>) -> Vec<&'static str> {
        match result {
            Err(AppError::Validation(errors)) => {
                let mut fields: Vec<_> = errors.field_errors().keys().copied().collect();
                fields.sort();
                fields
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_when_empty() {
        let query = VehicleQuery::try_from(VehicleQueryParams::default()).unwrap();
        assert_eq!(query, VehicleQuery::default());
        assert_eq!(query.sort_by, SortBy::CreatedAt);
        assert_eq!(query.sort_order, SortOrder::Desc);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_parses_full_query() {
        let query = VehicleQuery::try_from(params(&[
            ("page", "3"),
            ("limit", "5"),
            ("status", "available"),
            ("brand", " Toyota "),
            ("yearFrom", "2022"),
            ("priceTo", "100000.50"),
            ("sortBy", "price"),
            ("sortOrder", "asc"),
        ]))
        .unwrap();

        assert_eq!(query.page, 3);
        assert_eq!(query.offset(), 10);
        assert_eq!(query.filter.status, Some(VehicleStatus::Available));
        assert_eq!(query.filter.brand.as_deref(), Some("Toyota"));
        assert_eq!(query.filter.year_from, Some(2022));
        assert_eq!(query.filter.price_to, Some(Decimal::from_str("100000.50").unwrap()));
        assert_eq!(query.sort_by, SortBy::Price);
        assert_eq!(query.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_empty_values_are_absent() {
        let query = VehicleQuery::try_from(params(&[("brand", ""), ("status", ""), ("page", "")])).unwrap();
        assert!(query.filter.is_empty());
        assert_eq!(query.page, DEFAULT_PAGE);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert_eq!(error_fields(VehicleQuery::try_from(params(&[("page", "0")]))), vec!["page"]);
        assert_eq!(error_fields(VehicleQuery::try_from(params(&[("limit", "101")]))), vec!["limit"]);
        assert_eq!(error_fields(VehicleQuery::try_from(params(&[("limit", "0")]))), vec!["limit"]);
        assert_eq!(
            error_fields(VehicleQuery::try_from(params(&[("yearFrom", "1800"), ("priceFrom", "0")]))),
            vec!["priceFrom", "yearFrom"]
        );
    }

    #[test]
    fn test_rejects_malformed_values() {
        assert_eq!(
            error_fields(VehicleQuery::try_from(params(&[
                ("page", "abc"),
                ("sortBy", "color"),
                ("sortOrder", "up"),
                ("status", "BROKEN"),
            ]))),
            vec!["page", "sortBy", "sortOrder", "status"]
        );
    }

    #[test]
    fn test_limit_ceiling_is_accepted() {
        let query = VehicleQuery::try_from(params(&[("limit", "100")])).unwrap();
        assert_eq!(query.limit, MAX_LIMIT);
    }

    #[test]
    fn test_query_pairs_skip_absent_filters() {
        let mut query = VehicleQuery::default();
        query.filter.model = Some("civic".into());
        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("model", "civic".to_string())));
        assert!(pairs.iter().all(|(key, _)| *key != "brand"));
        assert!(pairs.contains(&("sortBy", "createdAt".to_string())));
    }
}
