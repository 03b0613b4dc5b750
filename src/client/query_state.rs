//! Estado del listado en la URL
//!
//! `encode` produce el query string que refleja la consulta actual y
//! `decode` lo reconstruye. La URL es entrada del usuario, así que la
//! decodificación es tolerante: un valor ilegible vuelve a su default.

use rust_decimal::Decimal;

use crate::dto::vehicle_query::{SortBy, SortOrder, VehicleQuery, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT, MIN_YEAR};

/// Query string sin `?`; page y limit siempre presentes
pub fn encode(query: &VehicleQuery) -> String {
    let defaults = VehicleQuery::default();
    query
        .to_query_pairs()
        .into_iter()
        .filter(|(key, _)| match *key {
            "sortBy" => query.sort_by != defaults.sort_by,
            "sortOrder" => query.sort_order != defaults.sort_order,
            _ => true,
        })
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Reconstruye la consulta desde un query string, con o sin `?`
pub fn decode(raw: &str) -> VehicleQuery {
    let mut query = VehicleQuery::default();
    let raw = raw.trim_start_matches('?');

    for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = value.replace('+', " ");
        let Ok(value) = urlencoding::decode(&value) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        let filter = &mut query.filter;
        match key {
            "page" => {
                query.page = value.parse().ok().filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
            }
            "limit" => {
                query.limit = value
                    .parse()
                    .ok()
                    .filter(|l| (1..=MAX_LIMIT).contains(l))
                    .unwrap_or(DEFAULT_LIMIT);
            }
            "status" => filter.status = value.parse().ok(),
            "brand" => filter.brand = Some(value.to_string()),
            "model" => filter.model = Some(value.to_string()),
            "color" => filter.color = Some(value.to_string()),
            "yearFrom" => filter.year_from = value.parse().ok().filter(|y| *y >= MIN_YEAR),
            "yearTo" => filter.year_to = value.parse().ok().filter(|y| *y >= MIN_YEAR),
            "priceFrom" => filter.price_from = positive_price(value),
            "priceTo" => filter.price_to = positive_price(value),
            "sortBy" => query.sort_by = value.parse::<SortBy>().unwrap_or_default(),
            "sortOrder" => query.sort_order = value.parse::<SortOrder>().unwrap_or_default(),
            _ => {}
        }
    }
    query
}

fn positive_price(value: &str) -> Option<Decimal> {
    value.parse::<Decimal>().ok().filter(|price| *price > Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::VehicleStatus;
    use std::str::FromStr;

    #[test]
    fn test_encode_omits_absent_filters_and_default_sort() {
        assert_eq!(encode(&VehicleQuery::default()), "page=1&limit=10");

        let mut query = VehicleQuery::default();
        query.filter.brand = Some("Mercedes Benz".into());
        query.filter.status = Some(VehicleStatus::Reserved);
        query.sort_by = SortBy::Price;
        query.sort_order = SortOrder::Asc;
        assert_eq!(
            encode(&query),
            "page=1&limit=10&status=RESERVED&brand=Mercedes%20Benz&sortBy=price&sortOrder=asc"
        );
    }

    #[test]
    fn test_decode_restores_encoded_query() {
        let mut query = VehicleQuery {
            page: 3,
            limit: 25,
            sort_by: SortBy::Mileage,
            ..VehicleQuery::default()
        };
        query.filter.model = Some("C180 & co".into());
        query.filter.year_from = Some(2020);
        query.filter.price_to = Some(Decimal::from_str("150000.50").unwrap());

        assert_eq!(decode(&format!("?{}", encode(&query))), query);
    }

    #[test]
    fn test_decode_is_lenient() {
        let query = decode("page=0&limit=500&status=BROKEN&yearFrom=abc&sortBy=color&brand=&model=civic+si&foo=bar");
        assert_eq!(query.page, DEFAULT_PAGE);
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.filter.status, None);
        assert_eq!(query.filter.year_from, None);
        assert_eq!(query.filter.brand, None);
        assert_eq!(query.filter.model.as_deref(), Some("civic si"));
        assert_eq!(query.sort_by, SortBy::CreatedAt);
    }
}
