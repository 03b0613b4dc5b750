//! Estado del listado de vehículos del dashboard
//!
//! Coordina la consulta confirmada, los inputs de texto con debounce, la URL,
//! la caché por consulta y las requests en vuelo. No hace IO: cada acción
//! devuelve los efectos que el llamador debe ejecutar.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::client::debounce::Debouncer;
use crate::client::errors::ClientError;
use crate::client::query_state;
use crate::dto::envelope::PaginatedResponse;
use crate::dto::vehicle_query::{SortBy, SortOrder, VehicleFilter, VehicleQuery, DEFAULT_PAGE, MAX_LIMIT};
use crate::models::vehicle::{VehicleStatus, VehicleWithRelations};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const STALE_TIME: Duration = Duration::from_secs(30);

pub type VehiclePageResponse = PaginatedResponse<VehicleWithRelations>;

/// Inputs de texto con debounce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFilter {
    Brand,
    Model,
}

/// Acciones que el llamador debe ejecutar
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Pedir la página; la respuesta vuelve por `apply_response` con el mismo id
    Fetch { request_id: u64, query: VehicleQuery },
    /// Reemplazar el query string de la URL (sin `?`)
    ReplaceUrl(String),
    /// La sesión dejó de valer
    LoginRequired,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListStatus {
    Loading,
    Ready,
    LoginRequired,
    Failed(String),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    response: VehiclePageResponse,
    fetched_at: Instant,
}

pub struct VehicleListState {
    query: VehicleQuery,
    brand_input: String,
    model_input: String,
    brand_debounce: Debouncer<String>,
    model_debounce: Debouncer<String>,
    cache: HashMap<VehicleQuery, CacheEntry>,
    stale_time: Duration,
    latest_request: u64,
    pending: HashMap<u64, VehicleQuery>,
    status: ListStatus,
    current: Option<VehiclePageResponse>,
}

fn normalize(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

impl VehicleListState {
    /// Estado inicial a partir del query string de la URL; emite la primera carga
    pub fn new(url_query: &str, now: Instant) -> (Self, Vec<Effect>) {
        Self::with_timings(url_query, now, SEARCH_DEBOUNCE, STALE_TIME)
    }

    pub fn with_timings(
        url_query: &str,
        now: Instant,
        debounce: Duration,
        stale_time: Duration,
    ) -> (Self, Vec<Effect>) {
        let query = query_state::decode(url_query);
        let mut state = Self {
            brand_input: query.filter.brand.clone().unwrap_or_default(),
            model_input: query.filter.model.clone().unwrap_or_default(),
            query,
            brand_debounce: Debouncer::new(debounce),
            model_debounce: Debouncer::new(debounce),
            cache: HashMap::new(),
            stale_time,
            latest_request: 0,
            pending: HashMap::new(),
            status: ListStatus::Loading,
            current: None,
        };
        let effects = state.load(now, false);
        (state, effects)
    }

    pub fn query(&self) -> &VehicleQuery {
        &self.query
    }

    pub fn text_input(&self, field: TextFilter) -> &str {
        match field {
            TextFilter::Brand => &self.brand_input,
            TextFilter::Model => &self.model_input,
        }
    }

    pub fn status(&self) -> &ListStatus {
        &self.status
    }

    /// Última página mostrada (se conserva mientras carga la siguiente)
    pub fn current(&self) -> Option<&VehiclePageResponse> {
        self.current.as_ref()
    }

    pub fn latest_request_id(&self) -> u64 {
        self.latest_request
    }

    /// Próximo vencimiento de algún debounce
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.brand_debounce.deadline(), self.model_debounce.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// El texto se actualiza al instante; el filtro espera al debounce
    pub fn set_text_input(&mut self, field: TextFilter, text: &str, now: Instant) {
        match field {
            TextFilter::Brand => {
                self.brand_input = text.to_string();
                self.brand_debounce.schedule(text.to_string(), now);
            }
            TextFilter::Model => {
                self.model_input = text.to_string();
                self.model_debounce.schedule(text.to_string(), now);
            }
        }
    }

    /// Aplica los debounces vencidos
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        let mut filter = self.query.filter.clone();
        if let Some(brand) = self.brand_debounce.fire(now) {
            filter.brand = normalize(&brand);
        }
        if let Some(model) = self.model_debounce.fire(now) {
            filter.model = normalize(&model);
        }
        if filter == self.query.filter {
            return Vec::new();
        }
        self.apply_filter(filter, now)
    }

    pub fn set_status_filter(&mut self, status: Option<VehicleStatus>, now: Instant) -> Vec<Effect> {
        let filter = VehicleFilter {
            status,
            ..self.query.filter.clone()
        };
        if filter == self.query.filter {
            return Vec::new();
        }
        self.apply_filter(filter, now)
    }

    pub fn set_sort(&mut self, sort_by: SortBy, sort_order: SortOrder, now: Instant) -> Vec<Effect> {
        if self.query.sort_by == sort_by && self.query.sort_order == sort_order {
            return Vec::new();
        }
        self.query.sort_by = sort_by;
        self.query.sort_order = sort_order;
        self.query.page = DEFAULT_PAGE;
        self.load(now, false)
    }

    pub fn set_page_size(&mut self, limit: u32, now: Instant) -> Vec<Effect> {
        let limit = limit.clamp(1, MAX_LIMIT);
        if self.query.limit == limit {
            return Vec::new();
        }
        self.query.limit = limit;
        self.query.page = DEFAULT_PAGE;
        self.load(now, false)
    }

    pub fn set_page(&mut self, page: u32, now: Instant) -> Vec<Effect> {
        let page = page.max(1);
        if self.query.page == page {
            return Vec::new();
        }
        self.query.page = page;
        self.load(now, false)
    }

    /// Limpia filtros y caché y fuerza una carga nueva
    pub fn refresh(&mut self, now: Instant) -> Vec<Effect> {
        self.brand_debounce.cancel();
        self.model_debounce.cancel();
        self.brand_input.clear();
        self.model_input.clear();
        self.query.filter = VehicleFilter::default();
        self.query.page = DEFAULT_PAGE;
        // lo que estaba en vuelo ya no puede poblar la caché nueva
        self.pending.clear();
        self.cache.clear();
        self.load(now, true)
    }

    /// Incorpora la respuesta de un `Effect::Fetch`; las respuestas viejas se descartan
    pub fn apply_response(
        &mut self,
        request_id: u64,
        result: Result<VehiclePageResponse, ClientError>,
        now: Instant,
    ) -> Vec<Effect> {
        let Some(query) = self.pending.remove(&request_id) else {
            return Vec::new();
        };

        let effects = match result {
            Ok(response) => {
                self.cache.insert(
                    query,
                    CacheEntry {
                        response: response.clone(),
                        fetched_at: now,
                    },
                );
                if request_id == self.latest_request {
                    self.current = Some(response);
                    self.status = ListStatus::Ready;
                }
                Vec::new()
            }
            Err(e) if e.is_unauthorized() => {
                self.status = ListStatus::LoginRequired;
                vec![Effect::LoginRequired]
            }
            Err(e) => {
                if request_id == self.latest_request {
                    self.status = ListStatus::Failed(e.to_string());
                }
                Vec::new()
            }
        };

        if request_id < self.latest_request {
            debug!("⏭️ Respuesta {} descartada, la última es {}", request_id, self.latest_request);
        }
        effects
    }

    fn apply_filter(&mut self, filter: VehicleFilter, now: Instant) -> Vec<Effect> {
        self.query.filter = filter;
        self.query.page = DEFAULT_PAGE;
        self.load(now, false)
    }

    /// Refleja la consulta en la URL y la sirve desde caché o emite un fetch
    fn load(&mut self, now: Instant, force: bool) -> Vec<Effect> {
        let mut effects = vec![Effect::ReplaceUrl(query_state::encode(&self.query))];

        if !force {
            if let Some(entry) = self.cache.get(&self.query) {
                if now.saturating_duration_since(entry.fetched_at) < self.stale_time {
                    // una respuesta en vuelo para otra consulta ya no debe pisar esta
                    self.latest_request += 1;
                    self.current = Some(entry.response.clone());
                    self.status = ListStatus::Ready;
                    return effects;
                }
            }
        }

        self.latest_request += 1;
        let request_id = self.latest_request;
        self.pending.insert(request_id, self.query.clone());
        self.status = ListStatus::Loading;
        effects.push(Effect::Fetch {
            request_id,
            query: self.query.clone(),
        });
        effects
    }
}
