use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use autoconnect_api::client::{ApiClient, ClientError, Effect, Operation, Session, VehicleListState};
use autoconnect_api::config::{EnvironmentConfig, StorageBackend};
use autoconnect_api::database::seed_if_empty;
use autoconnect_api::dto::vehicle_dto::CreateVehicleRequest;
use autoconnect_api::models::user::{Role, User};
use autoconnect_api::routes::create_router;
use autoconnect_api::services::JwtService;
use autoconnect_api::state::AppState;

/// Levanta la API en memoria en un puerto libre y devuelve su URL base
async fn spawn_api() -> String {
    let config = EnvironmentConfig {
        environment: "test".to_string(),
        bcrypt_cost: 4,
        storage_backend: StorageBackend::Memory,
        ..EnvironmentConfig::default()
    };
    let state = AppState::in_memory(config);
    seed_if_empty(&*state.users, &*state.vehicles, 4)
        .await
        .unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

fn yaris() -> CreateVehicleRequest {
    CreateVehicleRequest {
        brand: "Toyota".into(),
        model: "Yaris".into(),
        year: 2024,
        color: Some("Branco".into()),
        mileage: Some(0),
        price: Decimal::from(95000),
        status: None,
    }
}

#[tokio::test]
async fn test_login_stores_claims() {
    let client = ApiClient::new(spawn_api().await).unwrap();
    let mut session = Session::new();

    let error = client
        .login(&mut session, "admin@autoconnect.com", "Wrong123!")
        .await
        .unwrap_err();
    assert!(matches!(
        &error,
        ClientError::Api { operation: Operation::Login, status: 401, .. }
    ));
    assert_eq!(error.to_string(), "Email ou senha incorretos");
    assert!(!session.is_authenticated());

    client
        .login(&mut session, "admin@autoconnect.com", "Admin123!")
        .await
        .unwrap();
    assert!(session.is_admin());

    let profile = client.profile(&mut session).await.unwrap();
    assert_eq!(profile.role, Role::Admin);
}

#[tokio::test]
async fn test_create_vehicle_with_photos_reports_each_failure() {
    let client = ApiClient::new(spawn_api().await).unwrap();
    let mut session = Session::new();
    client
        .login(&mut session, "admin@autoconnect.com", "Admin123!")
        .await
        .unwrap();

    let photos = vec![
        "https://example.com/photos/yaris-1.jpg".to_string(),
        "not a url".to_string(),
        "https://example.com/photos/yaris-2.jpg".to_string(),
    ];
    let creation = client
        .create_vehicle_with_photos(&mut session, &yaris(), &photos)
        .await
        .unwrap();

    assert_eq!(creation.vehicle.price.to_string(), "95000.00");
    let failed: Vec<&str> = creation.failed_photos().map(|p| p.url.as_str()).collect();
    assert_eq!(failed, vec!["not a url"]);

    let stored = client.list_photos(&mut session, creation.vehicle.id).await.unwrap();
    assert_eq!(stored.len(), 2);

    let removed = client.remove_photo(&mut session, stored[0].id).await.unwrap();
    assert_eq!(removed.url, "https://example.com/photos/yaris-1.jpg");

    let deleted = client.delete_vehicle(&mut session, creation.vehicle.id).await.unwrap();
    assert_eq!(deleted.id, creation.vehicle.id);
    let error = client
        .get_vehicle(&mut session, creation.vehicle.id)
        .await
        .unwrap_err();
    assert_eq!(error.to_string(), "Veículo não encontrado.");
}

#[tokio::test]
async fn test_seller_gets_localized_forbidden() {
    let client = ApiClient::new(spawn_api().await).unwrap();
    let mut session = Session::new();
    client
        .login(&mut session, "joao@autoconnect.com", "Joao123!")
        .await
        .unwrap();

    let error = client.create_vehicle(&mut session, &yaris()).await.unwrap_err();
    assert_eq!(error.status(), Some(403));
    assert_eq!(
        error.to_string(),
        "Acesso negado. Apenas administradores podem criar veículos."
    );
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_rejected_token_clears_session() {
    let client = ApiClient::new(spawn_api().await).unwrap();

    // firmado con otra clave: se decodifica en el cliente pero el servidor lo rechaza
    let forged = JwtService::new("another-secret", 3600)
        .generate_access_token(&User {
            id: Uuid::new_v4(),
            name: "Intruso".into(),
            email: "intruso@autoconnect.com".into(),
            phone: None,
            password_hash: String::new(),
            role: Role::Admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .unwrap();
    let mut session = Session::new();
    session.set_token(forged).unwrap();
    assert!(session.is_admin());

    let error = client.profile(&mut session).await.unwrap_err();
    assert!(error.is_unauthorized());
    assert!(session.token().is_none());
}

#[tokio::test]
async fn test_list_state_drives_real_fetches() {
    let client = ApiClient::new(spawn_api().await).unwrap();
    let mut session = Session::new();
    client
        .login(&mut session, "admin@autoconnect.com", "Admin123!")
        .await
        .unwrap();

    let now = tokio::time::Instant::now();
    let (mut state, effects) = VehicleListState::new("?model=civic&sortBy=price&sortOrder=asc", now);
    for effect in effects {
        if let Effect::Fetch { request_id, query } = effect {
            let result = client.list_vehicles(&mut session, &query).await;
            state.apply_response(request_id, result, now);
        }
    }

    let page = state.current().unwrap();
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.data[0].vehicle.brand, "Honda");
    assert_eq!(page.data[0].vehicle.price.to_string(), "110000.00");
}
