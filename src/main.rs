use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use autoconnect_api::config::{DatabaseConfig, EnvironmentConfig, StorageBackend};
use autoconnect_api::database::{self, seed_if_empty};
use autoconnect_api::routes::create_router;
use autoconnect_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging (RUST_LOG tiene prioridad)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚗 AutoConnect API - Concesionario");
    info!("==================================");

    let config = EnvironmentConfig::from_env().context("invalid configuration")?;
    let seed_database = config.seed_database;
    let bcrypt_cost = config.bcrypt_cost;

    let state = match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = match database::connect(&db_config).await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(e);
                }
            };
            AppState::with_pool(config.clone(), pool)
        }
        StorageBackend::Memory => {
            warn!("🧪 Usando almacén en memoria, los datos se pierden al reiniciar");
            AppState::in_memory(config.clone())
        }
    };

    if seed_database || config.storage_backend == StorageBackend::Memory {
        seed_if_empty(&*state.users, &*state.vehicles, bcrypt_cost)
            .await
            .context("seed failed")?;
    }

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid HOST/PORT")?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🔐 Autenticación:");
    info!("   POST /auth/register - Registrar usuario");
    info!("   POST /auth/login - Login");
    info!("   GET  /auth/profile - Perfil del usuario actual");
    info!("🚗 Vehículos:");
    info!("   GET  /vehicles - Listar vehículos (paginado, filtros y orden)");
    info!("   GET  /vehicles/:id - Obtener vehículo");
    info!("   POST /vehicles - Crear vehículo (ADMIN)");
    info!("   PATCH /vehicles/:id - Actualizar vehículo (ADMIN)");
    info!("   DELETE /vehicles/:id - Eliminar vehículo (ADMIN)");
    info!("📸 Fotos:");
    info!("   GET  /vehicles/:id/photos - Listar fotos");
    info!("   POST /vehicles/:id/photos - Agregar foto (ADMIN)");
    info!("   DELETE /vehicles/photos/:photo_id - Eliminar foto (ADMIN)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
