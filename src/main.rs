mod config;
mod controllers;
mod database;
mod dto;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use database::connection::mask_database_url;
use middleware::cors::{cors_middleware, cors_middleware_with_origins};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::default();

    // Configurar logging
    let log_level = if config.is_development() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("🚚 Fleet Maintenance Backend");
    info!("============================");

    // Inicializar base de datos
    let pool = match database::create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        info!("✅ Base de datos conectada: {}", mask_database_url(&url));
    }

    let app_state = match AppState::new(pool, config.clone()) {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Error de configuración: {}", e);
            return Err(anyhow::anyhow!("Error de configuración: {}", e));
        }
    };

    // CORS: orígenes explícitos en producción, permisivo en desarrollo
    let cors = if config.cors_origins.is_empty() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(config.cors_origins.clone())
    };
    let app = routes::create_routes(app_state).layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🚗 Vehículos:");
    info!("   GET    /api/vehicles - Listar vehículos");
    info!("   POST   /api/vehicles - Crear vehículo");
    info!("   GET    /api/vehicles/:id - Obtener vehículo");
    info!("   PUT    /api/vehicles/:id - Actualizar vehículo");
    info!("   DELETE /api/vehicles/:id - Eliminar vehículo");
    info!("   GET    /api/vehicles/:id/diagnostics - Códigos de diagnóstico");
    info!("   POST   /api/vehicles/diagnostics/:id/resolve - Resolver código");
    info!("🛠️ Mantenimiento:");
    info!("   GET    /api/maintenance/schedules - Listar templates");
    info!("   POST   /api/maintenance/schedules - Crear template");
    info!("   GET    /api/maintenance/schedules/:id - Obtener template");
    info!("   PUT    /api/maintenance/schedules/:id - Actualizar template");
    info!("   DELETE /api/maintenance/schedules/:id - Eliminar template");
    info!("   GET    /api/maintenance/assignments - Listar asignaciones");
    info!("   POST   /api/maintenance/assignments - Asignar template");
    info!("   POST   /api/maintenance/assignments/:id/complete - Completar tarea");
    info!("🔧 Órdenes de trabajo:");
    info!("   GET    /api/work-orders - Listar órdenes");
    info!("   POST   /api/work-orders - Crear orden");
    info!("   GET    /api/work-orders/:id - Obtener orden");
    info!("   PUT    /api/work-orders/:id/status - Cambiar estado");
    info!("🔩 Repuestos:");
    info!("   GET    /api/parts - Listar repuestos");
    info!("   GET    /api/parts/low-stock - Stock bajo mínimo");
    info!("📡 Telemática:");
    info!("   POST   /api/telematics/sync - Disparar sincronización");
    info!("   GET    /api/telematics/sync/status - Estado de la última corrida");
    info!("   POST   /api/telematics/sync/reset - Resetear corridas colgadas");
    info!("📊 Dashboard:");
    info!("   GET    /api/dashboard/summary - Resumen de la flota");
    info!("   GET    /api/dashboard/maintenance-due - Mantenimiento vencido");
    info!("   GET    /api/dashboard/alerts - Bandeja de alertas");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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
