//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. La credencial del
//! proveedor de telemática es obligatoria: si falta, el servidor no
//! arranca (error de configuración, no error por request).

use std::env;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    // Proveedor de telemática
    pub telematics_base_url: String,
    pub telematics_api_token: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
                .collect(),
            telematics_base_url: env::var("TELEMATICS_BASE_URL")
                .unwrap_or_else(|_| "https://api.samsara.com".to_string()),
            telematics_api_token: env::var("TELEMATICS_API_TOKEN")
                .expect("TELEMATICS_API_TOKEN must be set"),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
