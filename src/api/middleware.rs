use actix_cors::Cors;

use crate::config::ServerConfig;

/// CORS for the browser dashboard. Read-only data plus the layout mutations.
pub fn cors(config: &ServerConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "DELETE"])
        .allow_any_header()
        .max_age(3600);

    match &config.cors_origin {
        Some(origin) => cors.allowed_origin(origin),
        None => cors.allow_any_origin(),
    }
}
