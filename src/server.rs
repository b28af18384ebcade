use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{api, config, types::PkceToken};

pub async fn start_api_server(state: Arc<Mutex<Option<PkceToken>>>) -> Result<(), String> {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)));

    let addr_str = config::server_addr().map_err(|e| e.to_string())?;
    let addr = SocketAddr::from_str(&addr_str)
        .map_err(|e| format!("Failed to parse server address {}: {}", addr_str, e))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
    axum::serve(listener, app).await.map_err(|e| e.to_string())
}
