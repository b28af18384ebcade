use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{Res, info, spotify, success, types::PkceToken};

pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Res<()> {
    info!("Waiting for Spotify authorization in the browser...");
    spotify::auth::auth(shared_state).await?;
    success!("Authentication successful!");
    Ok(())
}
