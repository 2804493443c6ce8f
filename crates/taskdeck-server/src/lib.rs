pub mod auth;
pub mod retention;
pub mod routes;
#[cfg(test)]
mod test_helpers;

use anyhow::Result;
use tokio::net::TcpListener;

use routes::AppState;

pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let app = routes::build_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}
