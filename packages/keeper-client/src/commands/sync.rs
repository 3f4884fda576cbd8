use keeper_core::Result;

use crate::service::{ClientService, Session};

pub async fn run(service: &ClientService, session: &Session, password: &str) -> Result<()> {
    let token = service.ensure_token(session, password).await?;
    service.sync(&session.user, &token).await?;
    println!("sync complete");
    Ok(())
}
