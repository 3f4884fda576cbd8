use chrono::Utc;
use keeper_core::crypto::Dealer;
use keeper_core::model::{Credentials, Status, User};
use keeper_core::Result;

use super::{require, require_id};
use crate::cli::{Action, ActionArgs};
use crate::service::ClientService;

pub fn run(
    service: &ClientService,
    user: &User,
    dealer: &Dealer,
    action: &ActionArgs,
    login: Option<String>,
    password: Option<String>,
) -> Result<()> {
    match action.action {
        Action::Get => {
            let id = require_id(action)?;
            let found = service.credentials.find_by_id(id)?;
            if found.status == Status::Deleted {
                println!("credentials id = {id} status = DELETED");
                return Ok(());
            }
            let login = dealer.decrypt(&found.login)?;
            let password = dealer.decrypt(&found.password)?;
            println!("Login: {login}, password: {password}");
        }
        Action::Save => {
            let login = dealer.encrypt(&require(login, "--l")?)?;
            let password = dealer.encrypt(&require(password, "--p")?)?;
            let item = if action.new_on_device {
                Credentials::new(login, password, user.id)
            } else {
                Credentials {
                    id: require_id(action)?,
                    login,
                    password,
                    new_on_device: false,
                    user_id: user.id,
                    status: Status::Active,
                    modified_tms: Utc::now(),
                }
            };
            service.credentials.save(&item)?;
            println!("saved credentials id = {}", item.id);
        }
        Action::Delete => {
            let id = require_id(action)?;
            service.credentials.soft_delete(id)?;
            println!("deleted credentials id = {id}");
        }
    }
    Ok(())
}
