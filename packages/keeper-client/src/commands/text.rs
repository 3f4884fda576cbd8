use chrono::Utc;
use keeper_core::model::{Status, Text, User};
use keeper_core::Result;

use super::{require, require_id};
use crate::cli::{Action, ActionArgs};
use crate::service::ClientService;

pub fn run(
    service: &ClientService,
    user: &User,
    action: &ActionArgs,
    text: Option<String>,
) -> Result<()> {
    match action.action {
        Action::Get => {
            let id = require_id(action)?;
            let found = service.texts.find_by_id(id)?;
            if found.status == Status::Deleted {
                println!("text id = {id} status = DELETED");
                return Ok(());
            }
            println!("text: {}", found.text);
        }
        Action::Save => {
            let body = require(text, "--t")?;
            let item = if action.new_on_device {
                Text::new(body, user.id)
            } else {
                Text {
                    id: require_id(action)?,
                    text: body,
                    new_on_device: false,
                    user_id: user.id,
                    status: Status::Active,
                    modified_tms: Utc::now(),
                }
            };
            service.texts.save(&item)?;
            println!("saved text id = {}", item.id);
        }
        Action::Delete => {
            let id = require_id(action)?;
            service.texts.soft_delete(id)?;
            println!("deleted text id = {id}");
        }
    }
    Ok(())
}
