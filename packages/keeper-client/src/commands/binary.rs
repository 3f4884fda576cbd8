use std::fs;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use keeper_core::crypto::Dealer;
use keeper_core::model::{Binary, Status, User};
use keeper_core::{Error, Result};

use super::{require, require_id};
use crate::cli::{Action, ActionArgs};
use crate::service::ClientService;

pub fn run(
    service: &ClientService,
    user: &User,
    dealer: &Dealer,
    action: &ActionArgs,
    file: Option<PathBuf>,
) -> Result<()> {
    match action.action {
        Action::Get => {
            let id = require_id(action)?;
            let found = service.binaries.find_by_id(id)?;
            if found.status == Status::Deleted {
                println!("file id = {id} status = DELETED");
                return Ok(());
            }
            let encoded = dealer.decrypt(&found.data)?;
            let bytes = BASE64
                .decode(encoded)
                .map_err(|e| Error::Storage(format!("stored payload is not base64: {e}")))?;
            fs::write(&found.name, bytes)?;
            println!("written file {}", found.name);
        }
        Action::Save => {
            let path = require(file, "--f")?;
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| Error::Validation("--f must point to a named file".into()))?
                .to_owned();
            let bytes = fs::read(&path)?;
            let data = dealer.encrypt(&BASE64.encode(bytes))?;
            let item = if action.new_on_device {
                Binary::new(name, data, user.id)
            } else {
                Binary {
                    id: require_id(action)?,
                    name,
                    data,
                    new_on_device: false,
                    user_id: user.id,
                    status: Status::Active,
                    modified_tms: Utc::now(),
                }
            };
            service.binaries.save(&item)?;
            println!("saved file id = {}", item.id);
        }
        Action::Delete => {
            let id = require_id(action)?;
            service.binaries.soft_delete(id)?;
            println!("deleted file id = {id}");
        }
    }
    Ok(())
}
