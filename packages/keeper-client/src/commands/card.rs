use chrono::Utc;
use keeper_core::crypto::Dealer;
use keeper_core::model::{Card, Status, User};
use keeper_core::Result;

use super::{require, require_id};
use crate::cli::{Action, ActionArgs};
use crate::service::ClientService;

pub fn run(
    service: &ClientService,
    user: &User,
    dealer: &Dealer,
    action: &ActionArgs,
    number: Option<String>,
    cvc: Option<String>,
    holder: Option<String>,
) -> Result<()> {
    match action.action {
        Action::Get => {
            let id = require_id(action)?;
            let found = service.cards.find_by_id(id)?;
            if found.status == Status::Deleted {
                println!("card id = {id} status = DELETED");
                return Ok(());
            }
            let number = dealer.decrypt(&found.number)?;
            let cvc = dealer.decrypt(&found.cvc)?;
            let holder = dealer.decrypt(&found.holder)?;
            println!("number: {number}, cvc: {cvc}, holder: {holder}");
        }
        Action::Save => {
            let number = dealer.encrypt(&require(number, "--n")?)?;
            let cvc = dealer.encrypt(&require(cvc, "--c")?)?;
            let holder = dealer.encrypt(&require(holder, "--hn")?)?;
            let item = if action.new_on_device {
                Card::new(number, cvc, holder, user.id)
            } else {
                Card {
                    id: require_id(action)?,
                    number,
                    cvc,
                    holder,
                    new_on_device: false,
                    user_id: user.id,
                    status: Status::Active,
                    modified_tms: Utc::now(),
                }
            };
            service.cards.save(&item)?;
            println!("saved card id = {}", item.id);
        }
        Action::Delete => {
            let id = require_id(action)?;
            service.cards.soft_delete(id)?;
            println!("deleted card id = {id}");
        }
    }
    Ok(())
}
