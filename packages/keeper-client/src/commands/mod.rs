//! One module per subcommand. Each prints its user-facing result on
//! stdout; diagnostics go to the tracing subscriber on stderr.

use keeper_core::{Error, Result};
use uuid::Uuid;

use crate::cli::ActionArgs;

pub mod binary;
pub mod card;
pub mod credentials;
pub mod sync;
pub mod text;

fn require_id(action: &ActionArgs) -> Result<Uuid> {
    action
        .id
        .ok_or_else(|| Error::Validation("--id is required for this action".into()))
}

fn require<T>(value: Option<T>, flag: &str) -> Result<T> {
    value.ok_or_else(|| Error::Validation(format!("{flag} is required for this action")))
}
