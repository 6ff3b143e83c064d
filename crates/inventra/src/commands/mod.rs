//! Command handlers.

pub mod analytics;
pub mod assets;
pub mod products;
pub mod session;

use inventra_core::{Hub, Role, UserIdentity};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler.
pub async fn dispatch(command: Command, hub: &Hub, global: &GlobalOpts) -> Result<(), CliError> {
    match command {
        Command::Login(args) => session::login(hub, args, global).await,
        Command::Logout => session::logout(hub, global).await,
        Command::Status => session::status(hub, global).await,
        Command::Products(args) => products::handle(hub, args, global).await,
        Command::Assets(args) => assets::handle(hub, args, global).await,
        Command::Analytics(args) => analytics::handle(hub, args, global).await,
        Command::Movements => analytics::movements(hub, global).await,
    }
}

/// Resolve the acting user for mutating commands.
///
/// With a server configured, mutations require a signed-in session. An
/// offline-only deployment has no login flow at all -- the local operator
/// owns the mirror and acts with full rights over it.
pub(crate) fn actor(hub: &Hub) -> Result<UserIdentity, CliError> {
    if let Some(user) = hub.session().current_user() {
        return Ok(user);
    }
    if hub.config().remote.is_none() {
        return Ok(UserIdentity {
            id: "local".into(),
            email: "local@inventra".into(),
            name: None,
            role: Role::Admin,
        });
    }
    Err(CliError::NotSignedIn)
}
