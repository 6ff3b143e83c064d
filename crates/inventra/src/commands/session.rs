//! Session command handlers: login, logout, status.

use secrecy::SecretString;
use serde_json::json;

use inventra_core::{Hub, SessionState};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;
use crate::output;

pub async fn login(hub: &Hub, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let password = match args.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")?,
    };

    let user = hub
        .session()
        .login(&args.email, &SecretString::from(password))
        .await?;

    if !global.quiet {
        eprintln!("Signed in as {} ({})", user.email, user.role);
    }
    Ok(())
}

pub async fn logout(hub: &Hub, global: &GlobalOpts) -> Result<(), CliError> {
    hub.session().logout().await;
    if !global.quiet {
        eprintln!("Signed out");
    }
    Ok(())
}

pub async fn status(hub: &Hub, global: &GlobalOpts) -> Result<(), CliError> {
    let state = hub.session().state().borrow().clone();
    let session = match &state {
        SessionState::Authenticated { user } => {
            json!({ "state": "authenticated", "email": user.email, "role": user.role })
        }
        SessionState::Anonymous => json!({ "state": "anonymous" }),
        SessionState::Restoring => json!({ "state": "restoring" }),
        SessionState::Uninitialized => json!({ "state": "uninitialized" }),
    };

    let connectivity = match hub.connectivity() {
        Some(monitor) => {
            let metrics = monitor.metrics().borrow().clone();
            json!({
                "configured": true,
                "healthy": metrics.healthy,
                "latency_ms": metrics.latency.map(|l| u64::try_from(l.as_millis()).unwrap_or(u64::MAX)),
                "consecutive_failures": metrics.consecutive_failures,
                "last_success_at": metrics.last_success_at,
            })
        }
        None => json!({ "configured": false }),
    };

    let status = json!({ "session": session, "connectivity": connectivity });

    let out = output::render_single(
        &global.output,
        &status,
        |s| {
            let mut lines = Vec::new();
            lines.push(format!(
                "Session:  {}",
                s["session"]["state"].as_str().unwrap_or("unknown")
            ));
            if let Some(email) = s["session"]["email"].as_str() {
                lines.push(format!("User:     {email}"));
            }
            if s["connectivity"]["configured"].as_bool() == Some(true) {
                let healthy = s["connectivity"]["healthy"].as_bool() == Some(true);
                lines.push(format!(
                    "Remote:   {}",
                    if healthy { "healthy" } else { "unreachable" }
                ));
                if let Some(ms) = s["connectivity"]["latency_ms"].as_u64() {
                    lines.push(format!("Latency:  {ms} ms"));
                }
            } else {
                lines.push("Remote:   not configured (offline-only)".into());
            }
            lines.join("\n")
        },
        |s| s["session"]["state"].as_str().unwrap_or("unknown").to_owned(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
