//! Asset command handlers.

use owo_colors::OwoColorize;
use tabled::Tabled;

use inventra_core::{Asset, AssetDraft, AssetPatch, AssetStatus, Hub, Source};

use crate::cli::{AssetsArgs, AssetsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::actor;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AssetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Tag")]
    tag: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
}

fn to_row(asset: &Asset, color: bool) -> AssetRow {
    let status = if color {
        match asset.status {
            AssetStatus::Available => asset.status.to_string().green().to_string(),
            AssetStatus::Borrowed => asset.status.to_string().yellow().to_string(),
            AssetStatus::Maintenance | AssetStatus::Retired => {
                asset.status.to_string().dimmed().to_string()
            }
        }
    } else {
        asset.status.to_string()
    };
    AssetRow {
        id: asset.id.clone(),
        name: asset.name.clone(),
        tag: asset.tag.clone().unwrap_or_default(),
        status,
        assignee: asset.assignee.clone().unwrap_or_default(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(hub: &Hub, args: AssetsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        command @ (AssetsCommand::List | AssetsCommand::Refresh) => {
            let result = if matches!(command, AssetsCommand::Refresh) {
                hub.assets().refresh().await?
            } else {
                hub.assets().list().await?
            };

            if result.source == Source::LocalFallback && !global.quiet {
                match &result.error {
                    Some(e) => eprintln!("warning: server unreachable ({e}); showing local data"),
                    None => eprintln!("showing local data (no server configured)"),
                }
            }

            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &result.data,
                |a| to_row(a, color),
                |a| a.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AssetsCommand::Add { name, tag, category } => {
            let user = actor(hub)?;
            let asset = hub
                .assets()
                .add(&user, AssetDraft { name, tag, category })
                .await?;
            if !global.quiet {
                eprintln!("Registered asset {} ({})", asset.name, asset.id);
            }
            Ok(())
        }

        AssetsCommand::Update {
            id,
            name,
            tag,
            category,
        } => {
            let user = actor(hub)?;
            let asset = hub
                .assets()
                .update(
                    &user,
                    &id,
                    AssetPatch {
                        name,
                        tag,
                        category,
                        status: None,
                    },
                )
                .await?;
            if !global.quiet {
                eprintln!("Updated asset {}", asset.id);
            }
            Ok(())
        }

        AssetsCommand::Delete { id } => {
            if !output::confirm(&format!("Delete asset '{id}'?"), global.yes)? {
                return Ok(());
            }
            let user = actor(hub)?;
            hub.assets().delete(&user, &id).await?;
            if !global.quiet {
                eprintln!("Deleted asset {id}");
            }
            Ok(())
        }

        AssetsCommand::Borrow { id, assignee } => {
            let user = actor(hub)?;
            let asset = hub.assets().borrow(&user, &id, &assignee).await?;
            if !global.quiet {
                eprintln!("Asset {} checked out to {assignee}", asset.name);
            }
            Ok(())
        }

        AssetsCommand::Return { id } => {
            let user = actor(hub)?;
            let asset = hub.assets().hand_in(&user, &id).await?;
            if !global.quiet {
                eprintln!("Asset {} returned", asset.name);
            }
            Ok(())
        }
    }
}
