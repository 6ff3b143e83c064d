//! Product command handlers.

use owo_colors::OwoColorize;
use tabled::Tabled;

use inventra_core::{Hub, Product, ProductDraft, ProductPatch, Source};

use crate::cli::{GlobalOpts, ProductsArgs, ProductsCommand};
use crate::error::CliError;
use crate::output;

use super::actor;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "Stock")]
    stock: u32,
    #[tabled(rename = "Min")]
    min_stock: u32,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Price")]
    price: String,
}

fn to_row(product: &Product, color: bool) -> ProductRow {
    let status = if color && product.status.needs_attention() {
        product.status.to_string().yellow().to_string()
    } else {
        product.status.to_string()
    };
    ProductRow {
        id: product.id.clone(),
        name: product.name.clone(),
        sku: product.sku.clone().unwrap_or_default(),
        stock: product.stock,
        min_stock: product.min_stock,
        status,
        price: format!("{:.2}", product.unit_price),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(hub: &Hub, args: ProductsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        command @ (ProductsCommand::List | ProductsCommand::Refresh) => {
            let result = if matches!(command, ProductsCommand::Refresh) {
                hub.products().refresh().await?
            } else {
                hub.products().list().await?
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
                |p| to_row(p, color),
                |p| p.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProductsCommand::Add {
            name,
            sku,
            category,
            stock,
            min_stock,
            price,
        } => {
            let user = actor(hub)?;
            let product = hub
                .products()
                .add(
                    &user,
                    ProductDraft {
                        name,
                        sku,
                        category,
                        stock,
                        min_stock,
                        unit_price: price,
                    },
                )
                .await?;
            if !global.quiet {
                eprintln!("Added product {} ({})", product.name, product.id);
            }
            Ok(())
        }

        ProductsCommand::Update {
            id,
            name,
            sku,
            category,
            stock,
            min_stock,
            price,
        } => {
            let user = actor(hub)?;
            let product = hub
                .products()
                .update(
                    &user,
                    &id,
                    ProductPatch {
                        name,
                        sku,
                        category,
                        stock,
                        min_stock,
                        unit_price: price,
                    },
                )
                .await?;
            if !global.quiet {
                eprintln!("Updated product {} (status: {})", product.id, product.status);
            }
            Ok(())
        }

        ProductsCommand::Delete { id } => {
            if !output::confirm(&format!("Delete product '{id}'?"), global.yes)? {
                return Ok(());
            }
            let user = actor(hub)?;
            hub.products().delete(&user, &id).await?;
            if !global.quiet {
                eprintln!("Deleted product {id}");
            }
            Ok(())
        }
    }
}
