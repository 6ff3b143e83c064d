//! Analytics and stock-movement handlers.
//!
//! All numbers come from the server; nothing is computed here. These
//! surfaces have no local mirror, so they require a configured remote.

use tabled::Tabled;

use inventra_core::Hub;

use crate::cli::{AnalyticsArgs, AnalyticsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "In")]
    stock_in: i64,
    #[tabled(rename = "Out")]
    stock_out: i64,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Products")]
    product_count: u64,
    #[tabled(rename = "Stock value")]
    stock_value: String,
}

#[derive(Tabled)]
struct VelocityRow {
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Velocity")]
    velocity: String,
}

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Message")]
    message: String,
}

#[derive(Tabled)]
struct MovementRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Product")]
    product_id: String,
    #[tabled(rename = "Dir")]
    direction: String,
    #[tabled(rename = "Qty")]
    quantity: u32,
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(hub: &Hub, args: AnalyticsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let api = hub.remote()?;

    match args.command {
        AnalyticsCommand::Overview => {
            let stats = api.analytics_overview().await.map_err(core_err)?;
            let out = output::render_single(
                &global.output,
                &stats,
                |s| {
                    format!(
                        "Products:      {}\nAssets:        {}\nLow stock:     {}\nOut of stock:  {}\nStock value:   {:.2}",
                        s.total_products,
                        s.total_assets,
                        s.low_stock_count,
                        s.out_of_stock_count,
                        s.total_stock_value
                    )
                },
                |s| s.total_products.to_string(),
            );
            output::print_output(&out, global.quiet);
        }

        AnalyticsCommand::Trends => {
            let trends = api.analytics_trends().await.map_err(core_err)?;
            let out = output::render_list(
                &global.output,
                &trends,
                |t| TrendRow {
                    period: t.period.clone(),
                    stock_in: t.stock_in,
                    stock_out: t.stock_out,
                },
                |t| t.period.clone(),
            );
            output::print_output(&out, global.quiet);
        }

        AnalyticsCommand::Categories => {
            let categories = api.analytics_categories().await.map_err(core_err)?;
            let out = output::render_list(
                &global.output,
                &categories,
                |c| CategoryRow {
                    category: c.category.clone(),
                    product_count: c.product_count,
                    stock_value: format!("{:.2}", c.stock_value),
                },
                |c| c.category.clone(),
            );
            output::print_output(&out, global.quiet);
        }

        AnalyticsCommand::Velocity => {
            let velocity = api.analytics_stock_velocity().await.map_err(core_err)?;
            let out = output::render_list(
                &global.output,
                &velocity,
                |v| VelocityRow {
                    product: v.name.clone().unwrap_or_else(|| v.product_id.clone()),
                    velocity: format!("{:.2}", v.velocity),
                },
                |v| v.product_id.clone(),
            );
            output::print_output(&out, global.quiet);
        }

        AnalyticsCommand::Insights => {
            let insights = api.analytics_insights().await.map_err(core_err)?;
            let out = output::render_list(
                &global.output,
                &insights,
                |i| AlertRow {
                    level: i.kind.clone().unwrap_or_else(|| "info".into()),
                    message: i.message.clone(),
                },
                |i| i.id.clone(),
            );
            output::print_output(&out, global.quiet);
        }

        AnalyticsCommand::Alerts => {
            let alerts = api.analytics_alerts().await.map_err(core_err)?;
            let out = output::render_list(
                &global.output,
                &alerts,
                |a| AlertRow {
                    level: a.level.clone(),
                    message: a.message.clone(),
                },
                |a| a.id.clone(),
            );
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}

pub async fn movements(hub: &Hub, global: &GlobalOpts) -> Result<(), CliError> {
    let api = hub.remote()?;
    let movements = api.stock_movements().await.map_err(core_err)?;
    let out = output::render_list(
        &global.output,
        &movements,
        |m| MovementRow {
            when: m.recorded_at.to_rfc3339(),
            product_id: m.product_id.clone(),
            direction: m.direction.clone(),
            quantity: m.quantity,
        },
        |m| m.id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn core_err(err: inventra_api::Error) -> CliError {
    CliError::Core(inventra_core::CoreError::from(err))
}
