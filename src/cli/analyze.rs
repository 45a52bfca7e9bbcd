use super::{export, ui};
use crate::core::config::AppConfig;
use crate::core::{Analysis, PriceSource, analyze};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::Cell;
use tracing::info;

/// Runs the analysis for the configured portfolio and prints the report.
///
/// `export_dir` overrides the directory from the configuration file.
pub async fn run(
    config: &AppConfig,
    source: &(dyn PriceSource + Send + Sync),
    export_dir: Option<&str>,
    today: NaiveDate,
) -> Result<Analysis> {
    info!("Running portfolio analysis...");

    let pb = ui::new_progress_bar(config.portfolio.instruments.len() as u64);
    let result = analyze(&config.portfolio, source, today, &|| pb.inc(1)).await;
    pb.finish_and_clear();
    let analysis = result.context("Portfolio analysis failed")?;

    display_analysis(&analysis);

    if let Some(dir) = export_dir.or(config.export_dir.as_deref()) {
        let (prices, returns) = export::export_all(dir, &analysis)?;
        println!(
            "\n{}",
            ui::style_text(
                &format!("Prices saved to {}", prices.display()),
                ui::StyleType::Subtle
            )
        );
        println!(
            "{}",
            ui::style_text(
                &format!("Daily returns saved to {}", returns.display()),
                ui::StyleType::Subtle
            )
        );
    }

    Ok(analysis)
}

fn display_analysis(analysis: &Analysis) {
    let config = &analysis.config;
    let result = &analysis.result;

    println!(
        "\nPortfolio: {}",
        ui::style_text(&config.instruments().join(", "), ui::StyleType::Title)
    );
    println!(
        "Date range: {} to {} ({} aligned dates, {} complete return rows)",
        config.start_date(),
        config.end_date(),
        analysis.prices.len(),
        analysis.returns.rows()
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Instrument"),
        ui::header_cell("Weight"),
        ui::header_cell("Observations"),
        ui::header_cell("Mean Daily Return"),
        ui::header_cell("Daily Std Dev"),
    ]);
    let std_devs = result.std_devs();
    for (i, instrument) in config.instruments().iter().enumerate() {
        let observed = analysis
            .prices
            .column(instrument)
            .map_or(0, |col| col.iter().filter(|p| p.is_some()).count());
        table.add_row(vec![
            Cell::new(instrument),
            ui::number_cell(format!("{:.2}%", config.weights()[i] * 100.0)),
            ui::number_cell(observed.to_string()),
            ui::return_cell(result.mean_vector[i]),
            ui::number_cell(ui::format_pct(std_devs[i])),
        ]);
    }
    println!("{table}");

    let mut cov_table = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Covariance")];
    header.extend(config.instruments().iter().map(|i| ui::header_cell(i)));
    cov_table.set_header(header);
    for (i, row) in result.covariance_matrix.iter().enumerate() {
        let mut cells = vec![ui::header_cell(&config.instruments()[i])];
        cells.extend(row.iter().map(|c| ui::number_cell(format!("{c:.6e}"))));
        cov_table.add_row(cells);
    }
    println!("{cov_table}");

    println!(
        "{} {}",
        ui::style_text("Expected portfolio return (daily):", ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_pct(result.expected_return), ui::StyleType::TotalValue)
    );
    println!(
        "{} {}",
        ui::style_text("Portfolio risk (daily std dev):", ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_pct(result.risk), ui::StyleType::TotalValue)
    );
    println!(
        "{} {}",
        ui::style_text("Portfolio variance (daily):", ui::StyleType::TotalLabel),
        ui::style_text(&format!("{:.6e}", result.variance()), ui::StyleType::TotalValue)
    );
    ui::print_separator();
}
