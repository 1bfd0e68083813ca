//! `usuppli cost` command - Landed cost breakdown for a product

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_tsv, format_money, format_rate, to_csv, write_output, Context};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::DutyResolver;
use crate::entities::{Product, ProductCosting};

#[derive(clap::Args, Debug)]
pub struct CostArgs {
    /// Product file (YAML, or JSON by .json extension)
    pub product: PathBuf,

    /// Destination country (default: product destination, then config default_country)
    #[arg(long, short = 'c')]
    pub country: Option<String>,

    /// Target retail price (overrides the product's target_retail_price)
    #[arg(long, short = 'r')]
    pub retail: Option<f64>,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: CostArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global);
    let mut product = Product::load(&args.product).map_err(|e| miette::miette!("{}", e))?;

    if let Some(retail) = args.retail {
        product.target_retail_price = Some(retail);
    }

    let country = args
        .country
        .clone()
        .or_else(|| product.destination.clone())
        .or_else(|| ctx.config.default_country.clone())
        .ok_or_else(|| {
            miette::miette!(
                "No destination country for product '{}'. Pass --country or set 'destination' in the product file",
                product.id
            )
        })?;

    let store = ctx.tariff_store();
    let resolver = DutyResolver::from_store(&store).with_default_rate(ctx.config.default_duty_rate());
    let costing = product.landed_cost(&resolver, &country);

    let content = match ctx.format {
        OutputFormat::Yaml => serde_yml::to_string(&costing).into_diagnostic()?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&costing).into_diagnostic()?;
            json.push('\n');
            json
        }
        OutputFormat::Csv => render_csv(&product, &costing)?,
        OutputFormat::Tsv => render_tsv(&product, &costing),
        OutputFormat::Md => render_markdown(&product, &costing),
        OutputFormat::Auto => render_human(&product, &costing, global.quiet),
    };

    write_output(&content, args.output)
}

/// (label, amount) rows of the breakdown, in display order
fn breakdown_rows(product: &Product, costing: &ProductCosting) -> Vec<(String, f64)> {
    let landed = &costing.landed;
    let mut rows: Vec<(String, f64)> = product
        .cost_lines
        .iter()
        .map(|line| {
            let name = if line.name.is_empty() {
                "(unnamed)".to_string()
            } else {
                line.name.clone()
            };
            (name, line.value)
        })
        .collect();

    rows.push(("FOB Subtotal".to_string(), landed.fob_subtotal));
    rows.push(("Freight".to_string(), landed.freight));
    rows.push((
        format!("Duty ({})", format_rate(costing.duty.rate)),
        landed.duty,
    ));
    rows.push(("Insurance".to_string(), landed.insurance));
    rows.push(("Other".to_string(), landed.other));
    rows.push(("Total Landed Cost".to_string(), landed.total));

    if let Some(priced) = &costing.priced {
        rows.push(("Target Retail".to_string(), priced.target_retail_price));
        rows.push(("Profit".to_string(), priced.profit));
    }

    rows
}

fn render_human(product: &Product, costing: &ProductCosting, quiet: bool) -> String {
    let mut out = String::new();

    if !quiet {
        let title = if product.name.is_empty() {
            product.id.clone()
        } else {
            format!("{} ({})", product.name, product.id)
        };
        out.push_str(&format!("{}\n", style(title).bold()));
        out.push_str(&format!(
            "Destination: {}  Duty: {} [{}]\n",
            style(&costing.country).cyan(),
            format_rate(costing.duty.rate),
            style(costing.duty.source).yellow()
        ));
        out.push_str(&format!(
            "Chargeable weight: {:.2} kg (volumetric {:.2} kg)\n\n",
            costing.chargeable_weight_kg, costing.volumetric_weight_kg
        ));
    }

    let mut builder = Builder::default();
    builder.push_record(["Component", "Amount"]);
    for (label, amount) in breakdown_rows(product, costing) {
        builder.push_record([label, format_money(amount)]);
    }
    out.push_str(&builder.build().with(Style::rounded()).to_string());
    out.push('\n');

    if let Some(priced) = &costing.priced {
        let margin = format!("{:.1}%", priced.margin_percent);
        let styled = if priced.margin_percent < 0.0 {
            style(margin).red().bold()
        } else {
            style(margin).green()
        };
        out.push_str(&format!("Margin: {}\n", styled));
    }

    out
}

fn render_markdown(product: &Product, costing: &ProductCosting) -> String {
    let mut out = format!("# Landed Cost: {}\n\n", product.id);

    let mut builder = Builder::default();
    builder.push_record(["Component", "Amount"]);
    for (label, amount) in breakdown_rows(product, costing) {
        builder.push_record([label.replace('|', "\\|"), format_money(amount)]);
    }
    out.push_str(&builder.build().with(Style::markdown()).to_string());
    out.push('\n');

    out.push_str("\n## Summary\n\n");
    out.push_str(&format!("- **Destination:** {}\n", costing.country));
    out.push_str(&format!(
        "- **Duty Rate:** {} ({})\n",
        format_rate(costing.duty.rate),
        costing.duty.source
    ));
    out.push_str(&format!(
        "- **Chargeable Weight:** {:.2} kg\n",
        costing.chargeable_weight_kg
    ));
    if let Some(priced) = &costing.priced {
        out.push_str(&format!("- **Margin:** {:.1}%\n", priced.margin_percent));
    }

    out
}

fn render_tsv(product: &Product, costing: &ProductCosting) -> String {
    let mut out = String::from("component\tamount\n");
    for (label, amount) in breakdown_rows(product, costing) {
        out.push_str(&format!("{}\t{:.2}\n", escape_tsv(&label), amount));
    }
    if let Some(priced) = &costing.priced {
        out.push_str(&format!("Margin %\t{:.2}\n", priced.margin_percent));
    }
    out
}

fn render_csv(product: &Product, costing: &ProductCosting) -> Result<String> {
    let mut records = vec![["component".to_string(), "amount".to_string()]];
    for (label, amount) in breakdown_rows(product, costing) {
        records.push([label, format!("{:.2}", amount)]);
    }
    if let Some(priced) = &costing.priced {
        records.push(["Margin %".to_string(), format!("{:.2}", priced.margin_percent)]);
    }
    to_csv(records)
}
