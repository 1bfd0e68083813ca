//! `usuppli duty` command - Show the effective duty rate for a country

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cli::helpers::{escape_tsv, format_rate, to_csv, Context};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{DutyResolver, DutySource};
use crate::entities::Product;

#[derive(clap::Args, Debug)]
pub struct DutyArgs {
    /// Destination country (e.g. "USA", "South Africa")
    pub country: String,

    /// Product file whose duty overrides should be considered
    #[arg(long, short = 'p')]
    pub product: Option<PathBuf>,
}

#[derive(Serialize)]
struct DutyReport<'a> {
    country: &'a str,
    rate: f64,
    rate_percent: f64,
    source: DutySource,
    locked: bool,
}

pub fn run(args: DutyArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global);
    let store = ctx.tariff_store();
    let resolver = DutyResolver::from_store(&store).with_default_rate(ctx.config.default_duty_rate());

    let overrides = match &args.product {
        Some(path) => {
            Product::load(path)
                .map_err(|e| miette::miette!("{}", e))?
                .duty_overrides
        }
        None => BTreeMap::new(),
    };

    let resolved = resolver.resolve(&args.country, &overrides);
    let report = DutyReport {
        country: &args.country,
        rate: resolved.rate,
        rate_percent: resolved.rate_percent(),
        source: resolved.source,
        locked: store.is_locked(&args.country),
    };

    match ctx.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&report).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            println!(
                "{}\t{:.4}\t{}",
                escape_tsv(report.country),
                report.rate,
                report.source,
            );
        }
        OutputFormat::Csv => {
            print!(
                "{}",
                to_csv([
                    ["country".to_string(), "rate".to_string(), "source".to_string()],
                    [
                        report.country.to_string(),
                        format!("{:.4}", report.rate),
                        report.source.to_string(),
                    ],
                ])?
            );
        }
        OutputFormat::Md | OutputFormat::Auto => {
            println!(
                "{}: {} {}",
                style(&args.country).cyan(),
                style(format_rate(report.rate)).bold(),
                style(format!("({})", report.source)).dim()
            );
        }
    }

    Ok(())
}
