//! `usuppli tariff` command - Global tariff table management
//!
//! Listing is open to every role; changes require the super_admin role.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_tsv, format_rate, to_csv, Context};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{TariffError, TariffRateStore};

#[derive(Subcommand, Debug)]
pub enum TariffCommands {
    /// List global rates and locks
    List,

    /// Set a country's global rate (fraction, e.g. 0.2 for 20%)
    Set(SetArgs),

    /// Restore the built-in rates and clear all locks
    Reset,

    /// Lock a country so its global rate overrides product rates
    Lock(CountryArgs),

    /// Remove a country lock
    Unlock(CountryArgs),
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Country name (e.g. "Nigeria")
    pub country: String,

    /// Rate as entered; unparseable input stores 0
    #[arg(allow_hyphen_values = true)]
    pub rate: String,
}

#[derive(clap::Args, Debug)]
pub struct CountryArgs {
    /// Country name
    pub country: String,
}

#[derive(Serialize)]
struct TariffRow<'a> {
    country: &'a str,
    rate: f64,
    locked: bool,
}

/// Run a tariff subcommand
pub fn run(cmd: TariffCommands, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global);

    match cmd {
        TariffCommands::List => run_list(&ctx),
        TariffCommands::Set(args) => run_set(&ctx, global, args),
        TariffCommands::Reset => run_reset(&ctx, global),
        TariffCommands::Lock(args) => run_lock(&ctx, global, args, true),
        TariffCommands::Unlock(args) => run_lock(&ctx, global, args, false),
    }
}

fn run_list(ctx: &Context) -> Result<()> {
    let store = ctx.tariff_store();
    let rows: Vec<TariffRow<'_>> = store
        .rates()
        .iter()
        .map(|(country, rate)| TariffRow {
            country,
            rate: *rate,
            locked: store.is_locked(country),
        })
        .collect();

    match ctx.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&rows).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            for row in &rows {
                println!("{}\t{}\t{}", escape_tsv(row.country), row.rate, row.locked);
            }
        }
        OutputFormat::Csv => {
            let header = ["country", "rate", "locked"].map(String::from);
            let records = std::iter::once(header).chain(rows.iter().map(|row| {
                [
                    row.country.to_string(),
                    row.rate.to_string(),
                    row.locked.to_string(),
                ]
            }));
            print!("{}", to_csv(records)?);
        }
        OutputFormat::Md | OutputFormat::Auto => {
            let mut builder = Builder::default();
            builder.push_record(["Country", "Rate", "Locked"]);
            for row in &rows {
                builder.push_record([
                    row.country.to_string(),
                    format_rate(row.rate),
                    if row.locked { "yes" } else { "-" }.to_string(),
                ]);
            }
            let mut table = builder.build();
            if ctx.format == OutputFormat::Md {
                table.with(Style::markdown());
            } else {
                table.with(Style::rounded());
            }
            println!("{}", table);

            if ctx.format == OutputFormat::Auto {
                let origin = if store.is_customized() {
                    "customized"
                } else {
                    "built-in defaults"
                };
                println!(
                    "{}",
                    style(format!(
                        "{} countr{} ({}), access: {}",
                        rows.len(),
                        if rows.len() == 1 { "y" } else { "ies" },
                        origin,
                        store.access()
                    ))
                    .dim()
                );
            }
        }
    }

    Ok(())
}

fn writable_store(ctx: &Context, global: &GlobalOpts) -> Result<TariffRateStore> {
    ctx.require_workspace(global)?;
    Ok(ctx.tariff_store())
}

fn tariff_error(ctx: &Context, err: TariffError) -> miette::Report {
    match err {
        TariffError::ReadOnly => miette::miette!(
            help = "Pass --role super_admin or set 'role: super_admin' in .usuppli/config.yaml",
            "Tariff table is read-only for role '{}'",
            ctx.role
        ),
        other => miette::miette!("{}", other),
    }
}

fn run_set(ctx: &Context, global: &GlobalOpts, args: SetArgs) -> Result<()> {
    let mut store = writable_store(ctx, global)?;
    let stored = store
        .update_rate(&args.country, &args.rate)
        .map_err(|e| tariff_error(ctx, e))?;

    if !global.quiet {
        println!(
            "{} Set {} {} {}",
            style("✓").green(),
            style(args.country.trim()).cyan(),
            style("→").dim(),
            style(format_rate(stored)).yellow()
        );
        if store.is_locked(args.country.trim()) {
            println!(
                "  {} country is locked; this rate overrides product rates",
                style("!").yellow()
            );
        }
    }
    Ok(())
}

fn run_reset(ctx: &Context, global: &GlobalOpts) -> Result<()> {
    let mut store = writable_store(ctx, global)?;
    store.reset_to_defaults().map_err(|e| tariff_error(ctx, e))?;

    if !global.quiet {
        println!(
            "{} Tariff table reset to {} built-in rates",
            style("✓").green(),
            store.rates().len()
        );
    }
    Ok(())
}

fn run_lock(ctx: &Context, global: &GlobalOpts, args: CountryArgs, lock: bool) -> Result<()> {
    let mut store = writable_store(ctx, global)?;
    let changed = if lock {
        store.lock(&args.country)
    } else {
        store.unlock(&args.country)
    }
    .map_err(|e| tariff_error(ctx, e))?;

    if global.quiet {
        return Ok(());
    }

    let action = if lock { "Locked" } else { "Unlocked" };
    if changed {
        println!(
            "{} {} {}",
            style("✓").green(),
            action,
            style(args.country.trim()).cyan()
        );
        if lock && store.rate(args.country.trim()).is_none() {
            println!(
                "  {} no global rate set; the lock applies once one is",
                style("!").yellow()
            );
        }
    } else {
        println!(
            "{} {} was already {}",
            style("!").yellow(),
            style(args.country.trim()).cyan(),
            action.to_lowercase()
        );
    }
    Ok(())
}
