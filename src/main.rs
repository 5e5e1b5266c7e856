mod config;
mod export;

use std::{
    fs::{self, File},
    io::BufWriter,
    path::PathBuf,
};

use chemcomp::{AtomicDatabase, CompositionRegistry, UnimodDatabase};
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use peptidoform::PeptidoformTable;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Enumerates every modified form of a set of peptides and tabulates their m/z values
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// A KDL file of sequences, charges, and variable modifications (defaults to the histone H3 peptides)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Where to write the CSV table
    #[arg(short, long, default_value = "peptidoforms.csv")]
    output: PathBuf,
    /// A KDL excerpt of Unimod to resolve modification titles against
    #[arg(short, long)]
    unimod: Option<PathBuf>,
    /// Log verbosity:
    /// 0 - Info
    /// 1 - Debug
    /// > 1 - Trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let verbosity = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(verbosity.into());
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = match &args.config {
        Some(path) => Config::from_kdl(path.to_string_lossy(), fs::read_to_string(path).into_diagnostic()?)?,
        None => Config::default(),
    };

    let atomic_db = AtomicDatabase::default();
    let unimod = match &args.unimod {
        Some(path) => UnimodDatabase::from_kdl(
            &atomic_db,
            path.to_string_lossy(),
            fs::read_to_string(path).into_diagnostic()?,
        )?,
        None => UnimodDatabase::new(&atomic_db),
    };
    info!(entries = unimod.len(), "loaded Unimod excerpt");

    let mut registry = CompositionRegistry::new(&atomic_db);
    let variable_mods = config.register_modifications(&mut registry, &unimod)?;
    let table = PeptidoformTable::new(&registry, variable_mods)?
        .charges(config.charges.iter().copied())
        .ion_type(config.ion_type)
        .show_unmodified_termini(config.show_unmodified_termini);

    let rows = table.rows(&config.sequences)?.collect::<peptidoform::Result<Vec<_>>>()?;
    info!(sequences = config.sequences.len(), rows = rows.len(), "enumerated peptidoforms");

    let file = File::create(&args.output).into_diagnostic()?;
    export::write_csv(&rows, BufWriter::new(file))?;
    println!("\"{}\" is exported.", args.output.display());

    Ok(())
}
