//! metabostat - Metabolomics Statistics CLI
//!
//! Command-line interface for the metabolomics transformation pipeline.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use metabostat::data::{MetaboliteTable, ReferenceData, VariableTable};
use metabostat::error::{MetaboError, Result};
use metabostat::pipeline::{IsoGranularity, SessionConfig};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Output format of result tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Tsv,
    Json,
}

/// CLI-friendly isotopologue granularity
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliGranularity {
    /// Labelled isotopologues summed per compound
    Summed,
    /// One row per compound and label
    PerLabel,
}

impl From<CliGranularity> for IsoGranularity {
    fn from(g: CliGranularity) -> Self {
        match g {
            CliGranularity::Summed => IsoGranularity::Summed,
            CliGranularity::PerLabel => IsoGranularity::PerLabel,
        }
    }
}

/// Metabolomics statistical transformation pipeline
#[derive(Parser)]
#[command(name = "metabostat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the normalized, grouped pool table
    Normalize {
        /// Path to session configuration YAML
        #[arg(short, long)]
        session: PathBuf,

        /// Path to pool table TSV
        #[arg(short, long)]
        pool: PathBuf,

        /// Path to pathway class reference CSV
        #[arg(short, long)]
        reference: PathBuf,

        /// Output path for the table TSV
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Compute corrected pairwise p-values
    Pvalues {
        /// Path to session configuration YAML
        #[arg(short, long)]
        session: PathBuf,

        /// Path to pool table TSV
        #[arg(short, long, required_unless_present = "iso")]
        pool: Option<PathBuf>,

        /// Path to isotopologue table TSV (instead of the pool table)
        #[arg(short, long, conflicts_with = "pool")]
        iso: Option<PathBuf>,

        /// Isotopologue granularity
        #[arg(long, value_enum, default_value = "summed")]
        granularity: CliGranularity,

        /// Path to pathway class reference CSV
        #[arg(short, long)]
        reference: PathBuf,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "tsv")]
        format: OutputFormat,
    },

    /// Derive heatmap cells
    Heatmap {
        /// Path to session configuration YAML
        #[arg(short, long)]
        session: PathBuf,

        /// Path to pool table TSV
        #[arg(short, long, required_unless_present = "iso")]
        pool: Option<PathBuf>,

        /// Path to isotopologue table TSV (bulk heatmap)
        #[arg(short, long, conflicts_with = "pool")]
        iso: Option<PathBuf>,

        /// Path to pathway class reference CSV
        #[arg(short, long)]
        reference: PathBuf,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "tsv")]
        format: OutputFormat,
    },

    /// Compute volcano statistics of condition vs control
    Volcano {
        /// Path to session configuration YAML
        #[arg(short, long)]
        session: PathBuf,

        /// Path to pool table TSV
        #[arg(short, long)]
        pool: PathBuf,

        /// Path to pathway class reference CSV
        #[arg(short, long)]
        reference: PathBuf,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "tsv")]
        format: OutputFormat,
    },

    /// Regress compounds on an external variable
    Lingress {
        /// Path to session configuration YAML
        #[arg(short, long)]
        session: PathBuf,

        /// Path to pool table TSV
        #[arg(short, long)]
        pool: PathBuf,

        /// Path to external variable table TSV
        #[arg(long)]
        variables: PathBuf,

        /// Path to pathway class reference CSV
        #[arg(short, long)]
        reference: PathBuf,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "tsv")]
        format: OutputFormat,
    },

    /// List significantly different group pairs per compound (JSON)
    Significance {
        /// Path to session configuration YAML
        #[arg(short, long)]
        session: PathBuf,

        /// Path to pool table TSV
        #[arg(short, long)]
        pool: PathBuf,

        /// Path to pathway class reference CSV
        #[arg(short, long)]
        reference: PathBuf,

        /// Output path for JSON
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Run every analysis the session and inputs allow
    Run {
        /// Path to session configuration YAML
        #[arg(short, long)]
        session: PathBuf,

        /// Path to pool table TSV
        #[arg(short, long)]
        pool: PathBuf,

        /// Path to isotopologue table TSV
        #[arg(short, long)]
        iso: Option<PathBuf>,

        /// Path to external variable table TSV
        #[arg(long)]
        variables: Option<PathBuf>,

        /// Path to pathway class reference CSV
        #[arg(short, long)]
        reference: PathBuf,

        /// Output directory
        #[arg(short, long)]
        outdir: PathBuf,
    },

    /// Generate an example session configuration
    ExampleConfig {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "session.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Normalize {
            session,
            pool,
            reference,
            output,
        } => cmd_normalize(&session, &pool, &reference, &output),

        Commands::Pvalues {
            session,
            pool,
            iso,
            granularity,
            reference,
            output,
            format,
        } => cmd_pvalues(
            &session,
            pool.as_deref(),
            iso.as_deref(),
            granularity.into(),
            &reference,
            &output,
            format,
        ),

        Commands::Heatmap {
            session,
            pool,
            iso,
            reference,
            output,
            format,
        } => cmd_heatmap(
            &session,
            pool.as_deref(),
            iso.as_deref(),
            &reference,
            &output,
            format,
        ),

        Commands::Volcano {
            session,
            pool,
            reference,
            output,
            format,
        } => cmd_volcano(&session, &pool, &reference, &output, format),

        Commands::Lingress {
            session,
            pool,
            variables,
            reference,
            output,
            format,
        } => cmd_lingress(&session, &pool, &variables, &reference, &output, format),

        Commands::Significance {
            session,
            pool,
            reference,
            output,
        } => cmd_significance(&session, &pool, &reference, &output),

        Commands::Run {
            session,
            pool,
            iso,
            variables,
            reference,
            outdir,
        } => cmd_run(
            &session,
            &pool,
            iso.as_deref(),
            variables.as_deref(),
            &reference,
            &outdir,
        ),

        Commands::ExampleConfig { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Load the session, reference and pool table shared by most commands
fn load_inputs(
    session_path: &Path,
    pool_path: &Path,
    reference_path: &Path,
) -> Result<(SessionConfig, MetaboliteTable, ReferenceData)> {
    eprintln!("Loading session from {:?}...", session_path);
    let session = SessionConfig::from_yaml_file(session_path)?;
    let reference = ReferenceData::from_csv(reference_path)?;
    let pool = MetaboliteTable::from_tsv(pool_path)?;
    eprintln!(
        "Loaded {} compounds x {} samples; {} reference entries",
        pool.n_compounds(),
        pool.n_samples(),
        reference.len()
    );
    Ok((session, pool, reference))
}

fn load_iso(path: &Path) -> Result<MetaboliteTable> {
    MetaboliteTable::isotopologue_from_tsv(path)?.ok_or_else(|| {
        MetaboError::EmptyData(format!("{:?} has no isotopologue labels", path))
    })
}

fn load_variables(path: &Path, pool: &MetaboliteTable) -> Result<VariableTable> {
    VariableTable::from_tsv(path, pool.sample_ids())?.ok_or_else(|| {
        MetaboError::InvalidHeader(format!(
            "{:?} columns do not match the pool samples",
            path
        ))
    })
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// Write the normalized download table
fn cmd_normalize(session: &Path, pool: &Path, reference: &Path, output: &Path) -> Result<()> {
    let (session, pool, reference) = load_inputs(session, pool, reference)?;

    eprintln!("Normalizing by {:?}...", session.normalization_compound_names);
    let table = session.normalized_pool_download(&pool, &reference)?;

    eprintln!("Writing table to {:?}...", output);
    table.to_tsv(output)?;
    eprintln!(
        "Done! {} compounds x {} samples",
        table.n_compounds(),
        table.n_samples()
    );
    Ok(())
}

/// Compute the p-value table of pool or isotopologue data
fn cmd_pvalues(
    session_path: &Path,
    pool_path: Option<&Path>,
    iso_path: Option<&Path>,
    granularity: IsoGranularity,
    reference_path: &Path,
    output: &Path,
    format: OutputFormat,
) -> Result<()> {
    let session = SessionConfig::from_yaml_file(session_path)?;
    let reference = ReferenceData::from_csv(reference_path)?;

    let table = match (pool_path, iso_path) {
        (_, Some(iso)) => {
            eprintln!("Testing isotopologue data ({:?})...", granularity);
            session.iso_pvalues(&load_iso(iso)?, &reference, granularity)?
        }
        (Some(pool), None) => {
            eprintln!("Testing pool data...");
            session.pool_pvalues(&MetaboliteTable::from_tsv(pool)?, &reference)?
        }
        (None, None) => {
            return Err(MetaboError::InvalidParameter(
                "Either --pool or --iso is required".to_string(),
            ))
        }
    };

    eprintln!("Writing results to {:?}...", output);
    match format {
        OutputFormat::Tsv => table.to_tsv(output)?,
        OutputFormat::Json => write_json(&table, output)?,
    }
    eprintln!(
        "Done! {} rows x {} comparisons ({})",
        table.len(),
        table.comparisons.len(),
        table.method.name()
    );
    Ok(())
}

/// Derive pool or bulk isotopologue heatmap cells
fn cmd_heatmap(
    session_path: &Path,
    pool_path: Option<&Path>,
    iso_path: Option<&Path>,
    reference_path: &Path,
    output: &Path,
    format: OutputFormat,
) -> Result<()> {
    let session = SessionConfig::from_yaml_file(session_path)?;
    let reference = ReferenceData::from_csv(reference_path)?;

    let heatmap = match (pool_path, iso_path) {
        (_, Some(iso)) => session.iso_heatmap(&load_iso(iso)?, &reference)?,
        (Some(pool), None) => session.pool_heatmap(&MetaboliteTable::from_tsv(pool)?, &reference)?,
        (None, None) => {
            return Err(MetaboError::InvalidParameter(
                "Either --pool or --iso is required".to_string(),
            ))
        }
    };

    eprintln!("Writing heatmap to {:?}...", output);
    match format {
        OutputFormat::Tsv => heatmap.to_tsv(output)?,
        OutputFormat::Json => write_json(&heatmap, output)?,
    }
    eprintln!("Done! {} rows", heatmap.n_rows());
    Ok(())
}

/// Compute volcano points
fn cmd_volcano(
    session: &Path,
    pool: &Path,
    reference: &Path,
    output: &Path,
    format: OutputFormat,
) -> Result<()> {
    let (session, pool, reference) = load_inputs(session, pool, reference)?;

    if let Some(floor) = session.settings.zero_floor {
        eprintln!("Replacing zeros with {} before normalization", floor);
    }
    let set = session.volcano(&pool, &reference)?;

    eprintln!("Writing results to {:?}...", output);
    match format {
        OutputFormat::Tsv => set.to_tsv(output)?,
        OutputFormat::Json => write_json(&set, output)?,
    }
    eprintln!(
        "Done! {} compounds, {} significant ({} vs {})",
        set.len(),
        set.significant().len(),
        set.condition,
        set.control
    );
    Ok(())
}

/// Regress compounds on the session's external variable
fn cmd_lingress(
    session: &Path,
    pool: &Path,
    variables: &Path,
    reference: &Path,
    output: &Path,
    format: OutputFormat,
) -> Result<()> {
    let (session, pool, reference) = load_inputs(session, pool, reference)?;
    let variables = load_variables(variables, &pool)?;

    let set = session.lingress(&pool, &variables, &reference)?;

    eprintln!("Writing results to {:?}...", output);
    match format {
        OutputFormat::Tsv => set.to_tsv(output)?,
        OutputFormat::Json => write_json(&set, output)?,
    }
    let n_fitted = set.records.iter().filter(|r| r.fit().is_some()).count();
    eprintln!("Done! {} of {} compounds fitted", n_fitted, set.len());
    Ok(())
}

/// Write significant group pairs as JSON
fn cmd_significance(session: &Path, pool: &Path, reference: &Path, output: &Path) -> Result<()> {
    let (session, pool, reference) = load_inputs(session, pool, reference)?;

    let significance = session.group_significance(&pool, &reference)?;
    write_json(&significance, output)?;
    eprintln!(
        "Done! {} compounds with at least one significant pair",
        significance.len()
    );
    Ok(())
}

/// Run every analysis into an output directory
fn cmd_run(
    session_path: &Path,
    pool_path: &Path,
    iso_path: Option<&Path>,
    variables_path: Option<&Path>,
    reference_path: &Path,
    outdir: &Path,
) -> Result<()> {
    let (session, pool, reference) = load_inputs(session_path, pool_path, reference_path)?;
    fs::create_dir_all(outdir)?;

    eprintln!("Running session '{}'...", session.name);
    session
        .normalized_pool_download(&pool, &reference)?
        .to_tsv(outdir.join("normalized_pool.tsv"))?;
    session
        .pool_pvalues(&pool, &reference)?
        .to_tsv(outdir.join("pool_pvalues.tsv"))?;
    write_json(
        &session.group_significance(&pool, &reference)?,
        &outdir.join("significance.json"),
    )?;

    if session.control_group.is_some() {
        session
            .pool_heatmap(&pool, &reference)?
            .to_tsv(outdir.join("pool_heatmap.tsv"))?;
        if session.condition_group.is_some() {
            session
                .volcano(&pool, &reference)?
                .to_tsv(outdir.join("volcano.tsv"))?;
        }
    } else {
        eprintln!("  No control group; skipping heatmap and volcano");
    }

    if let Some(iso_path) = iso_path {
        match MetaboliteTable::isotopologue_from_tsv(iso_path)? {
            Some(iso) => {
                session
                    .iso_pvalues(&iso, &reference, IsoGranularity::Summed)?
                    .to_tsv(outdir.join("iso_pvalues_summed.tsv"))?;
                session
                    .iso_pvalues(&iso, &reference, IsoGranularity::PerLabel)?
                    .to_tsv(outdir.join("iso_pvalues_per_label.tsv"))?;
                session
                    .iso_heatmap(&iso, &reference)?
                    .to_tsv(outdir.join("iso_heatmap.tsv"))?;
            }
            None => eprintln!("  Isotopologue table has no labels; skipping"),
        }
    }

    if let (Some(path), Some(_)) = (variables_path, &session.external_variable) {
        match VariableTable::from_tsv(path, pool.sample_ids())? {
            Some(variables) => {
                session
                    .lingress(&pool, &variables, &reference)?
                    .to_tsv(outdir.join("lingress.tsv"))?;
            }
            None => eprintln!("  Variable table does not match the pool samples; skipping"),
        }
    }

    eprintln!("Done! Results written to {:?}", outdir);
    Ok(())
}

/// Generate an example session configuration
fn cmd_example(output: &Path) -> Result<()> {
    let yaml = SessionConfig::example().to_yaml()?;
    fs::write(output, yaml)?;
    eprintln!("Example session written to {:?}", output);
    Ok(())
}
