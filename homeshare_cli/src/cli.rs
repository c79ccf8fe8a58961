use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{command, Args, Parser, Subcommand};
use enum_dispatch::enum_dispatch;
use homeshare::config::Config;
use homeshare::formatters::{CSVFormatter, OutputFormatter, OutputGenerator};
use homeshare::microdata::{area_name, load_areas};
use homeshare::Homeshare;
use log::{debug, info};
use polars::frame::DataFrame;
use serde::{Deserialize, Serialize};
use spinners::{Spinner, Spinners};
use strum_macros::EnumString;

use crate::display::{display_study_areas, display_table_summary};
use crate::error::HomeshareCliResult;

const DEFAULT_PROGRESS_SPINNER: Spinners = Spinners::Dots;
const COMPLETE_PROGRESS_STRING: &str = "✔";
const RUNNING_TAIL_STRING: &str = "...";
const LOADING_STRING: &str = "Loading microdata";
const ESTIMATING_STRING: &str = "Computing supply estimates";

/// Defines the output formats we are able to produce data in.
#[derive(Clone, Debug, Deserialize, Serialize, EnumString, PartialEq, Eq)]
#[strum(ascii_case_insensitive)]
pub enum OutputFormat {
    Csv,
    Stdout,
}

impl From<&OutputFormat> for OutputFormatter {
    fn from(value: &OutputFormat) -> Self {
        match value {
            OutputFormat::Csv => OutputFormatter::Csv(CSVFormatter),
            OutputFormat::Stdout => OutputFormatter::Csv(CSVFormatter),
        }
    }
}

fn write_output<T, U>(
    output_generator: &T,
    mut data: DataFrame,
    output_file: Option<U>,
) -> HomeshareCliResult<()>
where
    T: OutputGenerator,
    U: AsRef<Path>,
{
    if let Some(output_file) = output_file {
        let mut f = File::create(output_file).context("Failed to write output")?;
        output_generator.save(&mut f, &mut data)?;
    } else {
        let mut stdout_lock = std::io::stdout().lock();
        output_generator.save(&mut stdout_lock, &mut data)?;
    };
    Ok(())
}

/// Trait that defines what to run when a given subcommand is invoked.
#[enum_dispatch]
pub trait RunCommand {
    fn run(&self, config: Config) -> HomeshareCliResult<()>;
}

/// The `tabulate` command runs the full pipeline: load the household sample
/// and geography lookup, estimate every subset for every study area, and
/// write the six supply tables.
#[derive(Args, Debug)]
pub struct TabulateCommand {
    #[arg(long, help = "Path of the PUMS housing-file CSV")]
    households: PathBuf,
    #[arg(long, help = "Path of the PUMA code/name lookup CSV")]
    areas: PathBuf,
    #[arg(
        short = 'f',
        long,
        value_name = "csv|stdout",
        default_value = "csv",
        help = "Output format for the results"
    )]
    output_format: OutputFormat,
    #[arg(
        short = 'o',
        long,
        help = "Directory to place the six result tables (csv format only)"
    )]
    output_dir: Option<PathBuf>,
    #[arg(long, help = "Print a summary of each table after tabulation")]
    summary: bool,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for TabulateCommand {
    fn run(&self, config: Config) -> HomeshareCliResult<()> {
        info!("Running `tabulate` subcommand");
        let sp = (!self.quiet).then(|| {
            Spinner::with_timer(
                DEFAULT_PROGRESS_SPINNER,
                LOADING_STRING.to_string() + RUNNING_TAIL_STRING,
            )
        });
        let homeshare = Homeshare::new_with_config(&self.households, &self.areas, config)?;
        if let Some(mut s) = sp {
            s.stop_with_symbol(COMPLETE_PROGRESS_STRING);
        }

        let sp = (!self.quiet).then(|| {
            Spinner::with_timer(
                DEFAULT_PROGRESS_SPINNER,
                ESTIMATING_STRING.to_string() + RUNNING_TAIL_STRING,
            )
        });
        let tables = homeshare.tabulate()?;
        if let Some(mut s) = sp {
            s.stop_with_symbol(COMPLETE_PROGRESS_STRING);
        }

        let formatter: OutputFormatter = (&self.output_format).into();
        for (grouping, table) in tables {
            debug!("{table:#?}");
            let output_file = match self.output_format {
                OutputFormat::Stdout => None,
                OutputFormat::Csv => {
                    let dir = self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
                    std::fs::create_dir_all(&dir)?;
                    Some(dir.join(format!("{}.csv", grouping.file_stem())))
                }
            };
            if let Some(path) = output_file.as_ref() {
                info!("Writing {}", path.display());
            }
            if self.summary {
                display_table_summary(&grouping, &table)?;
            }
            write_output(&formatter, table, output_file)?;
        }
        Ok(())
    }
}

/// The `areas` command lists the configured study areas with their display
/// names from the geography lookup.
#[derive(Args, Debug)]
pub struct AreasCommand {
    #[arg(long, help = "Path of the PUMA code/name lookup CSV")]
    areas: PathBuf,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for AreasCommand {
    fn run(&self, config: Config) -> HomeshareCliResult<()> {
        info!("Running `areas` subcommand");
        let areas = load_areas(&self.areas)?;
        let named = config
            .study_areas
            .iter()
            .map(|&code| Ok((code, area_name(&areas, code)?)))
            .collect::<HomeshareCliResult<Vec<_>>>()?;
        display_study_areas(&named);
        Ok(())
    }
}

/// The entrypoint for the CLI.
#[derive(Parser, Debug)]
#[command(version, about="Homeshare tabulates survey-weighted housing-supply estimates from PUMS microdata.", long_about = None, name="homeshare")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    #[arg(
        short = 'q',
        long = "quiet",
        help = "\
            Do not print progress spinner to stdout. Results and logs (when `RUST_LOG`\n\
            is set) will still be printed.",
        global = true
    )]
    quiet: bool,
}

/// Commands contains the list of subcommands avaliable for use in the CLI.
/// Each command should implmement the RunCommand trait and specify the list
/// of required args for that command.
#[derive(Subcommand, Debug)]
#[enum_dispatch(RunCommand)]
pub enum Commands {
    /// Tabulate the six housing-supply tables from a PUMS housing file
    Tabulate(TabulateCommand),
    /// List the configured study areas
    Areas(AreasCommand),
}
