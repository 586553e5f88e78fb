//! Argument parsing and command execution for the xtalk CLI.

use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use thiserror::Error;
use tracing::{info, instrument};

use xtalk_core::{
    Analysis, AnalysisBuilder, AnalysisReport, CoreError, CountingMode, Graph, GroupLoadSummary,
    Method,
};
use xtalk_providers_groups::{GroupFileError, read_groups};
use xtalk_providers_network::{NetworkFileError, read_network, write_tsv};

use crate::report::{self, RunParameters, RunTallies};

/// Assess crosstalk enrichment between gene groups in an interaction
/// network.
///
/// The network is randomised into an ensemble of degree-preserving
/// replicas; for every pair of groups the observed inter-group link
/// count is compared against the ensemble, yielding a z-score, a
/// two-sided p-value, and an FDR-adjusted p-value.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "xtalk",
    version,
    group(clap::ArgGroup::new("groupings").required(true).args(["group", "group_a"]))
)]
pub struct Cli {
    /// Path to the network file (XGMML or TSV, auto-detected).
    #[arg(short = 'n', long = "network", value_name = "PATH")]
    pub network: PathBuf,

    /// Path to a group file; all group pairs within it are compared.
    #[arg(
        short = 'g',
        long = "group",
        value_name = "PATH",
        conflicts_with_all = ["group_a", "group_b"]
    )]
    pub group: Option<PathBuf>,

    /// Path to group file A; pairs are compared across A and B.
    #[arg(short = 'a', long = "group-a", value_name = "PATH", requires = "group_b")]
    pub group_a: Option<PathBuf>,

    /// Path to group file B; pairs are compared across A and B.
    #[arg(short = 'b', long = "group-b", value_name = "PATH", requires = "group_a")]
    pub group_b: Option<PathBuf>,

    /// Lowest link weight to keep; links below it are dropped on load.
    #[arg(short = 'c', long = "cutoff", value_name = "FLOAT")]
    pub cutoff: Option<f64>,

    /// Randomisation method: 0 link permutation, 1 link assignment,
    /// 2 link assignment with second-order preservation, 3 label
    /// permutation.
    #[arg(
        short = 'd',
        long = "method",
        value_name = "0-3",
        default_value_t = 2,
        value_parser = clap::value_parser!(u8).range(0..=3)
    )]
    pub method: u8,

    /// Number of network randomisations.
    #[arg(short = 'i', long = "iterations", value_name = "INT", default_value_t = 100)]
    pub iterations: usize,

    /// Counting mode: 0 skips a link when either gene is in both groups,
    /// 1 only when both genes are.
    #[arg(
        short = 'm',
        long = "mode",
        value_name = "0|1",
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..=1)
    )]
    pub mode: u8,

    /// Results file; the info file gets the same name plus `.info`.
    /// Defaults to a timestamped pair of files.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also compute the hypergeometric probability of each pair's member
    /// overlap.
    #[arg(
        short = 'p',
        long = "phyper",
        value_name = "BOOL",
        default_value_t = false,
        action = clap::ArgAction::Set,
        value_parser = clap::value_parser!(bool)
    )]
    pub phyper: bool,

    /// Randomise the network once, write it as TSV, and exit.
    #[arg(short = 'w', long = "write-graph", value_name = "PATH")]
    pub write_graph: Option<PathBuf>,

    /// Minimum number of in-network genes a group needs to be analysed.
    #[arg(short = 'x', long = "min-genes", value_name = "INT", default_value_t = 10)]
    pub min_genes: usize,

    /// Seed for the pseudo-random source; fixed seeds reproduce runs
    /// exactly.
    #[arg(long = "seed", value_name = "INT")]
    pub seed: Option<u64>,
}

/// Errors surfaced while executing the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Writing a report file failed.
    #[error("failed to write `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Network ingestion failed.
    #[error(transparent)]
    Network(#[from] NetworkFileError),
    /// Group ingestion failed.
    #[error(transparent)]
    Groups(#[from] GroupFileError),
    /// Core analysis failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub enum ExecutionSummary {
    /// A full analysis ran and both report files were written.
    Analysis {
        /// Results TSV path.
        results_path: PathBuf,
        /// Info file path.
        info_path: PathBuf,
        /// Group pairs reported.
        pairs: usize,
        /// Replicas that were counted.
        replicas_counted: usize,
        /// Replicas discarded after failed repair.
        replicas_discarded: usize,
    },
    /// A single randomised graph was written.
    RandomGraph {
        /// Output path of the randomised graph.
        path: PathBuf,
    },
}

/// Renders the run summary for stdout.
///
/// # Errors
/// Propagates any I/O failure while writing.
pub fn render_summary(summary: &ExecutionSummary, writer: &mut impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Analysis {
            results_path,
            info_path,
            pairs,
            replicas_counted,
            replicas_discarded,
        } => {
            writeln!(
                writer,
                "Scored {pairs} group pair(s) over {replicas_counted} replica(s) \
                 ({replicas_discarded} discarded)."
            )?;
            writeln!(writer, "Results written to {}", results_path.display())?;
            writeln!(writer, "Run info written to {}", info_path.display())
        }
        ExecutionSummary::RandomGraph { path } => {
            writeln!(writer, "Randomised graph written to {}", path.display())
        }
    }
}

/// Executes the command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when ingestion, analysis, or report writing
/// fails.
#[instrument(name = "cli.run", err, skip(cli), fields(network = %cli.network.display()))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let network = read_network(&cli.network, cli.cutoff)?;

    // Flag ranges are enforced by clap; the defaults only guard against
    // future surface changes.
    let method = Method::from_code(cli.method).unwrap_or(Method::AssignmentSecondOrder);
    let mode = CountingMode::from_code(cli.mode).unwrap_or(CountingMode::SkipEither);

    let mut builder = AnalysisBuilder::new()
        .with_method(method)
        .with_iterations(cli.iterations)
        .with_mode(mode)
        .with_hypergeometric(cli.phyper);
    if let Some(seed) = cli.seed {
        builder = builder.with_seed(seed);
    }
    let analysis = builder.build()?;

    if let Some(path) = &cli.write_graph {
        let replica = analysis.randomize_once(&network)?;
        write_tsv(&replica, path)?;
        info!(path = %path.display(), "randomised graph written");
        return Ok(ExecutionSummary::RandomGraph { path: path.clone() });
    }

    let (results_path, info_path) = output_paths(cli.output.as_deref());
    let (report, group_summaries) = execute_analysis(&cli, &analysis, &network)?;

    report::write_results(&results_path, &report.rows).map_err(|source| CliError::Io {
        path: results_path.clone(),
        source,
    })?;

    let parameters = RunParameters {
        network_path: cli.network.clone(),
        group_path: cli.group.clone(),
        group_a_path: cli.group_a.clone(),
        group_b_path: cli.group_b.clone(),
        results_path: results_path.clone(),
        cutoff: cli.cutoff,
        iterations: cli.iterations,
        mode,
        method,
        min_group_size: cli.min_genes,
        seed: cli.seed,
        hypergeometric: cli.phyper,
    };
    let tallies = RunTallies {
        nodes: network.node_count(),
        links: network.link_count(),
        replicas_counted: report.replicas_counted,
        replicas_discarded: report.replicas_discarded,
    };
    report::write_info(&info_path, &parameters, tallies, &group_summaries).map_err(|source| {
        CliError::Io {
            path: info_path.clone(),
            source,
        }
    })?;

    info!(
        results = %results_path.display(),
        pairs = report.rows.len(),
        "analysis complete"
    );
    Ok(ExecutionSummary::Analysis {
        results_path,
        info_path,
        pairs: report.rows.len(),
        replicas_counted: report.replicas_counted,
        replicas_discarded: report.replicas_discarded,
    })
}

type GroupSummaries = Vec<(String, GroupLoadSummary)>;

fn execute_analysis(
    cli: &Cli,
    analysis: &Analysis,
    network: &Graph,
) -> Result<(AnalysisReport, GroupSummaries), CliError> {
    if let Some(path) = &cli.group {
        let groups = read_groups(path, network, cli.min_genes)?;
        let report = analysis.run_all_pairs(network, &groups)?;
        return Ok((
            report,
            vec![("GROUP STATISTICS".to_owned(), *groups.summary())],
        ));
    }
    match (&cli.group_a, &cli.group_b) {
        (Some(path_a), Some(path_b)) => {
            let groups_a = read_groups(path_a, network, cli.min_genes)?;
            let groups_b = read_groups(path_b, network, cli.min_genes)?;
            let report = analysis.run_between(network, &groups_a, &groups_b)?;
            Ok((
                report,
                vec![
                    ("GROUP A STATISTICS".to_owned(), *groups_a.summary()),
                    ("GROUP B STATISTICS".to_owned(), *groups_b.summary()),
                ],
            ))
        }
        // clap's argument group guarantees one of the branches above.
        _ => Err(CliError::Core(CoreError::NoGroups {
            min_group_size: cli.min_genes,
        })),
    }
}

pub(super) fn output_paths(output: Option<&std::path::Path>) -> (PathBuf, PathBuf) {
    match output {
        Some(path) => {
            let mut info = path.as_os_str().to_owned();
            info.push(".info");
            (path.to_path_buf(), PathBuf::from(info))
        }
        None => {
            let stamp = Local::now().format("%Y%m%d%H%M");
            (
                PathBuf::from(format!("xtalk_{stamp}.tsv")),
                PathBuf::from(format!("xtalk_{stamp}.info")),
            )
        }
    }
}
