//! Report and info file writers.
//!
//! Every run produces two files: the results TSV with one row per group
//! pair, and an info file echoing the parameters and the load summaries.
//! Real numbers render with six significant digits; statistics that are
//! undefined under a zero-variance null render as the literal `NA`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use xtalk_core::{CountingMode, GroupLoadSummary, Method, PairRow};

/// Everything the info file echoes about a run.
#[derive(Clone, Debug)]
pub struct RunParameters {
    /// Network file path.
    pub network_path: PathBuf,
    /// Single group file, in all-vs-all mode.
    pub group_path: Option<PathBuf>,
    /// First group file, in A-vs-B mode.
    pub group_a_path: Option<PathBuf>,
    /// Second group file, in A-vs-B mode.
    pub group_b_path: Option<PathBuf>,
    /// Results file path.
    pub results_path: PathBuf,
    /// Link weight cutoff, when one was applied.
    pub cutoff: Option<f64>,
    /// Number of replicas requested.
    pub iterations: usize,
    /// Shared-member counting mode.
    pub mode: CountingMode,
    /// Randomisation method.
    pub method: Method,
    /// Minimum in-network members per group.
    pub min_group_size: usize,
    /// PRNG seed, when fixed by the user.
    pub seed: Option<u64>,
    /// Whether the hypergeometric overlap test ran.
    pub hypergeometric: bool,
}

/// Network and replica tallies for the info file.
#[derive(Clone, Copy, Debug)]
pub struct RunTallies {
    /// Nodes in the loaded network.
    pub nodes: usize,
    /// Links in the loaded network.
    pub links: usize,
    /// Replicas that passed validation and were counted.
    pub replicas_counted: usize,
    /// Replicas discarded after failed repair.
    pub replicas_discarded: usize,
}

/// Writes the results TSV.
///
/// # Errors
/// Propagates any I/O failure while writing.
pub fn write_results(path: &Path, rows: &[PairRow]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(
        writer,
        "PAIR\ttype1 type2\tintra|inter\tobserved\texpected\tz\tp\tfdr\tstd\treduced_chi_sqr\tp_hyper"
    )?;
    for row in rows {
        writeln!(
            writer,
            "{}\t{} {}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.pair,
            row.systems.0,
            row.systems.1,
            row.kind.label(),
            format_real(row.stats.observed),
            format_real(row.stats.expected),
            format_optional(row.stats.z_score),
            format_optional(row.stats.p_value),
            format_optional(row.stats.fdr),
            format_optional(row.stats.std_dev),
            format_optional(row.stats.chi_sqr),
            format_optional(row.stats.p_hyper),
        )?;
    }
    writer.flush()
}

/// Writes the info file.
///
/// # Errors
/// Propagates any I/O failure while writing.
pub fn write_info(
    path: &Path,
    parameters: &RunParameters,
    tallies: RunTallies,
    group_summaries: &[(String, GroupLoadSummary)],
) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    writeln!(
        writer,
        "xtalk version {}\nUsing the following parameters:\n",
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(writer, "Network file:\t\t\t{}", parameters.network_path.display())?;
    if let Some(path) = &parameters.group_path {
        writeln!(writer, "Group file:\t\t\t{}", path.display())?;
    }
    if let Some(path) = &parameters.group_a_path {
        writeln!(writer, "Group A file:\t\t\t{}", path.display())?;
    }
    if let Some(path) = &parameters.group_b_path {
        writeln!(writer, "Group B file:\t\t\t{}", path.display())?;
    }
    writeln!(writer, "Result file:\t\t\t{}", parameters.results_path.display())?;
    match parameters.cutoff {
        Some(cutoff) => writeln!(writer, "Link cutoff:\t\t\t{}", format_real(cutoff))?,
        None => writeln!(writer, "Link cutoff:\t\t\tnone")?,
    }
    writeln!(writer, "Iterations:\t\t\t{}", parameters.iterations)?;
    writeln!(writer, "Link counting mode:\t\t{}", parameters.mode.code())?;
    writeln!(writer, "Randomization method:\t\t{}", parameters.method.label())?;
    writeln!(writer, "Minimum genes for group:\t{}", parameters.min_group_size)?;
    match parameters.seed {
        Some(seed) => writeln!(writer, "PRNG seed:\t\t\t{seed}")?,
        None => writeln!(writer, "PRNG seed:\t\t\tfrom entropy")?,
    }
    writeln!(
        writer,
        "Hypergeometric test:\t\t{}",
        if parameters.hypergeometric { "on" } else { "off" }
    )?;

    writeln!(writer, "\n----NETWORK STATISTICS----")?;
    writeln!(writer, "Final number of unique nodes in the network: {}", tallies.nodes)?;
    writeln!(writer, "Final number of links in the network: {}", tallies.links)?;
    writeln!(writer, "Replicas counted: {}", tallies.replicas_counted)?;
    writeln!(writer, "Replicas discarded: {}", tallies.replicas_discarded)?;

    for (title, summary) in group_summaries {
        writeln!(writer, "\n----{title}----")?;
        writeln!(writer, "Total number of groups input: {}", summary.total_groups)?;
        writeln!(
            writer,
            "Total number of unique genes in the set of groups: {}",
            summary.unique_genes
        )?;
        writeln!(
            writer,
            "Number of groups with at least {} gene members (final number of groups): {}",
            parameters.min_group_size, summary.retained_groups
        )?;
        writeln!(
            writer,
            "Number of unique group genes not found in the network: {}",
            summary.genes_not_in_network
        )?;
        writeln!(
            writer,
            "Number of unique genes in the set of groups and in the network: {}",
            summary.genes_in_network
        )?;
    }
    writer.flush()
}

/// Formats a real with six significant digits, `%g`-style: fixed point
/// in the middle magnitudes, scientific notation outside, trailing
/// zeros trimmed.
pub fn format_real(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_owned();
    }
    let magnitude = value.abs().log10().floor() as i32;
    if (-4..6).contains(&magnitude) {
        let decimals = (5 - magnitude).max(0) as usize;
        let formatted = format!("{value:.decimals$}");
        formatted.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        let formatted = format!("{value:.5e}");
        match formatted.split_once('e') {
            Some((mantissa, exponent)) => format!(
                "{}e{exponent}",
                mantissa.trim_end_matches('0').trim_end_matches('.')
            ),
            None => formatted,
        }
    }
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "NA".to_owned(), format_real)
}
