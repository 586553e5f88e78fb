//! Network file ingestion for xtalk.
//!
//! Reads interaction networks from XGMML or tab-separated files into the
//! core [`Graph`], applying the optional link-weight cutoff, and writes
//! graphs back out as simple TSV. The format is auto-detected: a file
//! whose first non-whitespace byte is `<` is parsed as XGMML, anything
//! else as TSV, where the first data row's token count separates the
//! FunCoup layout from the simple two/three-column layout.
//!
//! All node labels are uppercased and stripped of trailing whitespace on
//! load, and self-referential rows are skipped.

mod errors;
mod tsv;
mod xgmml;

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use xtalk_core::{Graph, GraphError, NodeId};

pub use errors::{NetworkFileError, NetworkFileErrorCode};

/// Reads a network file, auto-detecting its format.
///
/// With `cutoff` set, links whose weight falls below the cutoff are
/// dropped; rows without a weight column always pass. Nodes that end up
/// without any link are not materialised.
///
/// # Errors
/// Returns [`NetworkFileError::Io`] when the file cannot be read,
/// [`NetworkFileError::InvalidXgmml`] / [`NetworkFileError::InvalidTsv`]
/// for malformed content, and [`NetworkFileError::EmptyNetwork`] when
/// nothing survives parsing and filtering.
pub fn read_network(path: &Path, cutoff: Option<f64>) -> Result<Graph, NetworkFileError> {
    let content = fs::read_to_string(path).map_err(|source| NetworkFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match cutoff {
        Some(cutoff) => info!(path = %path.display(), cutoff, "reading network"),
        None => info!(path = %path.display(), "reading network"),
    }

    let graph = if content.trim_start().starts_with('<') {
        xgmml::parse(&content, path, cutoff)?
    } else {
        tsv::parse(&content, path, cutoff)?
    };

    if graph.node_count() == 0 {
        return Err(NetworkFileError::EmptyNetwork {
            path: path.to_path_buf(),
        });
    }
    info!(
        nodes = graph.node_count(),
        links = graph.link_count(),
        "network loaded"
    );
    Ok(graph)
}

/// Writes the graph as simple TSV, one `label\tlabel\tweight` row per
/// link.
///
/// # Errors
/// Returns [`NetworkFileError::Io`] when the file cannot be written.
pub fn write_tsv(graph: &Graph, path: &Path) -> Result<(), NetworkFileError> {
    let map_io = |source| NetworkFileError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = fs::File::create(path).map_err(map_io)?;
    let mut writer = BufWriter::new(file);
    for (u, v, weight) in graph.links() {
        writeln!(writer, "{}\t{}\t{}", graph.label(u), graph.label(v), weight).map_err(map_io)?;
    }
    writer.flush().map_err(map_io)
}

/// Normalises a raw label: uppercased, trailing whitespace stripped.
pub(crate) fn normalise_label(raw: &str) -> String {
    raw.trim_end().to_uppercase()
}

pub(crate) fn intern(graph: &mut Graph, label: &str) -> Result<NodeId, GraphError> {
    match graph.node_by_label(label) {
        Some(node) => Ok(node),
        None => graph.add_node(label),
    }
}

/// Adds an undirected link between two labels, creating the nodes on
/// first sight. Self-referential rows are skipped and duplicates keep
/// the first weight.
pub(crate) fn insert_link(
    graph: &mut Graph,
    first: &str,
    second: &str,
    weight: f64,
) -> Result<(), GraphError> {
    if first == second {
        debug!(label = first, "skipping self-referential link");
        return Ok(());
    }
    let u = intern(graph, first)?;
    let v = intern(graph, second)?;
    graph.add_link(u, v, weight)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    use tempfile::NamedTempFile;

    fn write_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write fixture");
        file
    }

    #[test]
    fn detects_simple_tsv() {
        let file = write_file("a\tb\nb\tc\n");
        let graph = read_network(file.path(), None).expect("valid simple TSV");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.link_count(), 2);
        assert!(graph.node_by_label("A").is_some(), "labels are uppercased");
    }

    #[test]
    fn detects_xgmml_by_leading_angle_bracket() {
        let file = write_file(concat!(
            "<?xml version=\"1.0\"?>\n",
            "<graph label=\"demo\">\n",
            "  <node id=\"1\" label=\"a\"/>\n",
            "  <node id=\"2\" label=\"b\"/>\n",
            "  <edge source=\"1\" target=\"2\"/>\n",
            "</graph>\n",
        ));
        let graph = read_network(file.path(), None).expect("valid XGMML");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.link_count(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_network(Path::new("/nonexistent/net.tsv"), None).expect_err("no file");
        assert_eq!(err.code(), NetworkFileErrorCode::Io);
    }

    #[test]
    fn fully_filtered_network_is_empty() {
        let file = write_file("a\tb\t0.1\nb\tc\t0.2\n");
        let err = read_network(file.path(), Some(0.9)).expect_err("all links filtered");
        assert_eq!(err.code(), NetworkFileErrorCode::EmptyNetwork);
    }

    #[test]
    fn round_trips_through_the_tsv_writer() {
        let file = write_file("a\tb\t0.5\nb\tc\t0.75\n");
        let graph = read_network(file.path(), None).expect("valid simple TSV");

        let out = NamedTempFile::new().expect("temp file");
        write_tsv(&graph, out.path()).expect("writable");
        let reloaded = read_network(out.path(), None).expect("own output parses");
        assert_eq!(reloaded.node_count(), graph.node_count());
        assert_eq!(reloaded.link_count(), graph.link_count());
    }

    #[test]
    fn self_referential_rows_are_skipped() {
        let file = write_file("a\ta\na\tb\n");
        let graph = read_network(file.path(), None).expect("valid simple TSV");
        assert_eq!(graph.link_count(), 1);
    }
}
