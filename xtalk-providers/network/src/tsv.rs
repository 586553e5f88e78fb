//! Tab-separated network parsing: the simple two/three-column layout and
//! the seven-column FunCoup export.

use std::path::Path;

use xtalk_core::Graph;

use crate::errors::NetworkFileError;
use crate::{insert_link, normalise_label};

/// Column positions in a FunCoup export row.
const FUNCOUP_MAX_SCORE: usize = 0;
const FUNCOUP_PROTEIN_1: usize = 5;
const FUNCOUP_PROTEIN_2: usize = 6;
const FUNCOUP_COLUMNS: usize = 7;

/// Token count separating the simple layout from FunCoup: more than
/// three whitespace-split tokens on the first data row means FunCoup.
const SIMPLE_MAX_TOKENS: usize = 3;

pub(crate) fn parse(
    content: &str,
    path: &Path,
    cutoff: Option<f64>,
) -> Result<Graph, NetworkFileError> {
    let Some(first_row) = content.lines().find(|line| !line.trim().is_empty()) else {
        return Err(NetworkFileError::InvalidTsv {
            path: path.to_path_buf(),
            detail: "file contains no rows".to_owned(),
        });
    };
    let tokens = first_row.split_whitespace().count();
    if tokens > SIMPLE_MAX_TOKENS {
        parse_funcoup(content, path, cutoff)
    } else if tokens >= 2 {
        parse_simple(content, path, cutoff)
    } else {
        Err(NetworkFileError::InvalidTsv {
            path: path.to_path_buf(),
            detail: "first row has fewer than two columns".to_owned(),
        })
    }
}

fn parse_simple(
    content: &str,
    path: &Path,
    cutoff: Option<f64>,
) -> Result<Graph, NetworkFileError> {
    let mut graph = Graph::new();
    for (line_number, line) in content.lines().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (first, second, weight) = match tokens.as_slice() {
            [first, second] => (first, second, None),
            [first, second, weight] => (first, second, Some(parse_weight(weight, path, line_number)?)),
            _ => continue,
        };
        // Rows without a weight column always pass the cutoff.
        if let (Some(weight), Some(cutoff)) = (weight, cutoff) {
            if weight < cutoff {
                continue;
            }
        }
        insert(&mut graph, first, second, weight.unwrap_or(1.0), path)?;
    }
    Ok(graph)
}

fn parse_funcoup(
    content: &str,
    path: &Path,
    cutoff: Option<f64>,
) -> Result<Graph, NetworkFileError> {
    let mut graph = Graph::new();
    // The first row of a FunCoup export is a column header.
    for (line_number, line) in content.lines().enumerate().skip(1) {
        let cells: Vec<&str> = line.split('\t').collect();
        if cells.len() < FUNCOUP_COLUMNS {
            continue;
        }
        let weight = parse_weight(cells[FUNCOUP_MAX_SCORE], path, line_number)?;
        if let Some(cutoff) = cutoff {
            if weight < cutoff {
                continue;
            }
        }
        insert(
            &mut graph,
            cells[FUNCOUP_PROTEIN_1],
            cells[FUNCOUP_PROTEIN_2],
            weight,
            path,
        )?;
    }
    Ok(graph)
}

fn insert(
    graph: &mut Graph,
    first: &str,
    second: &str,
    weight: f64,
    path: &Path,
) -> Result<(), NetworkFileError> {
    let first = normalise_label(first);
    let second = normalise_label(second);
    if first.is_empty() || second.is_empty() {
        return Ok(());
    }
    insert_link(graph, &first, &second, weight).map_err(|error| NetworkFileError::InvalidTsv {
        path: path.to_path_buf(),
        detail: error.to_string(),
    })
}

fn parse_weight(raw: &str, path: &Path, line_number: usize) -> Result<f64, NetworkFileError> {
    raw.trim()
        .parse()
        .map_err(|_| NetworkFileError::InvalidTsv {
            path: path.to_path_buf(),
            detail: format!("row {}: `{raw}` is not a link weight", line_number + 1),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NetworkFileErrorCode;

    fn net(content: &str, cutoff: Option<f64>) -> Result<Graph, NetworkFileError> {
        parse(content, Path::new("net.tsv"), cutoff)
    }

    #[test]
    fn two_column_rows_default_their_weight() {
        let graph = net("a\tb\n", None).expect("valid");
        let (_, _, weight) = graph.links().next().expect("one link");
        assert!((weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn three_column_rows_carry_their_weight_through_the_cutoff() {
        let graph = net("a\tb\t0.2\nb\tc\t0.8\n", Some(0.5)).expect("valid");
        assert_eq!(graph.link_count(), 1);
        assert!(graph.node_by_label("A").is_none(), "filtered row adds no nodes");
    }

    #[test]
    fn unweighted_rows_bypass_the_cutoff() {
        let graph = net("a\tb\nb\tc\t0.1\n", Some(0.5)).expect("valid");
        assert_eq!(graph.link_count(), 1);
        assert!(graph.node_by_label("A").is_some());
    }

    #[test]
    fn funcoup_layout_uses_columns_zero_five_and_six() {
        let content = "\
#max_score\tfbc\tppv\tgold\tspecies\tprotein1\tprotein2
0.9\tx\tx\tx\tx\talpha\tbeta
0.3\tx\tx\tx\tx\tbeta\tgamma
";
        let graph = net(content, Some(0.5)).expect("valid");
        assert_eq!(graph.link_count(), 1);
        assert!(graph.node_by_label("ALPHA").is_some());
        assert!(graph.node_by_label("GAMMA").is_none());
    }

    #[test]
    fn short_funcoup_rows_are_skipped() {
        let content = "a\tb\tc\td\te\tf\tg\n0.5\tx\n0.9\tx\tx\tx\tx\tp1\tp2\n";
        let graph = net(content, None).expect("valid");
        assert_eq!(graph.link_count(), 1);
    }

    #[test]
    fn garbage_weights_name_the_row() {
        let err = net("a\tb\tnot-a-number\n", None).expect_err("invalid weight");
        assert_eq!(err.code(), NetworkFileErrorCode::InvalidTsv);
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn duplicate_rows_keep_the_first_weight() {
        let graph = net("a\tb\t0.5\na\tb\t0.9\n", None).expect("valid");
        assert_eq!(graph.link_count(), 1);
        let (_, _, weight) = graph.links().next().expect("one link");
        assert!((weight - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn single_column_first_row_is_rejected() {
        let err = net("lonely\n", None).expect_err("unusable layout");
        assert_eq!(err.code(), NetworkFileErrorCode::InvalidTsv);
    }
}
