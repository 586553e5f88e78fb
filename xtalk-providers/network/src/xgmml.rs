//! XGMML network parsing.
//!
//! Reads the `node` and `edge` children of the root `graph` element.
//! Nodes carry `id` and `label` attributes; edges reference node ids via
//! `source` and `target` and may carry a `weight`. Nodes left without
//! any link after weight filtering are never materialised, which
//! implements the zero-degree prune the XGMML path requires.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use xtalk_core::Graph;

use crate::errors::NetworkFileError;
use crate::{insert_link, normalise_label};

struct PendingEdge {
    source: String,
    target: String,
    weight: Option<f64>,
}

pub(crate) fn parse(
    content: &str,
    path: &Path,
    cutoff: Option<f64>,
) -> Result<Graph, NetworkFileError> {
    let invalid = |detail: String| NetworkFileError::InvalidXgmml {
        path: path.to_path_buf(),
        detail,
    };

    let mut reader = Reader::from_str(content);
    let mut labels: HashMap<String, String> = HashMap::new();
    let mut edges: Vec<PendingEdge> = Vec::new();
    let mut saw_graph = false;

    loop {
        match reader.read_event() {
            Err(error) => return Err(invalid(error.to_string())),
            Ok(Event::Eof) => break,
            Ok(Event::Start(element) | Event::Empty(element)) => {
                match element.name().as_ref() {
                    b"graph" => saw_graph = true,
                    b"node" => {
                        let id = require_attr(&element, "id", path)?;
                        let label = require_attr(&element, "label", path)?;
                        labels.entry(id).or_insert_with(|| normalise_label(&label));
                    }
                    b"edge" => {
                        let weight = match find_attr(&element, "weight", path)? {
                            Some(raw) => Some(raw.trim().parse().map_err(|_| {
                                invalid(format!("`{raw}` is not an edge weight"))
                            })?),
                            None => None,
                        };
                        edges.push(PendingEdge {
                            source: require_attr(&element, "source", path)?,
                            target: require_attr(&element, "target", path)?,
                            weight,
                        });
                    }
                    _ => {}
                }
            }
            Ok(_) => {}
        }
    }

    if !saw_graph {
        return Err(invalid("missing <graph> root element".to_owned()));
    }

    let mut graph = Graph::new();
    for edge in edges {
        if let (Some(weight), Some(cutoff)) = (edge.weight, cutoff) {
            if weight < cutoff {
                continue;
            }
        }
        let source = labels
            .get(&edge.source)
            .ok_or_else(|| invalid(format!("edge references unknown node id `{}`", edge.source)))?;
        let target = labels
            .get(&edge.target)
            .ok_or_else(|| invalid(format!("edge references unknown node id `{}`", edge.target)))?;
        insert_link(&mut graph, source, target, edge.weight.unwrap_or(0.0))
            .map_err(|error| invalid(error.to_string()))?;
    }
    Ok(graph)
}

fn find_attr(
    element: &BytesStart<'_>,
    name: &str,
    path: &Path,
) -> Result<Option<String>, NetworkFileError> {
    let invalid = |detail: String| NetworkFileError::InvalidXgmml {
        path: path.to_path_buf(),
        detail,
    };
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|error| invalid(error.to_string()))?;
        if attribute.key.as_ref() == name.as_bytes() {
            let value = attribute
                .unescape_value()
                .map_err(|error| invalid(error.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn require_attr(
    element: &BytesStart<'_>,
    name: &str,
    path: &Path,
) -> Result<String, NetworkFileError> {
    find_attr(element, name, path)?.ok_or_else(|| NetworkFileError::InvalidXgmml {
        path: path.to_path_buf(),
        detail: format!(
            "<{}> is missing the `{name}` attribute",
            String::from_utf8_lossy(element.name().as_ref())
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NetworkFileErrorCode;

    fn net(content: &str, cutoff: Option<f64>) -> Result<Graph, NetworkFileError> {
        parse(content, Path::new("net.xgmml"), cutoff)
    }

    const DOC: &str = concat!(
        "<graph label=\"demo\" directed=\"0\">\n",
        "  <node id=\"1\" label=\"tp53\"/>\n",
        "  <node id=\"2\" label=\"mdm2\"/>\n",
        "  <node id=\"3\" label=\"egfr\"/>\n",
        "  <node id=\"4\" label=\"lonely\"/>\n",
        "  <edge source=\"1\" target=\"2\" weight=\"0.9\"/>\n",
        "  <edge source=\"2\" target=\"3\" weight=\"0.2\"/>\n",
        "</graph>\n",
    );

    #[test]
    fn parses_nodes_and_edges_with_uppercased_labels() {
        let graph = net(DOC, None).expect("valid XGMML");
        assert_eq!(graph.link_count(), 2);
        assert!(graph.node_by_label("TP53").is_some());
        assert!(graph.node_by_label("MDM2").is_some());
    }

    #[test]
    fn prunes_nodes_without_links() {
        let graph = net(DOC, None).expect("valid XGMML");
        assert!(graph.node_by_label("LONELY").is_none());
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn cutoff_filters_weighted_edges_and_their_orphans() {
        let graph = net(DOC, Some(0.5)).expect("valid XGMML");
        assert_eq!(graph.link_count(), 1);
        assert!(graph.node_by_label("EGFR").is_none());
    }

    #[test]
    fn unweighted_edges_bypass_the_cutoff() {
        let doc = concat!(
            "<graph>\n",
            "  <node id=\"1\" label=\"a\"/>\n",
            "  <node id=\"2\" label=\"b\"/>\n",
            "  <edge source=\"1\" target=\"2\"/>\n",
            "</graph>\n",
        );
        let graph = net(doc, Some(0.5)).expect("valid XGMML");
        assert_eq!(graph.link_count(), 1);
    }

    #[test]
    fn missing_graph_root_is_rejected() {
        let err = net("<network/>", None).expect_err("not XGMML");
        assert_eq!(err.code(), NetworkFileErrorCode::InvalidXgmml);
    }

    #[test]
    fn dangling_edge_references_are_rejected() {
        let doc = concat!(
            "<graph>\n",
            "  <node id=\"1\" label=\"a\"/>\n",
            "  <edge source=\"1\" target=\"99\"/>\n",
            "</graph>\n",
        );
        let err = net(doc, None).expect_err("unknown node id");
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn missing_required_attributes_are_rejected() {
        let doc = "<graph><node id=\"1\"/></graph>";
        let err = net(doc, None).expect_err("node without label");
        assert!(err.to_string().contains("label"));
    }
}
