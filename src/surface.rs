//! Surface queries over a graph's epidata.

use hashbrown::HashMap;

use crate::model::{AlignmentMarker, Epidatum, Graph, Triple};

/// Target alignments by triple. When a triple carries several, the last
/// one wins.
pub fn alignments(graph: &Graph) -> HashMap<Triple, AlignmentMarker> {
    collect(graph, |e| match e {
        Epidatum::Alignment(a) => Some(a),
        _ => None,
    })
}

/// Role alignments by triple.
pub fn role_alignments(graph: &Graph) -> HashMap<Triple, AlignmentMarker> {
    collect(graph, |e| match e {
        Epidatum::RoleAlignment(a) => Some(a),
        _ => None,
    })
}

fn collect(
    graph: &Graph,
    select: impl Fn(&Epidatum) -> Option<&AlignmentMarker>,
) -> HashMap<Triple, AlignmentMarker> {
    let mut out = HashMap::new();
    for triple in graph.triples() {
        if let Some(marker) = graph.epidata_for(triple).iter().filter_map(&select).last() {
            out.insert(triple.clone(), marker.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignments_by_kind() {
        let g = crate::decode("(c / chase-01~e.3 :ARG0~e.2 (d / dog~e.1) :ARG1 c2)").unwrap();
        let aligned = alignments(&g);
        assert_eq!(aligned.len(), 2);
        assert_eq!(
            aligned.get(&Triple::new("d", "instance", "dog")).map(ToString::to_string).as_deref(),
            Some("~e.1")
        );
        let roles = role_alignments(&g);
        assert_eq!(roles.len(), 1);
        assert_eq!(
            roles.get(&Triple::new("c", "ARG0", "d")),
            Some(&AlignmentMarker::new([2]).with_prefix("e."))
        );
    }

    #[test]
    fn test_last_alignment_wins() {
        let g = Graph::new([("a", "instance", "alpha")]).with_epidata(
            ("a", "instance", "alpha"),
            [
                Epidatum::Alignment(AlignmentMarker::new([1])),
                Epidatum::Alignment(AlignmentMarker::new([2])),
            ],
        );
        assert_eq!(
            alignments(&g).get(&Triple::new("a", "instance", "alpha")),
            Some(&AlignmentMarker::new([2]))
        );
        assert!(role_alignments(&g).is_empty());
    }
}
