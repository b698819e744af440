//! Topic evolution graph reconstruction

use serde::Serialize;

use crate::domain::comparison::{ComparisonSide, EvolutionEdge};

/// Edges below this value are not part of an evolution graph
pub const EVOLUTION_EDGE_FLOOR: f64 = 0.1;

/// A topic of one model as drawn in the graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicNode {
    pub topic: u32,
    #[serde(rename = "modelName")]
    pub model_name: String,
    pub highlight: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Association {
    pub child: TopicNode,
    /// Comparison value of the edge
    pub label: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentNode {
    #[serde(flatten)]
    pub node: TopicNode,
    pub associations: Vec<Association>,
}

/// Full answer of an evolution query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicEvolution {
    pub model: String,
    pub topic: u32,
    pub model0_description: String,
    pub model1_description: String,
    pub parents: Vec<ParentNode>,
}

/// Builds the one-level parent/child graph around `topic_index`.
///
/// `side` is where the queried model sits in the comparison. On the "from"
/// side the requested topic is the only parent; on the "to" side every linked
/// "from" topic becomes a parent of the requested topic. Without any edge
/// at or above the floor the requested topic stands alone.
pub fn build_evolution_graph(
    side: ComparisonSide,
    topic_index: u32,
    model_from: &str,
    model_to: &str,
    edges: &[EvolutionEdge],
) -> Vec<ParentNode> {
    let requested = |model_name: &str| TopicNode {
        topic: topic_index,
        model_name: model_name.to_string(),
        highlight: true,
    };

    let mut kept: Vec<&EvolutionEdge> = edges
        .iter()
        .filter(|edge| edge.value >= EVOLUTION_EDGE_FLOOR)
        .filter(|edge| match side {
            ComparisonSide::From => edge.from_index == topic_index,
            ComparisonSide::To => edge.to_index == topic_index,
        })
        .collect();

    match side {
        ComparisonSide::From => {
            kept.sort_by_key(|edge| edge.to_index);

            let associations = kept
                .into_iter()
                .map(|edge| Association {
                    child: TopicNode {
                        topic: edge.to_index,
                        model_name: model_to.to_string(),
                        highlight: false,
                    },
                    label: edge.value,
                })
                .collect();

            vec![ParentNode {
                node: requested(model_from),
                associations,
            }]
        }
        ComparisonSide::To => {
            if kept.is_empty() {
                return vec![ParentNode {
                    node: requested(model_to),
                    associations: Vec::new(),
                }];
            }

            kept.sort_by_key(|edge| edge.from_index);

            kept.into_iter()
                .map(|edge| ParentNode {
                    node: TopicNode {
                        topic: edge.from_index,
                        model_name: model_from.to_string(),
                        highlight: false,
                    },
                    associations: vec![Association {
                        child: requested(model_to),
                        label: edge.value,
                    }],
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from_index: u32, to_index: u32, value: f64) -> EvolutionEdge {
        EvolutionEdge {
            from_index,
            to_index,
            value,
        }
    }

    fn edges() -> Vec<EvolutionEdge> {
        vec![
            edge(0, 2, 0.35),
            edge(0, 0, 0.8),
            edge(0, 1, 0.05),
            edge(1, 0, 0.1),
            edge(2, 0, 0.09),
        ]
    }

    #[test]
    fn test_from_side_single_root_with_children() {
        let parents = build_evolution_graph(ComparisonSide::From, 0, "lda-a", "lda-b", &edges());

        assert_eq!(parents.len(), 1);
        let root = &parents[0];
        assert_eq!(root.node.topic, 0);
        assert_eq!(root.node.model_name, "lda-a");
        assert!(root.node.highlight);

        let children: Vec<(u32, f64)> = root
            .associations
            .iter()
            .map(|a| (a.child.topic, a.label))
            .collect();
        assert_eq!(children, vec![(0, 0.8), (2, 0.35)]);
        assert!(root.associations.iter().all(|a| !a.child.highlight));
        assert!(root.associations.iter().all(|a| a.child.model_name == "lda-b"));
    }

    #[test]
    fn test_to_side_inverts_graph() {
        let parents = build_evolution_graph(ComparisonSide::To, 0, "lda-a", "lda-b", &edges());

        let roots: Vec<u32> = parents.iter().map(|p| p.node.topic).collect();
        assert_eq!(roots, vec![0, 1]);

        for parent in &parents {
            assert!(!parent.node.highlight);
            assert_eq!(parent.node.model_name, "lda-a");
            assert_eq!(parent.associations.len(), 1);

            let child = &parent.associations[0].child;
            assert_eq!(child.topic, 0);
            assert_eq!(child.model_name, "lda-b");
            assert!(child.highlight);
        }
        assert_eq!(parents[1].associations[0].label, 0.1);
    }

    #[test]
    fn test_no_edges_leaves_lonely_root() {
        let from = build_evolution_graph(ComparisonSide::From, 1, "lda-a", "lda-b", &edges());
        assert_eq!(from.len(), 1);
        assert!(from[0].node.highlight);
        assert!(from[0].associations.is_empty());

        let to = build_evolution_graph(ComparisonSide::To, 1, "lda-a", "lda-b", &edges());
        assert_eq!(to.len(), 1);
        assert_eq!(to[0].node.model_name, "lda-b");
        assert!(to[0].node.highlight);
        assert!(to[0].associations.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let parents =
            build_evolution_graph(ComparisonSide::From, 1, "lda-a", "lda-b", &[edge(1, 3, 0.5)]);

        assert_eq!(
            serde_json::to_value(&parents).unwrap(),
            serde_json::json!([{
                "topic": 1,
                "modelName": "lda-a",
                "highlight": true,
                "associations": [{
                    "child": {"topic": 3, "modelName": "lda-b", "highlight": false},
                    "label": 0.5
                }]
            }])
        );
    }
}
