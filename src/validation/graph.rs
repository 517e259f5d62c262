//! Service dependency graph
//!
//! Arena of service nodes indexed by name, with edges taken from each
//! service's `depends_on`. Cycle search is a three-colour depth-first
//! traversal restarted from every node with fresh state, so one cycle can
//! be reported from several entry points.

use std::collections::HashMap;

use crate::parser::Value;

/// Traversal state of a node within one search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Unvisited,
    OnStack,
    Closed,
}

/// Directed "depends on" graph between defined services
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    names: Vec<String>,
    edges: Vec<Vec<usize>>,
}

/// An edge that closes a cycle: `from` depends on `to`, and `to` was
/// still being explored when the edge was followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleEdge {
    pub from: String,
    pub to: String,
}

impl DependencyGraph {
    /// Build the graph from a `services` mapping.
    ///
    /// Dependencies on undefined services are left out; non-mapping
    /// service definitions contribute a node without edges.
    pub fn from_services(services: &crate::parser::Mapping) -> Self {
        let names: Vec<String> = services.keys().cloned().collect();
        let index: HashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        let edges: Vec<Vec<usize>> = services
            .values()
            .map(|service| {
                dependency_names(service.get("depends_on"))
                    .iter()
                    .filter_map(|dep| index.get(dep).copied())
                    .collect()
            })
            .collect();

        Self { names, edges }
    }

    #[cfg(test)]
    fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.edges[i].iter().map(|&j| self.names[j].as_str()).collect())
            .unwrap_or_default()
    }

    /// Every cycle-closing edge found by searching from each service in
    /// declaration order.
    pub fn find_cycle_edges(&self) -> Vec<CycleEdge> {
        let mut found = Vec::new();
        for start in 0..self.names.len() {
            let mut colors = vec![Color::Unvisited; self.names.len()];
            self.search_from(start, &mut colors, &mut found);
        }
        found
    }

    /// Iterative DFS; each frame holds a node and the next edge to follow
    fn search_from(&self, start: usize, colors: &mut [Color], found: &mut Vec<CycleEdge>) {
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        colors[start] = Color::OnStack;

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            match self.edges[node].get(next) {
                Some(&target) => {
                    frame.1 += 1;
                    match colors[target] {
                        Color::OnStack => found.push(CycleEdge {
                            from: self.names[node].clone(),
                            to: self.names[target].clone(),
                        }),
                        Color::Unvisited => {
                            colors[target] = Color::OnStack;
                            stack.push((target, 0));
                        }
                        Color::Closed => {}
                    }
                }
                None => {
                    colors[node] = Color::Closed;
                    stack.pop();
                }
            }
        }
    }
}

/// Normalize a `depends_on` value into the referenced service names.
///
/// Sequences yield their stringified elements, mappings their keys, and
/// anything else (including absence) yields nothing.
pub fn dependency_names(depends_on: Option<&Value>) -> Vec<String> {
    match depends_on {
        Some(Value::Sequence(items)) => items.iter().map(Value::to_display_string).collect(),
        Some(Value::Mapping(map)) => map.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Mapping;

    fn services(edges: &[(&str, &[&str])]) -> Mapping {
        edges
            .iter()
            .map(|(name, deps)| {
                let mut service = Mapping::new();
                service.insert("image".to_string(), Value::from("busybox"));
                service.insert(
                    "depends_on".to_string(),
                    Value::Sequence(deps.iter().map(|d| Value::from(*d)).collect()),
                );
                (name.to_string(), Value::Mapping(service))
            })
            .collect()
    }

    #[test]
    fn test_two_node_cycle_reported_from_both_starts() {
        let graph = DependencyGraph::from_services(&services(&[("a", &["b"]), ("b", &["a"])]));
        let cycles = graph.find_cycle_edges();
        assert_eq!(
            cycles,
            vec![
                CycleEdge {
                    from: "b".to_string(),
                    to: "a".to_string()
                },
                CycleEdge {
                    from: "a".to_string(),
                    to: "b".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_chain_has_no_cycle() {
        let graph = DependencyGraph::from_services(&services(&[
            ("a", &["b"]),
            ("b", &["c"]),
            ("c", &[]),
        ]));
        assert!(graph.find_cycle_edges().is_empty());
    }

    #[test]
    fn test_diamond_has_no_cycle() {
        let graph = DependencyGraph::from_services(&services(&[
            ("app", &["api", "worker"]),
            ("api", &["db"]),
            ("worker", &["db"]),
            ("db", &[]),
        ]));
        assert!(graph.find_cycle_edges().is_empty());
    }

    #[test]
    fn test_self_edge_is_a_cycle() {
        let graph = DependencyGraph::from_services(&services(&[("a", &["a"])]));
        assert_eq!(
            graph.find_cycle_edges(),
            vec![CycleEdge {
                from: "a".to_string(),
                to: "a".to_string()
            }]
        );
    }

    #[test]
    fn test_undefined_targets_are_not_edges() {
        let graph = DependencyGraph::from_services(&services(&[("a", &["ghost", "b"]), ("b", &[])]));
        assert_eq!(graph.dependencies_of("a"), vec!["b"]);
        assert!(graph.dependencies_of("ghost").is_empty());
        assert!(graph.dependencies_of("b").is_empty());
    }

    #[test]
    fn test_three_node_cycle_reported_per_start() {
        let graph = DependencyGraph::from_services(&services(&[
            ("a", &["b"]),
            ("b", &["c"]),
            ("c", &["a"]),
        ]));
        let cycles = graph.find_cycle_edges();
        assert_eq!(cycles.len(), 3);
        assert_eq!(cycles[0].from, "c");
        assert_eq!(cycles[0].to, "a");
    }

    #[test]
    fn test_dependency_names_normalization() {
        let mut map = Mapping::new();
        map.insert("db".to_string(), Value::Null);
        map.insert("cache".to_string(), Value::Null);
        assert_eq!(dependency_names(Some(&Value::Mapping(map))), vec!["db", "cache"]);
        assert_eq!(
            dependency_names(Some(&Value::Sequence(vec![Value::from("db"), Value::from(5)]))),
            vec!["db", "5"]
        );
        assert!(dependency_names(Some(&Value::from("db"))).is_empty());
        assert!(dependency_names(None).is_empty());
    }
}
