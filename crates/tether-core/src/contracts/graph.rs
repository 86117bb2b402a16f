//! Dependency graph over the contracts of one deployment run.

use std::collections::HashMap;

use super::ContractUnit;
use crate::error::DeployError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Directed graph where an edge `a -> b` means contract `a` imports `b`.
///
/// Nodes keep declaration order. A graph is only constructed when it is
/// acyclic.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    units: Vec<ContractUnit>,
    edges: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Build the graph, rejecting any dependency cycle.
    pub fn build(units: Vec<ContractUnit>) -> Result<Self, DeployError> {
        let index: HashMap<&str, usize> = units
            .iter()
            .enumerate()
            .map(|(i, unit)| (unit.name.as_str(), i))
            .collect();

        let edges: Vec<Vec<usize>> = units
            .iter()
            .map(|unit| {
                let mut targets: Vec<usize> = Vec::new();
                for dep in &unit.dependencies {
                    if let Some(&target) = index.get(dep.as_str())
                        && !targets.contains(&target)
                    {
                        targets.push(target);
                    }
                }
                targets
            })
            .collect();

        if let Some(cycle) = find_cycle(&edges) {
            return Err(DeployError::DependencyCycle {
                path: cycle.into_iter().map(|i| units[i].name.clone()).collect(),
            });
        }

        Ok(Self { units, edges })
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[ContractUnit] {
        &self.units
    }

    /// Indices of the contracts that node `index` imports.
    pub fn dependencies_of(&self, index: usize) -> &[usize] {
        &self.edges[index]
    }

    pub(crate) fn into_parts(self) -> (Vec<ContractUnit>, Vec<Vec<usize>>) {
        (self.units, self.edges)
    }
}

/// Depth-first search with three-colour marking.
///
/// Returns the first cycle found as a closed path (first node repeated at
/// the end), visiting roots in declaration order.
fn find_cycle(edges: &[Vec<usize>]) -> Option<Vec<usize>> {
    let mut marks = vec![Mark::Unvisited; edges.len()];
    let mut path = Vec::new();

    for root in 0..edges.len() {
        if marks[root] == Mark::Unvisited
            && let Some(cycle) = visit(root, edges, &mut marks, &mut path)
        {
            return Some(cycle);
        }
    }
    None
}

fn visit(
    node: usize,
    edges: &[Vec<usize>],
    marks: &mut [Mark],
    path: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    marks[node] = Mark::InProgress;
    path.push(node);

    for &next in &edges[node] {
        match marks[next] {
            Mark::InProgress => {
                let start = path.iter().position(|&n| n == next).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(next);
                return Some(cycle);
            }
            Mark::Unvisited => {
                if let Some(cycle) = visit(next, edges, marks, path) {
                    return Some(cycle);
                }
            }
            Mark::Done => {}
        }
    }

    path.pop();
    marks[node] = Mark::Done;
    None
}
