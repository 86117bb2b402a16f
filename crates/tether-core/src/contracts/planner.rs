//! Deployment ordering.

use std::collections::BTreeSet;

use super::{ContractUnit, DependencyGraph};
use crate::error::DeployError;

/// Contracts in the order they must be deployed.
///
/// Every contract appears after all contracts it imports. Among contracts
/// that are ready at the same time, declaration order wins, so unchanged
/// input always produces the same plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentPlan {
    units: Vec<ContractUnit>,
}

impl DeploymentPlan {
    /// Order the graph with Kahn's algorithm.
    pub fn from_graph(graph: DependencyGraph) -> Result<Self, DeployError> {
        let (units, edges) = graph.into_parts();
        let count = units.len();

        let mut remaining: Vec<usize> = edges.iter().map(Vec::len).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (node, deps) in edges.iter().enumerate() {
            for &dep in deps {
                dependents[dep].push(node);
            }
        }

        let mut ready: BTreeSet<usize> = (0..count).filter(|&n| remaining[n] == 0).collect();
        let mut order = Vec::with_capacity(count);
        while let Some(next) = ready.pop_first() {
            order.push(next);
            for &dependent in &dependents[next] {
                remaining[dependent] -= 1;
                if remaining[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() != count {
            // The graph builder rejects cycles, so this only trips on a broken invariant.
            let stuck = (0..count)
                .filter(|n| !order.contains(n))
                .map(|n| units[n].name.clone())
                .collect();
            return Err(DeployError::DependencyCycle { path: stuck });
        }

        let mut slots: Vec<Option<ContractUnit>> = units.into_iter().map(Some).collect();
        let units = order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect();
        Ok(Self { units })
    }

    pub fn units(&self) -> &[ContractUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a DeploymentPlan {
    type Item = &'a ContractUnit;
    type IntoIter = std::slice::Iter<'a, ContractUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}
