use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use crate::trace::{Delta, GridBounds, Point};
use margay_dsl::FormulaRef;

/// Kinematic classification of a run's assumption formulas.
///
/// Built once per run by [`crate::lowering::classify`]; consumed by the
/// component solver and the pruned trace search.
#[derive(Debug, Clone, Default)]
pub struct AgentClasses {
    /// Agents whose position never changes across the trace.
    pub static_agents: IndexSet<String>,
    /// `reference -> [(dependent, offset)]` fixed relative positions.
    pub dependent: IndexMap<String, Vec<(String, Delta)>>,
    /// Agents restricted to a declared set of per-step displacements.
    pub fixed_movement: IndexMap<String, IndexSet<Delta>>,
    /// Unmatched assumptions evaluable on a single snapshot.
    pub state_only: Vec<FormulaRef>,
    /// Unmatched assumptions that need full traces; folded into the checked
    /// conjunction instead of pruning the search.
    pub temporal: Vec<FormulaRef>,
}

impl AgentClasses {
    /// Names constrained by a dependent-position relation, on either side.
    pub fn dependent_names(&self) -> IndexSet<String> {
        let mut names = IndexSet::new();
        for (reference, deps) in &self.dependent {
            names.insert(reference.clone());
            for (dependent, _) in deps {
                names.insert(dependent.clone());
            }
        }
        names
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KinematicsError {
    /// The dependent-position relations assign two different relative
    /// coordinates to the same agent: the configuration admits no states
    /// at all, which is distinct from a search that finds none.
    #[error("contradictory relative offsets in the dependency component containing agent '{agent}'")]
    OffsetContradiction { agent: String },
}

/// A maximal set of agents whose positions are mutually pinned by fixed
/// offsets, each annotated with its coordinate relative to an arbitrary
/// origin member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub members: IndexMap<String, Delta>,
}

impl Component {
    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Every absolute placement of this component that keeps all members in
    /// bounds: the relative skeleton translated over the legal range.
    pub fn placements(&self, bounds: GridBounds) -> Vec<IndexMap<String, Point>> {
        let rows: Vec<i64> = self.members.values().map(|d| d.0).collect();
        let cols: Vec<i64> = self.members.values().map(|d| d.1).collect();
        let (min_r, max_r) = (
            rows.iter().copied().min().unwrap_or(0),
            rows.iter().copied().max().unwrap_or(0),
        );
        let (min_c, max_c) = (
            cols.iter().copied().min().unwrap_or(0),
            cols.iter().copied().max().unwrap_or(0),
        );

        let mut placements = Vec::new();
        for tr in -min_r..=(bounds.rows - 1) - max_r {
            for tc in -min_c..=(bounds.cols - 1) - max_c {
                let placement = self
                    .members
                    .iter()
                    .map(|(name, &(dr, dc))| (name.clone(), Point::new(dr + tr, dc + tc)))
                    .collect();
                placements.push(placement);
            }
        }
        placements
    }
}

/// Build an undirected offset-weighted adjacency map from the dependent
/// relations: each relation contributes the edge and its inverse.
fn build_adjacency(
    dependent: &IndexMap<String, Vec<(String, Delta)>>,
) -> IndexMap<String, Vec<(String, Delta)>> {
    let mut adjacency: IndexMap<String, Vec<(String, Delta)>> = IndexMap::new();
    for (reference, deps) in dependent {
        adjacency.entry(reference.clone()).or_default();
        for (dependent_name, (dr, dc)) in deps {
            adjacency.entry(dependent_name.clone()).or_default();
            adjacency
                .get_mut(reference)
                .expect("reference entry exists")
                .push((dependent_name.clone(), (*dr, *dc)));
            adjacency
                .get_mut(dependent_name)
                .expect("dependent entry exists")
                .push((reference.clone(), (-dr, -dc)));
        }
    }
    adjacency
}

/// Split the dependency graph into connected components with consistent
/// relative coordinates, or report the contradiction that makes the whole
/// configuration unsatisfiable.
pub fn build_components(
    dependent: &IndexMap<String, Vec<(String, Delta)>>,
) -> Result<Vec<Component>, KinematicsError> {
    let adjacency = build_adjacency(dependent);
    let mut components = Vec::new();
    let mut visited: IndexSet<String> = IndexSet::new();

    for start in adjacency.keys() {
        if visited.contains(start) {
            continue;
        }

        let mut relative: IndexMap<String, Delta> = IndexMap::new();
        relative.insert(start.clone(), (0, 0));
        let mut stack = vec![start.clone()];

        while let Some(node) = stack.pop() {
            let (nr, nc) = relative[&node];
            for (neighbor, (dr, dc)) in &adjacency[&node] {
                let coord = (nr + dr, nc + dc);
                match relative.get(neighbor) {
                    None => {
                        relative.insert(neighbor.clone(), coord);
                        stack.push(neighbor.clone());
                    }
                    Some(&known) if known != coord => {
                        return Err(KinematicsError::OffsetContradiction {
                            agent: neighbor.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        visited.extend(relative.keys().cloned());
        components.push(Component { members: relative });
    }

    Ok(components)
}
