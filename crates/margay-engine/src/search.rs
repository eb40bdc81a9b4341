//! Kinematically pruned trace search.
//!
//! Instead of enumerating the full state space, the search places rigid
//! dependency components, static agents, fixed-movement agents and free
//! agents separately, checks state-only assumptions on every snapshot, and
//! extends accepted prefixes depth-first. Every accepted prefix is yielded,
//! so a consumer can stop pulling at any time; all search state lives in
//! the iterator itself.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use margay_dsl::FormulaRef;
use margay_ir::kinematics::{AgentClasses, Component};
use margay_ir::trace::{Delta, GridBounds, Point, State, Trace};

use crate::eval;

/// How a dependency component moves between consecutive snapshots.
#[derive(Debug, Clone)]
enum ComponentMove {
    /// A static member pins the whole component.
    Static,
    /// Fixed-movement members restrict the rigid step to their common deltas.
    Fixed(Vec<Delta>),
    /// Unconstrained rigid translation.
    Free,
}

/// Depth-first streaming enumeration of kinematically consistent traces.
pub struct TraceSearch {
    bounds: GridBounds,
    propositions: Vec<String>,
    agents: Vec<String>,
    state_only: Vec<FormulaRef>,
    static_agents: IndexSet<String>,
    solo_fixed: IndexMap<String, Vec<Delta>>,
    components: Vec<Component>,
    component_moves: Vec<ComponentMove>,
    points: Vec<Point>,
    subsets: Vec<IndexSet<Point>>,
    all_deltas: Vec<Delta>,
    max_len: usize,
    levels: Vec<Level>,
    prefix: Vec<State>,
    dead: bool,
}

/// One depth of the search: candidate assignments per agent slot, crossed
/// with one proposition-subset choice per proposition.
struct Level {
    agent_slots: Vec<Vec<Vec<(String, Point)>>>,
    odometer: Odometer,
}

impl TraceSearch {
    pub fn new(
        bounds: GridBounds,
        propositions: Vec<String>,
        agents: Vec<String>,
        classes: &AgentClasses,
        components: Vec<Component>,
        max_len: usize,
    ) -> Self {
        let points: Vec<Point> = bounds.points().collect();
        let subsets = point_subsets(&points);

        let in_component =
            |name: &str| components.iter().any(|c| c.contains(name));

        let solo_fixed: IndexMap<String, Vec<Delta>> = classes
            .fixed_movement
            .iter()
            .filter(|(name, _)| !in_component(name))
            .map(|(name, deltas)| (name.clone(), deltas.iter().copied().collect()))
            .collect();

        let mut dead = false;
        let extending = max_len > 1;

        // A static agent with a movement declaration is unsatisfiable for
        // any multi-step trace.
        if extending
            && classes
                .static_agents
                .iter()
                .any(|a| classes.fixed_movement.contains_key(a))
        {
            dead = true;
        }

        let mut component_moves = Vec::with_capacity(components.len());
        for component in &components {
            let has_static = component
                .members
                .keys()
                .any(|m| classes.static_agents.contains(m));
            let fixed: Vec<&IndexSet<Delta>> = component
                .members
                .keys()
                .filter_map(|m| classes.fixed_movement.get(m))
                .collect();

            if has_static && !fixed.is_empty() {
                // A rigid component cannot both stand still and move.
                if extending {
                    dead = true;
                }
                component_moves.push(ComponentMove::Static);
            } else if has_static {
                component_moves.push(ComponentMove::Static);
            } else if !fixed.is_empty() {
                let mut shared: IndexSet<Delta> = fixed[0].clone();
                for set in &fixed[1..] {
                    shared.retain(|d| set.contains(d));
                }
                if shared.is_empty() && extending {
                    dead = true;
                }
                component_moves.push(ComponentMove::Fixed(shared.into_iter().collect()));
            } else {
                component_moves.push(ComponentMove::Free);
            }
        }

        let mut search = TraceSearch {
            all_deltas: bounds.all_deltas(),
            bounds,
            propositions,
            agents,
            state_only: classes.state_only.clone(),
            static_agents: classes.static_agents.clone(),
            solo_fixed,
            components,
            component_moves,
            points,
            subsets,
            max_len,
            levels: Vec::new(),
            prefix: Vec::new(),
            dead,
        };

        if !search.dead {
            match search.initial_level() {
                Some(level) => search.levels.push(level),
                None => search.dead = true,
            }
        }
        debug!(
            components = search.components.len(),
            static_agents = search.static_agents.len(),
            dead = search.dead,
            "pruned search initialised"
        );
        search
    }

    fn in_component(&self, name: &str) -> bool {
        self.components.iter().any(|c| c.contains(name))
    }

    /// Candidate assignments for the first snapshot: component placements,
    /// every grid point for every other agent.
    fn initial_level(&self) -> Option<Level> {
        let mut slots = Vec::new();
        for component in &self.components {
            let placements = component.placements(self.bounds);
            if placements.is_empty() {
                return None;
            }
            slots.push(
                placements
                    .into_iter()
                    .map(|placement| placement.into_iter().collect())
                    .collect(),
            );
        }
        for name in &self.agents {
            if self.in_component(name) {
                continue;
            }
            slots.push(
                self.points
                    .iter()
                    .map(|&p| vec![(name.clone(), p)])
                    .collect(),
            );
        }
        Some(self.make_level(slots))
    }

    /// Candidate assignments for the snapshot after `prev`, one slot per
    /// movement category.
    fn successor_level(&self, prev: &State) -> Level {
        let mut slots = Vec::new();

        for (component, movement) in self.components.iter().zip(&self.component_moves) {
            let deltas: &[Delta] = match movement {
                ComponentMove::Static => &[(0, 0)],
                ComponentMove::Fixed(deltas) => deltas.as_slice(),
                ComponentMove::Free => self.all_deltas.as_slice(),
            };
            let mut choices = Vec::new();
            for &delta in deltas {
                let mut placement = Vec::with_capacity(component.members.len());
                let mut in_grid = true;
                for name in component.members.keys() {
                    let target = match prev.agent(name) {
                        Some(current) => current.offset(delta),
                        None => {
                            in_grid = false;
                            break;
                        }
                    };
                    if !self.bounds.contains(target) {
                        in_grid = false;
                        break;
                    }
                    placement.push((name.clone(), target));
                }
                if in_grid {
                    choices.push(placement);
                }
            }
            slots.push(choices);
        }

        for name in &self.agents {
            if self.in_component(name) {
                continue;
            }
            let choices = if self.static_agents.contains(name) {
                match prev.agent(name) {
                    Some(p) => vec![vec![(name.clone(), p)]],
                    None => Vec::new(),
                }
            } else if let Some(deltas) = self.solo_fixed.get(name) {
                deltas
                    .iter()
                    .filter_map(|&delta| {
                        let target = prev.agent(name)?.offset(delta);
                        self.bounds
                            .contains(target)
                            .then(|| vec![(name.clone(), target)])
                    })
                    .collect()
            } else {
                self.points
                    .iter()
                    .map(|&p| vec![(name.clone(), p)])
                    .collect()
            };
            slots.push(choices);
        }

        self.make_level(slots)
    }

    fn make_level(&self, agent_slots: Vec<Vec<Vec<(String, Point)>>>) -> Level {
        let mut dims: Vec<usize> = agent_slots.iter().map(Vec::len).collect();
        dims.extend(std::iter::repeat(self.subsets.len()).take(self.propositions.len()));
        Level {
            agent_slots,
            odometer: Odometer::new(dims),
        }
    }

    /// Build the candidate state selected by `idx`, rejecting choices that
    /// assign one agent two different points.
    fn assemble(&self, level: &Level, idx: &[usize]) -> Option<State> {
        let mut positions: IndexMap<&str, Point> = IndexMap::new();
        for (slot, &choice) in level.agent_slots.iter().zip(idx) {
            for (name, point) in &slot[choice] {
                match positions.get(name.as_str()) {
                    Some(&existing) if existing != *point => return None,
                    _ => {
                        positions.insert(name.as_str(), *point);
                    }
                }
            }
        }

        let mut state = State::new();
        for name in &self.agents {
            state.insert_agent(name.clone(), *positions.get(name.as_str())?);
        }
        let prop_idx = &idx[level.agent_slots.len()..];
        for (name, &choice) in self.propositions.iter().zip(prop_idx) {
            state.insert_region(name.clone(), self.subsets[choice].clone());
        }
        Some(state)
    }

    /// A snapshot is acceptable when every state-only assumption holds at
    /// every grid point of it.
    fn state_ok(&self, state: &State) -> bool {
        if self.state_only.is_empty() {
            return true;
        }
        let trace = Trace::single(state.clone());
        self.state_only.iter().all(|formula| {
            self.points
                .iter()
                .all(|&p| eval::evaluate(formula, &trace, p, self.bounds))
        })
    }
}

impl Iterator for TraceSearch {
    type Item = Trace;

    fn next(&mut self) -> Option<Trace> {
        if self.dead {
            return None;
        }
        loop {
            let depth = self.levels.len();
            if depth == 0 {
                return None;
            }
            let Some(idx) = self.levels[depth - 1].odometer.advance() else {
                self.levels.pop();
                continue;
            };
            let Some(state) = self.assemble(&self.levels[depth - 1], &idx) else {
                continue;
            };
            if !self.state_ok(&state) {
                continue;
            }

            self.prefix.truncate(depth - 1);
            self.prefix.push(state);
            if self.prefix.len() < self.max_len {
                let successors = {
                    let last = self.prefix.last().expect("prefix was just extended");
                    self.successor_level(last)
                };
                self.levels.push(successors);
            }
            return Some(Trace::new(self.prefix.clone()));
        }
    }
}

/// Mixed-radix counter over the given dimension sizes, last digit fastest.
/// Zero dimensions yield exactly one empty choice; a zero-sized dimension
/// yields nothing.
struct Odometer {
    dims: Vec<usize>,
    idx: Vec<usize>,
    started: bool,
    done: bool,
}

impl Odometer {
    fn new(dims: Vec<usize>) -> Self {
        let done = dims.iter().any(|&d| d == 0);
        let idx = vec![0; dims.len()];
        Odometer {
            dims,
            idx,
            started: false,
            done,
        }
    }

    fn advance(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.idx.clone());
        }
        let mut pos = self.dims.len();
        loop {
            if pos == 0 {
                self.done = true;
                return None;
            }
            pos -= 1;
            self.idx[pos] += 1;
            if self.idx[pos] < self.dims[pos] {
                return Some(self.idx.clone());
            }
            self.idx[pos] = 0;
        }
    }
}

/// Power set of the grid points, smaller subsets first.
fn point_subsets(points: &[Point]) -> Vec<IndexSet<Point>> {
    use itertools::Itertools;
    points
        .iter()
        .copied()
        .powerset()
        .map(|subset| subset.into_iter().collect())
        .collect()
}
