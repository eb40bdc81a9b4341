//! Unpruned enumeration of the full state and trace space.
//!
//! This is the semantic reference for the pruned search: every state is the
//! cross product of one point per agent and one subset of grid points per
//! proposition, and every trace is a tuple of states. The counts grow as
//! `|states|^len`, so this generator is only viable for small fixtures —
//! which is exactly its job.

use indexmap::IndexSet;
use itertools::Itertools;

use margay_ir::trace::{GridBounds, Point, State, Trace};

/// Every grid state over the given symbols: the power set of grid points per
/// proposition, crossed with every single point per agent.
pub fn all_states(propositions: &[String], agents: &[String], bounds: GridBounds) -> Vec<State> {
    let points: Vec<Point> = bounds.points().collect();
    let subsets: Vec<Vec<Point>> = points.iter().copied().powerset().collect();

    let prop_dims: Vec<Vec<Vec<Point>>> = propositions.iter().map(|_| subsets.clone()).collect();
    let agent_dims: Vec<Vec<Point>> = agents.iter().map(|_| points.clone()).collect();

    let mut states = Vec::new();
    for prop_choice in product_of(&prop_dims) {
        for agent_choice in product_of(&agent_dims) {
            let mut state = State::new();
            for (name, point) in agents.iter().zip(&agent_choice) {
                state.insert_agent(name.clone(), *point);
            }
            for (name, subset) in propositions.iter().zip(&prop_choice) {
                state.insert_region(name.clone(), subset.iter().copied().collect::<IndexSet<_>>());
            }
            states.push(state);
        }
    }
    states
}

/// The cross product of the given dimensions; the product of zero
/// dimensions is one empty choice, not zero choices.
fn product_of<T: Clone>(dimensions: &[Vec<T>]) -> Vec<Vec<T>> {
    if dimensions.is_empty() {
        return vec![Vec::new()];
    }
    dimensions
        .iter()
        .map(|dim| dim.iter().cloned())
        .multi_cartesian_product()
        .collect()
}

/// Lazily enumerate every trace of length `1..=max_len` over the full state
/// space, shorter traces first, the last position varying fastest.
pub fn generate_traces(
    propositions: &[String],
    agents: &[String],
    bounds: GridBounds,
    max_len: usize,
) -> impl Iterator<Item = Trace> {
    StateTuples::new(all_states(propositions, agents, bounds), max_len)
}

struct StateTuples {
    states: Vec<State>,
    max_len: usize,
    odometer: Vec<usize>,
    done: bool,
}

impl StateTuples {
    fn new(states: Vec<State>, max_len: usize) -> Self {
        let done = states.is_empty() || max_len == 0;
        StateTuples {
            states,
            max_len,
            odometer: vec![0],
            done,
        }
    }
}

impl Iterator for StateTuples {
    type Item = Trace;

    fn next(&mut self) -> Option<Trace> {
        if self.done {
            return None;
        }

        let trace = Trace::new(
            self.odometer
                .iter()
                .map(|&i| self.states[i].clone())
                .collect(),
        );

        // Advance the mixed-radix odometer, last digit fastest; on overflow
        // move on to the next trace length.
        let mut pos = self.odometer.len();
        loop {
            if pos == 0 {
                if self.odometer.len() >= self.max_len {
                    self.done = true;
                } else {
                    self.odometer = vec![0; self.odometer.len() + 1];
                }
                break;
            }
            pos -= 1;
            self.odometer[pos] += 1;
            if self.odometer[pos] < self.states.len() {
                break;
            }
            self.odometer[pos] = 0;
        }

        Some(trace)
    }
}
