use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::fmt;

/// A per-step displacement `(d_row, d_col)`.
pub type Delta = (i64, i64);

/// A grid cell. Coordinates are signed so that shift arithmetic can leave
/// the grid; [`GridBounds::contains`] decides validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Point {
    pub row: i64,
    pub col: i64,
}

impl Point {
    pub fn new(row: i64, col: i64) -> Self {
        Point { row, col }
    }

    pub fn offset(self, (dr, dc): Delta) -> Point {
        Point {
            row: self.row + dr,
            col: self.col + dc,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Rectangular grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridBounds {
    pub rows: i64,
    pub cols: i64,
}

impl GridBounds {
    pub fn new(rows: i64, cols: i64) -> Self {
        GridBounds { rows, cols }
    }

    pub fn contains(self, p: Point) -> bool {
        0 <= p.row && p.row < self.rows && 0 <= p.col && p.col < self.cols
    }

    /// All grid cells in row-major order.
    pub fn points(self) -> impl Iterator<Item = Point> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| Point { row, col }))
    }

    pub fn cell_count(self) -> usize {
        (self.rows * self.cols) as usize
    }

    /// Every displacement representable within the grid, i.e. every delta
    /// that maps at least one cell to another.
    pub fn all_deltas(self) -> Vec<Delta> {
        let mut deltas = Vec::new();
        for dr in -(self.rows - 1)..self.rows {
            for dc in -(self.cols - 1)..self.cols {
                deltas.push((dr, dc));
            }
        }
        deltas
    }
}

impl fmt::Display for GridBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// The value a symbol takes in one grid snapshot: an agent occupies exactly
/// one cell, a proposition holds over a set of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Binding {
    Agent(Point),
    Region(IndexSet<Point>),
}

/// One time step's assignment of positions and point-sets to all symbols.
///
/// Agent and proposition name sets are disjoint and fixed for a run; an
/// absent proposition is an empty region.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct State {
    bindings: IndexMap<String, Binding>,
}

impl State {
    pub fn new() -> Self {
        State::default()
    }

    pub fn insert_agent(&mut self, name: impl Into<String>, point: Point) {
        self.bindings.insert(name.into(), Binding::Agent(point));
    }

    pub fn insert_region(&mut self, name: impl Into<String>, points: IndexSet<Point>) {
        self.bindings.insert(name.into(), Binding::Region(points));
    }

    pub fn agent(&self, name: &str) -> Option<Point> {
        match self.bindings.get(name) {
            Some(Binding::Agent(p)) => Some(*p),
            _ => None,
        }
    }

    /// Whether proposition `name` holds at `point` in this snapshot.
    pub fn holds_at(&self, name: &str, point: Point) -> bool {
        match self.bindings.get(name) {
            Some(Binding::Region(points)) => points.contains(&point),
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Binding)> {
        self.bindings.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, binding)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match binding {
                Binding::Agent(p) => write!(f, "{name}: {p}")?,
                Binding::Region(points) => {
                    write!(f, "{name}: [")?;
                    for (j, p) in points.iter().enumerate() {
                        if j > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{p}")?;
                    }
                    write!(f, "]")?;
                }
            }
        }
        write!(f, "}}")
    }
}

/// A finite, non-empty sequence of states; the unit of evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trace {
    pub states: Vec<State>,
}

impl Trace {
    pub fn new(states: Vec<State>) -> Self {
        Trace { states }
    }

    pub fn single(state: State) -> Self {
        Trace {
            states: vec![state],
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, time: usize) -> &State {
        &self.states[time]
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (t, state) in self.states.iter().enumerate() {
            if t > 0 {
                write!(f, " ; ")?;
            }
            write!(f, "t{t} {state}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_contain_only_the_rectangle() {
        let bounds = GridBounds::new(2, 3);
        assert!(bounds.contains(Point::new(0, 0)));
        assert!(bounds.contains(Point::new(1, 2)));
        assert!(!bounds.contains(Point::new(2, 0)));
        assert!(!bounds.contains(Point::new(0, 3)));
        assert!(!bounds.contains(Point::new(-1, 0)));
    }

    #[test]
    fn points_enumerate_row_major() {
        let points: Vec<Point> = GridBounds::new(2, 2).points().collect();
        assert_eq!(
            points,
            vec![
                Point::new(0, 0),
                Point::new(0, 1),
                Point::new(1, 0),
                Point::new(1, 1),
            ]
        );
    }

    #[test]
    fn all_deltas_span_the_grid() {
        let deltas = GridBounds::new(2, 2).all_deltas();
        assert_eq!(deltas.len(), 9);
        assert!(deltas.contains(&(0, 0)));
        assert!(deltas.contains(&(-1, 1)));
        assert!(!deltas.contains(&(2, 0)));
    }

    #[test]
    fn absent_proposition_is_an_empty_region() {
        let mut state = State::new();
        state.insert_agent("z1", Point::new(0, 0));
        assert!(!state.holds_at("a", Point::new(0, 0)));
        assert!(!state.holds_at("z1", Point::new(0, 0)));
        assert_eq!(state.agent("z1"), Some(Point::new(0, 0)));
        assert_eq!(state.agent("a"), None);
    }
}
