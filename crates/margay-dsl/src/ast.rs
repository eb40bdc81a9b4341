use std::fmt;
use std::sync::Arc;

/// Shared handle to a formula node.
///
/// Subformulas are reference-counted so that one parsed node can appear in
/// several enclosing formulas; the evaluation engine keys its memo cache on
/// the pointer identity of these handles.
pub type FormulaRef = Arc<Formula>;

/// A spatial shift direction on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Front,
    Back,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Front,
        Direction::Back,
        Direction::Left,
        Direction::Right,
    ];

    /// Delta applied to the evaluation point by the shift operator:
    /// `Front p` evaluates its operand one row up from `p`, and so on.
    pub fn shift_delta(self) -> (i64, i64) {
        match self {
            Direction::Front => (-1, 0),
            Direction::Back => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Per-step displacement denoted by a movement branch in this direction.
    ///
    /// In the movement pattern `X @a (Left t)` the binder `t` names the *old*
    /// position, so the branch asserts that the old cell lies to the left of
    /// the new one: the agent itself moved by the negated shift delta.
    pub fn step_delta(self) -> (i64, i64) {
        let (dr, dc) = self.shift_delta();
        (-dr, -dc)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Front => "Front",
            Direction::Back => "Back",
            Direction::Left => "Left",
            Direction::Right => "Right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A hybrid spatio-temporal formula.
///
/// Nodes are immutable once built by the parser. `Prop` names a boolean
/// property holding at a set of grid points per time step; `Nom` names an
/// agent occupying exactly one point per time step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    Verum,
    Falsum,
    Prop(String),
    Nom(String),
    Not(FormulaRef),
    And(FormulaRef, FormulaRef),
    Or(FormulaRef, FormulaRef),
    Implies(FormulaRef, FormulaRef),
    Iff(FormulaRef, FormulaRef),
    /// Spatial shift: the operand is evaluated at the neighbouring point.
    Shift(Direction, FormulaRef),
    /// `@a φ` — evaluate `φ` at agent `a`'s current position.
    At(String, FormulaRef),
    /// `↓a φ` — rebind `a` to the current point, across the whole trace.
    Bind(String, FormulaRef),
    Next(FormulaRef),
    Eventually(FormulaRef),
    Always(FormulaRef),
    Until(FormulaRef, FormulaRef),
}

impl Formula {
    pub fn verum() -> FormulaRef {
        Arc::new(Formula::Verum)
    }

    pub fn falsum() -> FormulaRef {
        Arc::new(Formula::Falsum)
    }

    pub fn prop(name: impl Into<String>) -> FormulaRef {
        Arc::new(Formula::Prop(name.into()))
    }

    pub fn nom(name: impl Into<String>) -> FormulaRef {
        Arc::new(Formula::Nom(name.into()))
    }

    pub fn not(sub: FormulaRef) -> FormulaRef {
        Arc::new(Formula::Not(sub))
    }

    pub fn and(lhs: FormulaRef, rhs: FormulaRef) -> FormulaRef {
        Arc::new(Formula::And(lhs, rhs))
    }

    pub fn or(lhs: FormulaRef, rhs: FormulaRef) -> FormulaRef {
        Arc::new(Formula::Or(lhs, rhs))
    }

    pub fn implies(lhs: FormulaRef, rhs: FormulaRef) -> FormulaRef {
        Arc::new(Formula::Implies(lhs, rhs))
    }

    pub fn iff(lhs: FormulaRef, rhs: FormulaRef) -> FormulaRef {
        Arc::new(Formula::Iff(lhs, rhs))
    }

    pub fn shift(dir: Direction, sub: FormulaRef) -> FormulaRef {
        Arc::new(Formula::Shift(dir, sub))
    }

    pub fn at(name: impl Into<String>, sub: FormulaRef) -> FormulaRef {
        Arc::new(Formula::At(name.into(), sub))
    }

    pub fn bind(name: impl Into<String>, sub: FormulaRef) -> FormulaRef {
        Arc::new(Formula::Bind(name.into(), sub))
    }

    pub fn next(sub: FormulaRef) -> FormulaRef {
        Arc::new(Formula::Next(sub))
    }

    pub fn eventually(sub: FormulaRef) -> FormulaRef {
        Arc::new(Formula::Eventually(sub))
    }

    pub fn always(sub: FormulaRef) -> FormulaRef {
        Arc::new(Formula::Always(sub))
    }

    pub fn until(lhs: FormulaRef, rhs: FormulaRef) -> FormulaRef {
        Arc::new(Formula::Until(lhs, rhs))
    }

    /// Left-fold a non-empty sequence into a conjunction.
    ///
    /// Returns `None` for an empty sequence; callers treat that as a
    /// configuration error rather than defaulting to `⊤`.
    pub fn conjoin(parts: impl IntoIterator<Item = FormulaRef>) -> Option<FormulaRef> {
        let mut iter = parts.into_iter();
        let first = iter.next()?;
        Some(iter.fold(first, Formula::and))
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Verum => write!(f, "⊤"),
            Formula::Falsum => write!(f, "⊥"),
            Formula::Prop(name) | Formula::Nom(name) => f.write_str(name),
            Formula::Not(sub) => write!(f, "¬{sub}"),
            Formula::And(l, r) => write!(f, "({l} ∧ {r})"),
            Formula::Or(l, r) => write!(f, "({l} ∨ {r})"),
            Formula::Implies(l, r) => write!(f, "({l} → {r})"),
            Formula::Iff(l, r) => write!(f, "({l} ↔ {r})"),
            Formula::Shift(dir, sub) => write!(f, "{dir} {sub}"),
            Formula::At(name, sub) => write!(f, "@{name} {sub}"),
            Formula::Bind(name, sub) => write!(f, "↓{name} {sub}"),
            Formula::Next(sub) => write!(f, "X {sub}"),
            Formula::Eventually(sub) => write!(f, "F {sub}"),
            Formula::Always(sub) => write!(f, "G {sub}"),
            Formula::Until(l, r) => write!(f, "({l} U {r})"),
        }
    }
}
