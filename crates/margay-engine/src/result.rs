use serde::Serialize;
use std::fmt;

use margay_ir::trace::{Point, Trace};

/// One satisfying trace together with the grid points where the combined
/// formula holds on it.
#[derive(Debug, Clone, Serialize)]
pub struct Witness {
    pub points: Vec<Point>,
    pub trace: Trace,
}

/// The outcome of one model-checking run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Candidate traces produced by the generator (every accepted prefix).
    pub traces_generated: u64,
    /// Traces on which the combined formula held at one or more points.
    pub traces_satisfying: u64,
    /// Satisfying traces with their points, when recording was requested.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub witnesses: Vec<Witness>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, witness) in self.witnesses.iter().enumerate() {
            write!(f, "Satisfying trace #{i} at points [")?;
            for (j, p) in witness.points.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{p}")?;
            }
            writeln!(f, "]")?;
            writeln!(f, "  {}", witness.trace)?;
        }
        writeln!(f, "Traces generated: {}", self.traces_generated)?;
        writeln!(f, "Satisfying traces: {}", self.traces_satisfying)
    }
}
