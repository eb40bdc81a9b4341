//! Truth-value evaluation of formulas against finite traces.
//!
//! The evaluator is total for well-formed inputs: out-of-bounds spatial
//! shifts are false rather than errors, temporal operators bottom out at
//! the end of the trace, and a name missing from a snapshot never matches.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use margay_dsl::ast::{Formula, FormulaRef};
use margay_ir::trace::{GridBounds, Point, Trace};

/// Memo key: formula node identity, time index, evaluation point.
///
/// The cache lives for one top-level [`evaluate`] call and is forked fresh
/// for every `Bind` subtree — a rebinding changes what the subtree observes,
/// so entries computed under a different binding must never be reused.
type MemoKey = (usize, usize, Point);

struct EvalCtx<'a> {
    trace: &'a Trace,
    bounds: GridBounds,
}

/// Rebindings introduced by `Bind`, overlaid over the trace for every time
/// index. Copy-on-write: each `Bind` clones the map for its subtree, so
/// backtracking branches never observe each other's rebindings.
type Overlay = IndexMap<String, Point>;

/// Evaluate `formula` on `trace` at `point`, starting from time 0.
pub fn evaluate(formula: &FormulaRef, trace: &Trace, point: Point, bounds: GridBounds) -> bool {
    let ctx = EvalCtx { trace, bounds };
    let mut memo = HashMap::new();
    eval_at(&ctx, formula, 0, point, &Overlay::new(), &mut memo)
}

/// The grid points at which `formula` holds on `trace`, in row-major order.
pub fn satisfying_points(formula: &FormulaRef, trace: &Trace, bounds: GridBounds) -> Vec<Point> {
    bounds
        .points()
        .filter(|&p| evaluate(formula, trace, p, bounds))
        .collect()
}

fn agent_position(ctx: &EvalCtx<'_>, time: usize, overlay: &Overlay, name: &str) -> Option<Point> {
    overlay
        .get(name)
        .copied()
        .or_else(|| ctx.trace.state(time).agent(name))
}

fn eval_at(
    ctx: &EvalCtx<'_>,
    formula: &FormulaRef,
    time: usize,
    point: Point,
    overlay: &Overlay,
    memo: &mut HashMap<MemoKey, bool>,
) -> bool {
    let key = (Arc::as_ptr(formula) as usize, time, point);
    if let Some(&cached) = memo.get(&key) {
        return cached;
    }

    let last = ctx.trace.len() - 1;
    let value = match formula.as_ref() {
        Formula::Verum => true,
        Formula::Falsum => false,
        Formula::Prop(name) => ctx.trace.state(time).holds_at(name, point),
        Formula::Nom(name) => agent_position(ctx, time, overlay, name) == Some(point),
        Formula::Not(sub) => !eval_at(ctx, sub, time, point, overlay, memo),
        Formula::And(l, r) => {
            eval_at(ctx, l, time, point, overlay, memo)
                && eval_at(ctx, r, time, point, overlay, memo)
        }
        Formula::Or(l, r) => {
            eval_at(ctx, l, time, point, overlay, memo)
                || eval_at(ctx, r, time, point, overlay, memo)
        }
        Formula::Implies(l, r) => {
            !eval_at(ctx, l, time, point, overlay, memo)
                || eval_at(ctx, r, time, point, overlay, memo)
        }
        Formula::Iff(l, r) => {
            eval_at(ctx, l, time, point, overlay, memo)
                == eval_at(ctx, r, time, point, overlay, memo)
        }
        Formula::Shift(dir, sub) => {
            let target = point.offset(dir.shift_delta());
            ctx.bounds.contains(target) && eval_at(ctx, sub, time, target, overlay, memo)
        }
        Formula::At(name, sub) => match agent_position(ctx, time, overlay, name) {
            Some(target) => eval_at(ctx, sub, time, target, overlay, memo),
            None => false,
        },
        Formula::Bind(name, sub) => {
            let mut bound = overlay.clone();
            bound.insert(name.clone(), point);
            let mut forked = HashMap::new();
            eval_at(ctx, sub, time, point, &bound, &mut forked)
        }
        Formula::Next(sub) => time < last && eval_at(ctx, sub, time + 1, point, overlay, memo),
        Formula::Eventually(sub) => {
            eval_at(ctx, sub, time, point, overlay, memo)
                || (time < last && eval_at(ctx, formula, time + 1, point, overlay, memo))
        }
        Formula::Always(sub) => {
            eval_at(ctx, sub, time, point, overlay, memo)
                && (time == last || eval_at(ctx, formula, time + 1, point, overlay, memo))
        }
        Formula::Until(l, r) => {
            eval_at(ctx, r, time, point, overlay, memo)
                || (time < last
                    && eval_at(ctx, l, time, point, overlay, memo)
                    && eval_at(ctx, formula, time + 1, point, overlay, memo))
        }
    };

    memo.insert(key, value);
    value
}
