//! Lowering of assumption formulas into kinematic agent classes.
//!
//! Three structural recognizers pick out the assumption shapes the pruned
//! search can exploit; everything else is kept as an ordinary constraint,
//! split by whether it can be checked on a single snapshot.

use indexmap::IndexSet;

use crate::kinematics::AgentClasses;
use crate::trace::Delta;
use margay_dsl::ast::{Formula, FormulaRef};

/// Classify assumption formulas into kinematic classes.
///
/// Each assumption is matched against the static, fixed-offset and
/// fixed-movement patterns; a match consumes it. Unmatched assumptions land
/// in `state_only` or `temporal`. Classifying the residue again is a
/// fixpoint.
pub fn classify(assumptions: &[FormulaRef]) -> AgentClasses {
    let mut classes = AgentClasses::default();

    for assumption in assumptions {
        let mut consumed = false;

        if let Some(agent) = match_static(assumption) {
            classes.static_agents.insert(agent);
            consumed = true;
        }

        if let Some((reference, dependent, offset)) = match_fixed_offset(assumption) {
            classes
                .dependent
                .entry(reference)
                .or_default()
                .push((dependent, offset));
            consumed = true;
        }

        if let Some((agent, deltas)) = match_fixed_movement(assumption) {
            classes
                .fixed_movement
                .entry(agent)
                .or_default()
                .extend(deltas);
            consumed = true;
        }

        if !consumed {
            if is_state_only(assumption) {
                classes.state_only.push(assumption.clone());
            } else {
                classes.temporal.push(assumption.clone());
            }
        }
    }

    classes
}

/// `@a ↓t (G (@a t))` — the agent is forever at the point bound at time 0,
/// i.e. its position is frozen. The binder must be a different name than the
/// agent: with `t = a` the formula is a tautology, not a constraint.
pub fn match_static(formula: &FormulaRef) -> Option<String> {
    let Formula::At(agent, bind) = formula.as_ref() else {
        return None;
    };
    let Formula::Bind(binder, body) = bind.as_ref() else {
        return None;
    };
    let Formula::Always(inner) = body.as_ref() else {
        return None;
    };
    let Formula::At(inner_agent, nom) = inner.as_ref() else {
        return None;
    };
    let Formula::Nom(nom_name) = nom.as_ref() else {
        return None;
    };
    (agent == inner_agent && binder == nom_name && binder != agent).then(|| agent.clone())
}

/// `G @ref (dir₁ dir₂ … dep)` — the dependent agent sits at the point the
/// shift chain reaches from the reference, at every time step. The offset is
/// the sum of the shift deltas, so that the generated placements actually
/// satisfy the consumed formula.
pub fn match_fixed_offset(formula: &FormulaRef) -> Option<(String, String, Delta)> {
    let Formula::Always(at) = formula.as_ref() else {
        return None;
    };
    let Formula::At(reference, chain) = at.as_ref() else {
        return None;
    };

    let mut offset: Delta = (0, 0);
    let mut shifts = 0usize;
    let mut cursor = chain;
    loop {
        match cursor.as_ref() {
            Formula::Shift(dir, sub) => {
                let (dr, dc) = dir.shift_delta();
                offset = (offset.0 + dr, offset.1 + dc);
                shifts += 1;
                cursor = sub;
            }
            Formula::Nom(dependent) => {
                return (shifts > 0)
                    .then(|| (reference.clone(), dependent.clone(), offset));
            }
            _ => return None,
        }
    }
}

/// `G @a ↓t (¬(X ⊤) ∨ X (@a branches))` — per-step movement declaration.
///
/// The binder names the old position, so a `Left t` branch says the old cell
/// lies to the new position's left: the displacement is the negated shift
/// delta. A bare `t` branch means stay; `¬(X ⊤)` branches permit the trace
/// to end and carry no displacement. Any other branch aborts the match.
pub fn match_fixed_movement(formula: &FormulaRef) -> Option<(String, IndexSet<Delta>)> {
    let Formula::Always(at) = formula.as_ref() else {
        return None;
    };
    let Formula::At(agent, bind) = at.as_ref() else {
        return None;
    };
    let Formula::Bind(binder, body) = bind.as_ref() else {
        return None;
    };

    let survivors: Vec<&FormulaRef> = disjuncts(body)
        .into_iter()
        .filter(|branch| !is_end_check(branch))
        .collect();
    let [step] = survivors.as_slice() else {
        return None;
    };
    let Formula::Next(inner_at) = step.as_ref() else {
        return None;
    };
    let Formula::At(inner_agent, moves) = inner_at.as_ref() else {
        return None;
    };
    if inner_agent != agent {
        return None;
    }

    let mut deltas = IndexSet::new();
    for branch in disjuncts(moves) {
        match branch.as_ref() {
            Formula::Shift(dir, sub) => {
                let Formula::Nom(name) = sub.as_ref() else {
                    return None;
                };
                if name != binder {
                    return None;
                }
                deltas.insert(dir.step_delta());
            }
            Formula::Nom(name) if name == binder => {
                deltas.insert((0, 0));
            }
            _ if is_end_check(branch) => {}
            _ => return None,
        }
    }

    (!deltas.is_empty()).then(|| (agent.clone(), deltas))
}

/// Whether an unmatched assumption can be checked against a single grid
/// snapshot: an outermost `G` with nothing underneath that looks across
/// time steps (nested `G` over one snapshot collapses to its operand).
pub fn is_state_only(formula: &FormulaRef) -> bool {
    match formula.as_ref() {
        Formula::Always(body) => !crosses_time_steps(body),
        _ => false,
    }
}

fn crosses_time_steps(formula: &FormulaRef) -> bool {
    match formula.as_ref() {
        Formula::Next(_) | Formula::Eventually(_) | Formula::Until(_, _) => true,
        Formula::Verum | Formula::Falsum | Formula::Prop(_) | Formula::Nom(_) => false,
        Formula::Not(sub)
        | Formula::Shift(_, sub)
        | Formula::At(_, sub)
        | Formula::Bind(_, sub)
        | Formula::Always(sub) => crosses_time_steps(sub),
        Formula::And(l, r)
        | Formula::Or(l, r)
        | Formula::Implies(l, r)
        | Formula::Iff(l, r) => crosses_time_steps(l) || crosses_time_steps(r),
    }
}

/// Flatten a (nested) disjunction into its branches.
fn disjuncts(formula: &FormulaRef) -> Vec<&FormulaRef> {
    match formula.as_ref() {
        Formula::Or(l, r) => {
            let mut branches = disjuncts(l);
            branches.extend(disjuncts(r));
            branches
        }
        _ => vec![formula],
    }
}

/// `¬(X ⊤)` — true exactly at the last time step of a finite trace.
fn is_end_check(formula: &FormulaRef) -> bool {
    let Formula::Not(inner) = formula.as_ref() else {
        return false;
    };
    let Formula::Next(operand) = inner.as_ref() else {
        return false;
    };
    matches!(operand.as_ref(), Formula::Verum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use margay_dsl::parse;

    #[test]
    fn recognizes_the_static_pattern() {
        let f = parse("@z1 ↓z0 (G @z1 (z0))").unwrap();
        assert_eq!(match_static(&f), Some("z1".to_string()));
    }

    #[test]
    fn static_pattern_requires_matching_names() {
        assert!(match_static(&parse("@z1 ↓z0 (G @z2 (z0))").unwrap()).is_none());
        assert!(match_static(&parse("@z1 ↓z0 (G @z1 (z9))").unwrap()).is_none());
        // Binder equal to the agent makes the formula a tautology.
        assert!(match_static(&parse("@z1 ↓z1 (G @z1 (z1))").unwrap()).is_none());
    }

    #[test]
    fn recognizes_fixed_offsets_and_sums_shift_deltas() {
        let f = parse("G @z2 Front z3").unwrap();
        assert_eq!(
            match_fixed_offset(&f),
            Some(("z2".into(), "z3".into(), (-1, 0)))
        );

        let f = parse("G @z1 (Left Left Back z2)").unwrap();
        assert_eq!(
            match_fixed_offset(&f),
            Some(("z1".into(), "z2".into(), (1, -2)))
        );
    }

    #[test]
    fn fixed_offset_needs_at_least_one_shift() {
        assert!(match_fixed_offset(&parse("G @z1 z2").unwrap()).is_none());
        assert!(match_fixed_offset(&parse("G @z1 (Front a)").unwrap()).is_none());
    }

    #[test]
    fn recognizes_fixed_movement_with_escape_branches() {
        let f = parse("G (@z1 ↓z2 ((! X 1) | X @z1 (z2 | Back z2)))").unwrap();
        let (agent, deltas) = match_fixed_movement(&f).unwrap();
        assert_eq!(agent, "z1");
        // Stay, plus "old cell is behind": the agent moved one row up.
        let expected: IndexSet<Delta> = [(0, 0), (-1, 0)].into_iter().collect();
        assert_eq!(deltas, expected);
    }

    #[test]
    fn movement_match_aborts_on_foreign_branches() {
        // Inner disjunct not built from the binder.
        let f = parse("G (@z1 ↓z2 ((! X 1) | X @z1 (z2 | Back z9)))").unwrap();
        assert!(match_fixed_movement(&f).is_none());
        // A conjunction branch is not a recognized movement.
        let f = parse("G (@z0 ↓z2 ((! X 1) | X (@z0 ((!z1 & Back z2) | (z2 & Front z1)))))").unwrap();
        assert!(match_fixed_movement(&f).is_none());
    }

    #[test]
    fn movement_without_next_branch_does_not_match() {
        let f = parse("G (@z1 ↓z2 (! X 1))").unwrap();
        assert!(match_fixed_movement(&f).is_none());
    }

    #[test]
    fn state_only_requires_outer_always_and_no_step_crossing() {
        assert!(is_state_only(&parse("G (a | b)").unwrap()));
        assert!(is_state_only(&parse("G @z1 (Left z2)").unwrap()));
        assert!(is_state_only(&parse("G G (a)").unwrap()));
        assert!(!is_state_only(&parse("a | b").unwrap()));
        assert!(!is_state_only(&parse("G (a U b)").unwrap()));
        assert!(!is_state_only(&parse("G X a").unwrap()));
        assert!(!is_state_only(&parse("G F a").unwrap()));
    }

    #[test]
    fn classification_consumes_matches_and_is_idempotent_on_the_residue() {
        let assumptions = vec![
            parse("@z1 ↓z0 (G @z1 (z0))").unwrap(),
            parse("G @z2 Front z3").unwrap(),
            parse("G (@z4 ↓z0 ((! X 1) | X @z4 (z0)))").unwrap(),
            parse("G (a | b)").unwrap(),
            parse("F @z1 h").unwrap(),
        ];
        let classes = classify(&assumptions);

        assert!(classes.static_agents.contains("z1"));
        assert_eq!(classes.dependent["z2"], vec![("z3".into(), (-1, 0))]);
        let stay_only: IndexSet<Delta> = [(0, 0)].into_iter().collect();
        assert_eq!(classes.fixed_movement["z4"], stay_only);
        assert_eq!(classes.state_only.len(), 1);
        assert_eq!(classes.temporal.len(), 1);

        let residue: Vec<_> = classes
            .state_only
            .iter()
            .chain(&classes.temporal)
            .cloned()
            .collect();
        let again = classify(&residue);
        assert!(again.static_agents.is_empty());
        assert!(again.dependent.is_empty());
        assert!(again.fixed_movement.is_empty());
        assert_eq!(again.state_only.len(), classes.state_only.len());
        assert_eq!(again.temporal.len(), classes.temporal.len());
    }
}
