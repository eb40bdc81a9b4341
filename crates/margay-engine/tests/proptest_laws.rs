//! Property-style laws of the evaluator on randomized formulas and traces.

use proptest::prelude::*;

use margay_dsl::ast::{Direction, Formula, FormulaRef};
use margay_engine::evaluate;
use margay_ir::trace::{GridBounds, Point, State, Trace};

const BOUNDS: GridBounds = GridBounds { rows: 3, cols: 3 };

fn arb_point() -> impl Strategy<Value = Point> {
    (0..BOUNDS.rows, 0..BOUNDS.cols).prop_map(|(row, col)| Point::new(row, col))
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Front),
        Just(Direction::Back),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

fn arb_state() -> impl Strategy<Value = State> {
    (
        arb_point(),
        proptest::collection::vec(any::<bool>(), BOUNDS.cell_count()),
    )
        .prop_map(|(agent, mask)| {
            let mut state = State::new();
            state.insert_agent("z1", agent);
            let region = BOUNDS
                .points()
                .zip(mask)
                .filter(|(_, set)| *set)
                .map(|(p, _)| p)
                .collect();
            state.insert_region("a", region);
            state
        })
}

fn arb_trace() -> impl Strategy<Value = Trace> {
    proptest::collection::vec(arb_state(), 1..=3).prop_map(Trace::new)
}

fn arb_formula() -> impl Strategy<Value = FormulaRef> {
    let leaf = prop_oneof![
        Just(Formula::verum()),
        Just(Formula::falsum()),
        Just(Formula::prop("a")),
        Just(Formula::nom("z1")),
    ];
    leaf.prop_recursive(3, 24, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(Formula::not),
            (arb_direction(), inner.clone()).prop_map(|(d, f)| Formula::shift(d, f)),
            inner.clone().prop_map(Formula::next),
            inner.clone().prop_map(Formula::eventually),
            inner.clone().prop_map(Formula::always),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Formula::and(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Formula::or(l, r)),
            (inner.clone(), inner).prop_map(|(l, r)| Formula::until(l, r)),
        ]
    })
}

proptest! {
    /// A shift whose target leaves the grid is false for every subformula.
    #[test]
    fn out_of_bounds_shifts_are_false(
        sub in arb_formula(),
        dir in arb_direction(),
        trace in arb_trace(),
        point in arb_point(),
    ) {
        let shifted = Formula::shift(dir, sub);
        if !BOUNDS.contains(point.offset(dir.shift_delta())) {
            prop_assert!(!evaluate(&shifted, &trace, point, BOUNDS));
        }
    }

    /// An opposite-shift excursion agrees with the subformula whenever the
    /// excursion stays inside the grid, and is false otherwise.
    #[test]
    fn opposite_shifts_round_trip(
        sub in arb_formula(),
        dir in arb_direction(),
        trace in arb_trace(),
        point in arb_point(),
    ) {
        let opposite = match dir {
            Direction::Front => Direction::Back,
            Direction::Back => Direction::Front,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        };
        let composed = Formula::shift(dir, Formula::shift(opposite, sub.clone()));
        let expected = BOUNDS.contains(point.offset(dir.shift_delta()))
            && evaluate(&sub, &trace, point, BOUNDS);
        prop_assert_eq!(evaluate(&composed, &trace, point, BOUNDS), expected);
    }

    /// Finite-trace expansion laws: F φ ≡ φ ∨ X F φ, G φ ≡ φ ∧ (X ⊤ → X G φ),
    /// and φ U ψ ≡ ψ ∨ (φ ∧ X (φ U ψ)).
    #[test]
    fn temporal_expansion_laws_hold(
        lhs in arb_formula(),
        rhs in arb_formula(),
        trace in arb_trace(),
        point in arb_point(),
    ) {
        let eventually = Formula::eventually(lhs.clone());
        let eventually_expanded = Formula::or(lhs.clone(), Formula::next(eventually.clone()));
        prop_assert_eq!(
            evaluate(&eventually, &trace, point, BOUNDS),
            evaluate(&eventually_expanded, &trace, point, BOUNDS),
        );

        let always = Formula::always(lhs.clone());
        let always_expanded = Formula::and(
            lhs.clone(),
            Formula::implies(
                Formula::next(Formula::verum()),
                Formula::next(always.clone()),
            ),
        );
        prop_assert_eq!(
            evaluate(&always, &trace, point, BOUNDS),
            evaluate(&always_expanded, &trace, point, BOUNDS),
        );

        let until = Formula::until(lhs.clone(), rhs.clone());
        let until_expanded = Formula::or(
            rhs,
            Formula::and(lhs, Formula::next(until.clone())),
        );
        prop_assert_eq!(
            evaluate(&until, &trace, point, BOUNDS),
            evaluate(&until_expanded, &trace, point, BOUNDS),
        );
    }

    /// Binding a name and immediately testing it is a tautology.
    #[test]
    fn bind_then_test_is_true(trace in arb_trace(), point in arb_point()) {
        let f = Formula::bind("z9", Formula::nom("z9"));
        prop_assert!(evaluate(&f, &trace, point, BOUNDS));
    }
}
