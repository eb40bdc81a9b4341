use margay_dsl::parse;
use margay_engine::{run, EngineError, EngineMode, RunOptions};
use margay_ir::trace::{GridBounds, Point};

fn options(
    props: &[&str],
    agents: &[&str],
    assumptions: &[&str],
    conclusions: &[&str],
    bounds: GridBounds,
    max_len: usize,
    engine: EngineMode,
) -> RunOptions {
    RunOptions {
        propositions: props.iter().map(|s| s.to_string()).collect(),
        agents: agents.iter().map(|s| s.to_string()).collect(),
        assumptions: assumptions.iter().map(|s| parse(s).unwrap()).collect(),
        conclusions: conclusions.iter().map(|s| parse(s).unwrap()).collect(),
        bounds,
        max_trace_length: max_len,
        engine,
        record_witnesses: false,
    }
}

#[test]
fn an_empty_conclusion_set_is_a_configuration_error() {
    let opts = options(&[], &["z1"], &[], &[], GridBounds::new(2, 2), 1, EngineMode::Pruned);
    assert!(matches!(run(&opts), Err(EngineError::NoConclusions)));
}

#[test]
fn a_zero_trace_bound_is_a_configuration_error() {
    let opts = options(&[], &["z1"], &[], &["1"], GridBounds::new(2, 2), 0, EngineMode::Pruned);
    assert!(matches!(run(&opts), Err(EngineError::ZeroTraceLength)));
}

#[test]
fn contradictory_offsets_abort_the_run_before_any_search() {
    // z2 one row up from z1 and z1 one row up from z2 cannot both hold.
    let opts = options(
        &[],
        &["z1", "z2"],
        &["G @z1 Front z2", "G @z2 Front z1"],
        &["1"],
        GridBounds::new(3, 3),
        2,
        EngineMode::Pruned,
    );
    assert!(matches!(run(&opts), Err(EngineError::Kinematics(_))));
}

#[test]
fn baseline_counts_match_the_closed_form() {
    // 2x2 grid, one proposition, one agent, length 1: 16 * 4 = 64 traces.
    let opts = options(
        &["a"],
        &["z1"],
        &[],
        &["F a"],
        GridBounds::new(2, 2),
        1,
        EngineMode::Baseline,
    );
    let report = run(&opts).unwrap();
    assert_eq!(report.traces_generated, 64);
    // F a fails only for the empty region: 1 of 16 subsets, 4 agent cells.
    assert_eq!(report.traces_satisfying, 60);
}

#[test]
fn pruned_and_baseline_agree_without_kinematic_assumptions() {
    for (max_len, conclusion) in [(1, "F a"), (2, "a U z1")] {
        let baseline = run(&options(
            &["a"],
            &["z1"],
            &[],
            &[conclusion],
            GridBounds::new(2, 2),
            max_len,
            EngineMode::Baseline,
        ))
        .unwrap();
        let pruned = run(&options(
            &["a"],
            &["z1"],
            &[],
            &[conclusion],
            GridBounds::new(2, 2),
            max_len,
            EngineMode::Pruned,
        ))
        .unwrap();
        assert_eq!(baseline.traces_generated, pruned.traces_generated);
        assert_eq!(baseline.traces_satisfying, pruned.traces_satisfying);
    }
}

#[test]
fn pruning_preserves_the_satisfying_count_under_offset_assumptions() {
    // The pruned engine consumes the offset relation during generation; the
    // baseline folds it into the checked conjunction. Same satisfying count,
    // far fewer candidates on the pruned side.
    let assumptions = &["G @z1 (Left z2)"];
    let conclusions = &["1"];
    let baseline = run(&options(
        &[],
        &["z1", "z2"],
        assumptions,
        conclusions,
        GridBounds::new(2, 2),
        2,
        EngineMode::Baseline,
    ))
    .unwrap();
    let pruned = run(&options(
        &[],
        &["z1", "z2"],
        assumptions,
        conclusions,
        GridBounds::new(2, 2),
        2,
        EngineMode::Pruned,
    ))
    .unwrap();

    assert_eq!(baseline.traces_generated, 16 + 256);
    assert_eq!(pruned.traces_generated, 2 + 4);
    assert_eq!(baseline.traces_satisfying, 6);
    assert_eq!(pruned.traces_satisfying, 6);
}

#[test]
fn pruning_preserves_the_satisfying_count_under_state_only_assumptions() {
    // `G @z1 a` matches no kinematic pattern; the pruned engine enforces it
    // by evaluating every candidate snapshot.
    let assumptions = &["G @z1 a"];
    let conclusions = &["1"];
    let baseline = run(&options(
        &["a"],
        &["z1"],
        assumptions,
        conclusions,
        GridBounds::new(2, 1),
        2,
        EngineMode::Baseline,
    ))
    .unwrap();
    let pruned = run(&options(
        &["a"],
        &["z1"],
        assumptions,
        conclusions,
        GridBounds::new(2, 1),
        2,
        EngineMode::Pruned,
    ))
    .unwrap();

    assert_eq!(baseline.traces_generated, 8 + 64);
    assert_eq!(pruned.traces_generated, 4 + 16);
    assert_eq!(baseline.traces_satisfying, 20);
    assert_eq!(pruned.traces_satisfying, 20);
}

#[test]
fn witnesses_carry_their_satisfying_points() {
    let mut opts = options(
        &[],
        &["z", "z1"],
        &[],
        &["G (@z z1)"],
        GridBounds::new(2, 2),
        1,
        EngineMode::Baseline,
    );
    opts.record_witnesses = true;
    let report = run(&opts).unwrap();

    assert_eq!(report.traces_generated, 16);
    // The two nominals coincide in 4 of the 16 states, and the formula is
    // point-independent: every witness lists the whole grid.
    assert_eq!(report.traces_satisfying, 4);
    assert_eq!(report.witnesses.len(), 4);
    let all_points: Vec<Point> = GridBounds::new(2, 2).points().collect();
    for witness in &report.witnesses {
        assert_eq!(witness.points, all_points);
        let state = witness.trace.state(0);
        assert_eq!(state.agent("z"), state.agent("z1"));
    }
}

#[test]
fn static_agents_are_frozen_across_the_whole_run() {
    let mut opts = options(
        &[],
        &["z1"],
        &["@z1 ↓z0 (G @z1 (z0))"],
        &["G z1 | 1"],
        GridBounds::new(2, 2),
        3,
        EngineMode::Pruned,
    );
    opts.record_witnesses = true;
    let report = run(&opts).unwrap();
    // 4 starts, each extending along a single frozen path: 4 + 4 + 4.
    assert_eq!(report.traces_generated, 12);
    assert_eq!(report.traces_satisfying, 12);
    for witness in &report.witnesses {
        let origin = witness.trace.state(0).agent("z1");
        for state in &witness.trace.states {
            assert_eq!(state.agent("z1"), origin);
        }
    }
}
