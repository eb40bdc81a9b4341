//! Named road-safety scenarios: concrete propositions, agents, assumption
//! and conclusion formulas for the experiments the checker was built around.

use margay_ir::trace::GridBounds;

/// A fully specified run, formulas still in text form.
pub struct Scenario {
    pub propositions: Vec<String>,
    pub agents: Vec<String>,
    pub assumptions: Vec<String>,
    pub conclusions: Vec<String>,
    pub bounds: GridBounds,
    pub max_trace_length: usize,
}

pub const SCENARIO_NAMES: &[&str] = &[
    "left-right",
    "same-name",
    "one-lane-follow",
    "hazard",
    "safe-intersection",
    "safe-passing",
    "join-platoon",
];

/// Build a scenario by name. `road_length` doubles as the square grid size
/// for `safe-intersection`; `platoon_size` only affects `join-platoon`.
pub fn build(
    name: &str,
    duration: usize,
    road_length: i64,
    platoon_size: usize,
) -> Option<Scenario> {
    match name {
        "left-right" => Some(left_right(duration)),
        "same-name" => Some(same_name(duration)),
        "one-lane-follow" => Some(one_lane_follow(duration, road_length)),
        "hazard" => Some(hazard(duration)),
        "safe-intersection" => Some(safe_intersection(duration, road_length)),
        "safe-passing" => Some(safe_passing(duration, road_length)),
        "join-platoon" => Some(join_platoon(duration, platoon_size, road_length)),
        _ => None,
    }
}

/// Spatial validity: swapping opposite shifts agrees everywhere.
fn left_right(duration: usize) -> Scenario {
    Scenario {
        propositions: vec![],
        agents: vec!["z".into()],
        assumptions: vec![],
        conclusions: vec!["G(Left(Right(z)) <-> Right(Left(z)))".into()],
        bounds: GridBounds::new(3, 3),
        max_trace_length: duration,
    }
}

/// Hybrid sanity check: two nominals forced onto the same cell.
fn same_name(duration: usize) -> Scenario {
    Scenario {
        propositions: vec![],
        agents: vec!["z".into(), "z1".into()],
        assumptions: vec![],
        conclusions: vec!["G (@z z1)".into()],
        bounds: GridBounds::new(3, 3),
        max_trace_length: duration,
    }
}

/// Can the subject vehicle safely follow another down a one-lane road?
fn one_lane_follow(duration: usize, road_length: i64) -> Scenario {
    Scenario {
        propositions: vec![],
        agents: vec!["z0".into(), "z1".into()],
        assumptions: vec![
            // SV starts at the start of the lane.
            "@z0 !(Back 1)".into(),
            // POV always moves forward or stays put.
            "G (@z1 ↓z2 ((! X 1) | X @z1 (z2 | Back z2)))".into(),
            // SV moves forward when safe, stays put if POV is immediately ahead.
            "G (@z0 ↓z2 ((! X 1) | X (@z0 ((!z1 & Back z2) | (z2 & Front z1)))))".into(),
        ],
        conclusions: vec!["G(!(@z0 z1))".into()],
        bounds: GridBounds::new(road_length, 1),
        max_trace_length: duration,
    }
}

/// Can the vehicle dodge a static hazard while another vehicle is around?
fn hazard(duration: usize) -> Scenario {
    let length = 2usize;

    fn fronts(i: usize, p: &str) -> String {
        if i == 0 {
            format!("({p})")
        } else {
            format!("(Front {})", fronts(i - 1, p))
        }
    }
    let bfront = |p: &str| {
        let each: Vec<String> = (0..length)
            .map(|i| format!("(({})->({}))", fronts(i + 1, "1"), fronts(i + 1, p)))
            .collect();
        format!("({})", each.join("&"))
    };
    let dfront = |p: &str| {
        let each: Vec<String> = (0..length).map(|i| fronts(i + 1, p)).collect();
        format!("({})", each.join("|"))
    };

    let p1 = format!("(Right z1) & {}", dfront("G h"));
    let p2 = "(@z0 ↓z2 X @z0 ((Back z2) & (G ! h)))";
    let p3 = format!(
        "(@z0 ↓z2 X @z0((Left z2) & {} & {}))",
        dfront("z1"),
        bfront("G ! h")
    );
    let full = format!("@z0 (({p1}) & (({p2}) U ({p3})))");

    Scenario {
        propositions: vec!["h".into()],
        agents: vec!["z0".into(), "z1".into()],
        assumptions: vec![],
        conclusions: vec![full],
        bounds: GridBounds::new(length as i64, 2),
        max_trace_length: duration,
    }
}

/// Can the vehicle cross an intersection while yielding priority?
fn safe_intersection(duration: usize, grid_size: i64) -> Scenario {
    Scenario {
        propositions: vec![],
        agents: vec!["z0".into(), "z1".into()],
        assumptions: vec![
            // z1 starts somewhere on the left border, z0 on the bottom border.
            "@z1 !(Left 1)".into(),
            "@z0 !(Back 1)".into(),
            // z1 always moves left-to-right.
            "G (@z1 ↓z2 ((! X 1)| X @z1 (Left z2)))".into(),
            // z0 moves bottom-to-top except it stops to avoid the other vehicle.
            "G (@z0 ↓z2 ((! X 1)| X @z0 ((!z1 & Back z2) | (z2 & Front z1))))".into(),
        ],
        conclusions: vec!["G(!(@z0 z1))".into()],
        bounds: GridBounds::new(grid_size, grid_size),
        max_trace_length: duration,
    }
}

/// Speed-up and swerve maneuvers around a slower vehicle.
fn safe_passing(duration: usize, road_length: i64) -> Scenario {
    let first_forward = "(@z0 ↓z2 ((! X 1) | X @z0 (Back z2)))";
    let dodge_left = "(@z0 ↓z2 ((Front z1) & ((! X 1)| X (@z0 (Back (Right z2))))))";
    let fast_forward = "(@z0 ↓z2 ((! X 1)| X @z0 (Back (Back z2))))";
    let dodge_right = "(@z0 ↓z2 ((! X 1)| X @z0 (Back (Left z2))))";
    let last_forward = "(@z0 ↓z2 ((! X 1) | X @z0 (Back z2)))";
    let maneuver = format!(
        "({first_forward} U ({dodge_left} & ((! X 1) | X ({fast_forward} & ((! X 1) | X \
         ({fast_forward} U ({dodge_right} & ((! X 1) | X G ({last_forward})))))))))"
    );

    Scenario {
        propositions: vec![],
        agents: vec!["z0".into(), "z1".into()],
        assumptions: vec![
            // POV starts anywhere in the right lane and stays there.
            "G(@z1 !(Right 1))".into(),
            // SV starts at the back of the right lane.
            "@z0 !(Right 1)".into(),
            "@z0 !(Back 1)".into(),
            // POV moves forward or stays in place.
            "G (@z1 ↓z2 ((! X 1) | X @z1 (z2 | Back z2)))".into(),
            maneuver,
        ],
        conclusions: vec!["G(!(@z0 z1))".into()],
        bounds: GridBounds::new(road_length, 2),
        max_trace_length: duration,
    }
}

/// Safe joining of a vehicle into a platoon in the neighbouring lane.
fn join_platoon(duration: usize, platoon_size: usize, road_length: i64) -> Scenario {
    let pov_noms: Vec<String> = (0..platoon_size).map(|i| format!("z{}", i + 1)).collect();
    let mut agents = vec!["z0".to_string()];
    agents.extend(pov_noms.iter().cloned());

    let no_collide = format!("!({})", pov_noms.join("|"));
    let some_front = pov_noms
        .iter()
        .map(|n| format!("Front {n}"))
        .collect::<Vec<_>>()
        .join("|");
    let sv_mov = format!(
        "G(@z0 ↓z ((! X 1) | (X @z0((Back z)|(({some_front})&(Right z)&({no_collide}))))))"
    );
    let sv_start = "@z0 !(Right 1)".to_string();
    let pov_starts: Vec<String> = (0..platoon_size)
        .map(|i| format!("G(@z{} !(Left 1))", i + 1))
        .collect();
    let pov_moves: Vec<String> = (0..platoon_size)
        .map(|i| format!("G(@z{0} ↓z ((! X 1) | X (@z{0} (Back z))))", i + 1))
        .collect();

    let mut assumptions = vec![sv_start, sv_mov];
    assumptions.extend(pov_moves);
    assumptions.extend(pov_starts);

    Scenario {
        propositions: vec![],
        agents,
        assumptions,
        conclusions: vec![format!("G(@z0 ({no_collide}))")],
        bounds: GridBounds::new(road_length, 2),
        max_trace_length: duration,
    }
}
