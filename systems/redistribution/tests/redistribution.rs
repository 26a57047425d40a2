use cave_audit_core::{CellCoord, CellKind, Grid, LevelError};
use cave_audit_system_reachability::reachable_from_spawn;
use cave_audit_system_redistribution::{
    clear_diamonds, redistribute, redistribute_solvable, CandidateScope, ClearedCell,
    RedistributionError, RedistributionOptions, RedistributionPlan,
};

fn grid(rows: &[&str]) -> Grid {
    Grid::parse(&rows.join("\n"))
}

fn assert_only_diamonds_moved(original: &Grid, rewritten: &Grid) {
    let cleared = clear_diamonds(original, ClearedCell::Empty);
    for (coord, cell) in rewritten.cells() {
        if cell == CellKind::Diamond {
            assert!(
                cleared.get(coord).is_some_and(CellKind::is_open_ground),
                "diamond stamped on a non-candidate cell at {coord}",
            );
        } else {
            assert_eq!(Some(cell), cleared.get(coord), "cell changed at {coord}");
        }
    }
}

#[test]
fn cleared_diamonds_become_candidates() {
    let cave = grid(&["WWWWWWW", "W.....W", "W.....W", "WP*EWWW"]);

    let plan = RedistributionPlan::new(&cave, 3, RedistributionOptions::default())
        .expect("enough candidates");

    assert_eq!(plan.candidate_count(), 11);
}

#[test]
fn ten_candidates_three_required_picks_indices_zero_three_six() {
    // Ten dirt cells in row-major order: five on row 1, five on row 2.
    let cave = grid(&["WWWWWWW", "W.....W", "W.....W", "WPWEWWW"]);
    let plan = RedistributionPlan::new(&cave, 3, RedistributionOptions::default())
        .expect("enough candidates");

    assert_eq!(plan.candidate_count(), 10);
    assert_eq!(
        plan.targets(),
        &[
            CellCoord::new(1, 1),
            CellCoord::new(4, 1),
            CellCoord::new(2, 2),
        ]
    );
}

#[test]
fn output_has_exact_count_and_identical_shape() {
    let cave = grid(&[
        "WWWWWWWWWW",
        "W*.. ...*W",
        "W.WW.WW..W",
        "WP..*..E.W",
        "WWW",
    ]);

    for required in 0..=12 {
        let rewritten = redistribute(&cave, required).expect("enough candidates");

        assert_eq!(rewritten.diamond_count(), required);
        assert_eq!(rewritten.shape(), cave.shape());
        assert_only_diamonds_moved(&cave, &rewritten);
    }
}

#[test]
fn input_grid_is_left_untouched() {
    let cave = grid(&["W***W", "W.P.W", "W...W"]);
    let before = cave.clone();

    let _ = redistribute(&cave, 2).expect("enough candidates");

    assert_eq!(cave, before);
}

#[test]
fn repeated_redistribution_is_stable() {
    let cave = grid(&["W***W", "W.P.W", "W...W"]);

    let first = redistribute(&cave, 3).expect("enough candidates");
    let second = redistribute(&first, 3).expect("enough candidates");

    assert_eq!(first.diamond_count(), 3);
    assert_eq!(first, second);
}

#[test]
fn insufficient_space_is_reported() {
    let cave = grid(&["WWWW", "WP.W", "WWWW"]);

    assert_eq!(
        redistribute(&cave, 2),
        Err(RedistributionError::InsufficientSpace {
            available: 1,
            required: 2,
        })
    );
}

#[test]
fn reachable_scope_leaves_nothing_stranded() {
    let cave = grid(&["WWWWWWW", "WP..W..", "W...W..", "WWWWW.."]);
    let options = RedistributionOptions {
        scope: CandidateScope::ReachableFromSpawn,
        cleared_cell: ClearedCell::Dirt,
    };

    let plan = RedistributionPlan::new(&cave, 4, options).expect("enough reachable cells");
    let rewritten = plan.apply();
    let reachability = reachable_from_spawn(&rewritten).expect("spawn present");

    assert_eq!(plan.candidate_count(), 5);
    assert_eq!(reachability.reachable_count(), 4);
    assert_eq!(reachability.unreachable_count(), 0);
}

#[test]
fn solvable_redistribution_replans_when_diamonds_strand() {
    // Five open cells around the spawn, six more in a walled-off pocket.
    let cave = grid(&["WWWWWWW", "WP..W..", "W...W..", "WWWWW.."]);

    let naive = redistribute(&cave, 4).expect("enough candidates");
    assert!(
        reachable_from_spawn(&naive)
            .expect("spawn present")
            .unreachable_count()
            > 0,
        "naive layout should strand diamonds in the sealed pocket",
    );

    let solved = redistribute_solvable(&cave, 4, RedistributionOptions::default())
        .expect("reachable cells suffice");

    assert_eq!(solved.scope, CandidateScope::ReachableFromSpawn);
    assert_eq!(solved.grid.diamond_count(), 4);
    assert_eq!(
        reachable_from_spawn(&solved.grid)
            .expect("spawn present")
            .unreachable_count(),
        0
    );
}

#[test]
fn solvable_redistribution_keeps_first_layout_when_reachable() {
    let cave = grid(&["WWWWW", "WP..W", "W...W", "WWWWW"]);

    let solved = redistribute_solvable(&cave, 2, RedistributionOptions::default())
        .expect("enough candidates");

    assert_eq!(solved.scope, CandidateScope::All);
    assert_eq!(solved.candidate_count, 5);
}

#[test]
fn solvable_redistribution_fails_when_reachable_space_runs_out() {
    let cave = grid(&["WWWWWWWW", "WPW.....", "WWWWWWWW"]);

    assert_eq!(
        redistribute_solvable(&cave, 2, RedistributionOptions::default()),
        Err(RedistributionError::InsufficientSpace {
            available: 0,
            required: 2,
        })
    );
}

#[test]
fn solvable_redistribution_requires_a_spawn() {
    let cave = grid(&["WWWW", "W..W", "WWWW"]);

    assert_eq!(
        redistribute_solvable(&cave, 1, RedistributionOptions::default()),
        Err(RedistributionError::InvalidLevel(LevelError::MissingSpawn))
    );
}
