use std::collections::BTreeSet;

use cave_audit_core::{CellCoord, Grid, LevelError};
use cave_audit_system_reachability::reachable_from_spawn;

fn grid(rows: &[&str]) -> Grid {
    Grid::parse(&rows.join("\n"))
}

#[test]
fn diamond_in_open_column_is_reachable() {
    let cave = grid(&["WWWWW", "W.P.W", "W.*.W", "WWWWW"]);

    let result = reachable_from_spawn(&cave).expect("spawn present");

    assert_eq!(result.spawn(), CellCoord::new(2, 1));
    assert_eq!(
        result.reachable_diamonds(),
        &BTreeSet::from([CellCoord::new(2, 2)])
    );
    assert_eq!(result.unreachable_count(), 0);
}

#[test]
fn diamond_behind_wall_is_unreachable() {
    let cave = grid(&["WWWWW", "W.P.W", "*W..W", "WWWWW"]);

    let result = reachable_from_spawn(&cave).expect("spawn present");

    assert!(result.reachable_diamonds().is_empty());
    assert_eq!(result.total_diamonds(), 1);
    assert_eq!(result.unreachable_count(), 1);
}

#[test]
fn missing_spawn_is_an_error_not_zero_reachable() {
    let cave = grid(&["WWW", "W*W", "WWW"]);

    assert_eq!(reachable_from_spawn(&cave), Err(LevelError::MissingSpawn));
}

#[test]
fn spawn_without_diamonds_reports_zero_reachable() {
    let cave = grid(&["WWW", "WPW", "WWW"]);

    let result = reachable_from_spawn(&cave).expect("spawn present");

    assert_eq!(result.reachable_count(), 0);
    assert_eq!(result.unreachable_count(), 0);
    assert_eq!(result.visited().len(), 1);
}

#[test]
fn traversal_is_deterministic() {
    let cave = grid(&["P.*. ", ".WWW*", "*. .E"]);

    let first = reachable_from_spawn(&cave).expect("spawn present");
    let second = reachable_from_spawn(&cave).expect("spawn present");

    assert_eq!(first, second);
    assert_eq!(first.reachable_count(), 3);
}
