use cave_audit_core::{CellCoord, Grid};
use cave_audit_system_reachability::reachable_from_spawn;
use cave_audit_system_sealed::{sealed_diamonds, SealReason, SealedDetector};

fn grid(rows: &[&str]) -> Grid {
    Grid::parse(&rows.join("\n"))
}

#[test]
fn sealed_flag_agrees_with_flood_fill_for_walled_off_diamond() {
    let cave = grid(&["WWWWW", "W.P.W", "*W..W", "WWWWW"]);

    let findings = sealed_diamonds(&cave);
    let reachability = reachable_from_spawn(&cave).expect("spawn present");

    assert!(
        findings
            .iter()
            .any(|finding| finding.coord == CellCoord::new(0, 2)
                && finding.reason == SealReason::FullySealed),
        "diamond behind the wall must be flagged as fully sealed: {findings:?}",
    );
    assert_eq!(reachability.unreachable_count(), 1);
    assert!(!reachability.is_reachable(CellCoord::new(0, 2)));
}

#[test]
fn heavily_walled_diamond_can_still_be_reachable() {
    let cave = grid(&["WWWWW", "WW*PW", "WWWWW"]);

    let findings = sealed_diamonds(&cave);
    let reachability = reachable_from_spawn(&cave).expect("spawn present");

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].reason, SealReason::HeavilyWalled { walls: 7 });
    assert_eq!(
        reachability.unreachable_count(),
        0,
        "flags are advisory and must not be read as unreachability",
    );
}

#[test]
fn threshold_is_configurable() {
    let cave = grid(&["WWWW", "W*.W", "W..W", "WWWW"]);

    assert!(sealed_diamonds(&cave).is_empty());

    let strict = SealedDetector::new(5).inspect(&cave);
    assert_eq!(
        strict
            .iter()
            .map(|finding| finding.reason)
            .collect::<Vec<_>>(),
        vec![SealReason::HeavilyWalled { walls: 5 }]
    );
}
