//! Coloured terminal rendering. Kept in its own test binary because the
//! colour override is process-wide.

use curlbench::history::{HistoryOutcome, HistoryTable};
use curlbench::model::{AssertionOutcome, BatchResult, HistoryEntry};
use curlbench::render::{AssertionBlock, BatchTable};
use serde_json::json;

const GREEN: &str = "\u{1b}[32m";
const RED: &str = "\u{1b}[31m";
const RESET: &str = "\u{1b}[0m";

fn force_color() {
    colored::control::set_override(true);
}

#[test]
fn test_composite_outcome_colors_success_and_failure_apart() {
    force_color();
    let outcome = HistoryOutcome::Composite {
        success: 2,
        failure: 1,
        total: 3,
    };

    assert_eq!(
        outcome.styled(),
        format!("{GREEN}2{RESET}/{RED}1{RESET}/3")
    );
    // Plain rendering stays uncoloured.
    assert_eq!(outcome.to_string(), "2/1/3");
}

#[test]
fn test_explicit_outcomes_are_colored() {
    force_color();
    assert_eq!(HistoryOutcome::Passed.styled(), format!("{GREEN}success{RESET}"));
    assert_eq!(HistoryOutcome::Failed.styled(), format!("{RED}failure{RESET}"));
}

#[test]
fn test_history_table_styled_keeps_layout() {
    force_color();
    let entry: HistoryEntry = serde_json::from_value(json!({
        "id": "BATCH1",
        "is_batch": true,
        "total_rows": 3,
        "success_count": 2,
        "failure_count": 1
    }))
    .unwrap();
    let table = HistoryTable::from_entries(&[entry]);

    let styled = table.styled();
    let plain = table.to_string();
    assert!(!plain.contains('\u{1b}'));
    assert_eq!(styled.lines().next(), plain.lines().next());
    assert!(styled
        .lines()
        .nth(1)
        .unwrap()
        .ends_with(&format!("{GREEN}2{RESET}/{RED}1{RESET}/3")));
}

#[test]
fn test_assertion_verdicts_are_colored() {
    force_color();
    let block = AssertionBlock::new(
        &[
            AssertionOutcome {
                assertion: "response.code == 200".to_string(),
                success: true,
                result: Some(true),
                error: None,
            },
            AssertionOutcome {
                assertion: "len(response.body) > 0".to_string(),
                success: false,
                result: Some(false),
                error: None,
            },
        ],
        Some(false),
    );

    let styled = block.styled();
    assert!(styled.contains(&format!("{GREEN}[PASS]{RESET} response.code == 200")));
    assert!(styled.contains(&format!("{RED}[FAIL]{RESET} len(response.body) > 0")));
    assert!(styled.ends_with(&format!("Overall: {RED}some failed{RESET}\n")));
    assert!(!block.to_string().contains('\u{1b}'));
}

#[test]
fn test_batch_badges_are_colored_after_padding() {
    force_color();
    let result: BatchResult = serde_json::from_value(json!({
        "success": true,
        "total_rows": 2,
        "success_count": 1,
        "failure_count": 1,
        "results": [
            {"row_index": 1, "variables": {}, "response": {"code": 200}, "success": true},
            {"row_index": 2, "variables": {}, "error": "boom", "success": false}
        ]
    }))
    .unwrap();
    let table = BatchTable::from_result(&result);

    let styled = table.styled();
    let lines: Vec<&str> = styled.lines().collect();
    assert_eq!(
        lines[0],
        format!("Total: 2  Passed: {GREEN}1{RESET}  Failed: {RED}1{RESET}")
    );
    assert!(lines[2].contains(&format!("{GREEN}passed      {RESET}")));
    assert!(lines[3].contains(&format!("{RED}failed      {RESET}")));
}
