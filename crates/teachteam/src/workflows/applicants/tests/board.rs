use super::common::*;
use crate::store::{self, KeyValueStore, MemoryStore, FINAL_SELECTED_KEY, TUTOR_APPLICATIONS_KEY};
use crate::workflows::applicants::board::{ConfirmOutcome, ReviewBoard, ReviewError};
use crate::workflows::applicants::domain::{Applicant, ApplicantId, Availability, Rank};
use crate::workflows::applicants::stats::ApplicantStats;
use crate::workflows::applicants::view::FilterCriteria;

fn seeded_board() -> (MemoryStore, ReviewBoard<MemoryStore>) {
    let store = MemoryStore::new();
    store::save_value(&store, TUTOR_APPLICATIONS_KEY, &cohort()).expect("seed store");
    let board = ReviewBoard::load(store.clone());
    (store, board)
}

#[test]
fn confirm_is_idempotent() {
    let (_, mut board) = seeded_board();
    let id = ApplicantId(2);

    match board.confirm(id).expect("first confirm") {
        ConfirmOutcome::Confirmed { acknowledgment } => {
            assert_eq!(acknowledgment, "Aisha Rahman has been confirmed!")
        }
        other => panic!("expected confirmation, got {other:?}"),
    }
    assert_eq!(
        board.confirm(id).expect("second confirm"),
        ConfirmOutcome::AlreadyConfirmed
    );

    let occurrences = board
        .confirmed_ids()
        .iter()
        .filter(|confirmed| **confirmed == id)
        .count();
    assert_eq!(occurrences, 1);
    assert!(board.is_consistent());
}

#[test]
fn unconfirm_round_trip_restores_pending_state() {
    let (_, mut board) = seeded_board();
    let before: Vec<Applicant> = board.applicants().to_vec();
    let id = ApplicantId(3);

    board.confirm(id).expect("confirm");
    assert!(board.applicant(id).expect("present").is_selected);

    assert!(board.unconfirm(id).expect("unconfirm"));
    assert!(!board.is_confirmed(id));
    assert!(!board.applicant(id).expect("present").is_selected);
    assert_eq!(board.applicants(), before.as_slice());
    assert!(board.is_consistent());

    assert!(!board.unconfirm(id).expect("second unconfirm is a no-op"));
}

#[test]
fn confirm_unknown_applicant_is_not_found() {
    let (_, mut board) = seeded_board();
    match board.confirm(ApplicantId(999)) {
        Err(ReviewError::NotFound(ApplicantId(999))) => {}
        other => panic!("expected not found, got {other:?}"),
    }
    assert!(board.confirmed_ids().is_empty());
}

#[test]
fn confirmed_applicant_never_appears_in_pending_view() {
    let (_, mut board) = seeded_board();
    let id = ApplicantId(1);
    board.confirm(id).expect("confirm");

    let criteria = FilterCriteria {
        name: "Ming".to_string(),
        skill: "react".to_string(),
        ..FilterCriteria::course("COSC2020")
    };
    assert!(board.pending_view(&criteria, None).is_empty());
    let confirmed: Vec<ApplicantId> = board
        .confirmed_view(&criteria)
        .iter()
        .map(|applicant| applicant.id)
        .collect();
    assert_eq!(confirmed, vec![id]);
}

#[test]
fn toggle_leaves_confirmed_applicants_selected() {
    let (_, mut board) = seeded_board();
    let id = ApplicantId(4);
    board.confirm(id).expect("confirm");

    assert_eq!(board.toggle_selected(id).expect("toggle"), Some(true));
    assert!(board.is_consistent());

    assert_eq!(board.toggle_selected(ApplicantId(5)).expect("toggle"), Some(true));
    assert_eq!(board.toggle_selected(ApplicantId(5)).expect("toggle"), Some(false));
    assert_eq!(board.toggle_selected(ApplicantId(404)).expect("toggle"), None);
}

#[test]
fn confirmation_survives_reload_with_current_rank() {
    let (store, mut board) = seeded_board();
    let id = ApplicantId(2);
    board.confirm(id).expect("confirm");
    board
        .set_rank(id, Rank::new(2).expect("rank"))
        .expect("set rank");
    board
        .set_comment(id, "Excellent SQL tutorials")
        .expect("set comment");

    let snapshots: Vec<Applicant> = store::load_collection(&store, FINAL_SELECTED_KEY);
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].rank.map(Rank::get), Some(2));
    assert_eq!(snapshots[0].comment.as_deref(), Some("Excellent SQL tutorials"));

    let reloaded = ReviewBoard::load(store);
    assert_eq!(reloaded.confirmed_ids(), &[id][..]);
    assert!(reloaded.applicant(id).expect("present").is_selected);
    assert!(reloaded.is_consistent());
}

#[test]
fn load_repairs_inconsistent_confirmed_list() {
    let store = MemoryStore::new();
    let records = cohort();
    store::save_value(&store, TUTOR_APPLICATIONS_KEY, &records).expect("seed applications");

    let orphan = applicant(77, "Ghost", "Applicant", "COSC1010", Availability::PartTime, "SQL");
    let unflagged = records[2].clone();
    store::save_value(
        &store,
        FINAL_SELECTED_KEY,
        &vec![orphan, unflagged.clone(), unflagged.clone()],
    )
    .expect("seed confirmed");

    let board = ReviewBoard::load(store.clone());
    assert_eq!(board.confirmed_ids(), &[unflagged.id][..]);
    assert!(board.is_consistent());

    let persisted: Vec<Applicant> = store::load_collection(&store, FINAL_SELECTED_KEY);
    assert_eq!(persisted.len(), 1);
    assert!(persisted[0].is_selected);
}

#[test]
fn malformed_confirmed_list_loads_empty() {
    let (store, _) = seeded_board();
    store
        .set(FINAL_SELECTED_KEY, "[{\"id\":\"oops\"}]")
        .expect("set succeeds");

    let board = ReviewBoard::load(store);
    assert!(board.confirmed_ids().is_empty());
    assert_eq!(board.applicants().len(), cohort().len());
}

#[test]
fn statistics_recompute_after_mutations() {
    let (_, mut board) = seeded_board();
    assert!(board.statistics().most_chosen.is_none());
    let initial_revision = board.revision();

    board.confirm(ApplicantId(1)).expect("confirm");
    board
        .set_rank(ApplicantId(1), Rank::new(6).expect("rank"))
        .expect("rank");
    assert!(board.revision() > initial_revision);

    let stats = board.statistics().clone();
    assert_eq!(stats.most_chosen.map(|a| a.id), Some(ApplicantId(1)));
    assert_eq!(stats.not_selected.len(), 4);

    board.unconfirm(ApplicantId(1)).expect("unconfirm");
    assert!(board.statistics().most_chosen.is_none());
    assert_eq!(board.statistics().not_selected.len(), 5);
}

#[test]
fn failed_confirm_write_is_reported() {
    let store = FlakyStore::default();
    store::save_value(store.inner(), TUTOR_APPLICATIONS_KEY, &cohort()).expect("seed store");
    let mut board = ReviewBoard::load(store.clone());

    store.fail_writes(true);
    assert!(matches!(
        board.confirm(ApplicantId(1)),
        Err(ReviewError::Repository(_))
    ));
    assert!(board.is_consistent());
}

#[test]
fn statistics_follow_in_memory_state_after_failed_writes() {
    let store = FlakyStore::default();
    store::save_value(store.inner(), TUTOR_APPLICATIONS_KEY, &cohort()).expect("seed store");
    let mut board = ReviewBoard::load(store.clone());
    assert_eq!(board.statistics().not_selected.len(), 5);

    store.fail_writes(true);
    assert!(board.confirm(ApplicantId(1)).is_err());
    assert!(board.toggle_selected(ApplicantId(2)).is_err());
    assert!(board
        .set_rank(ApplicantId(1), Rank::new(3).expect("rank"))
        .is_err());

    let fresh = ApplicantStats::compute(board.applicants(), board.confirmed_ids());
    assert_eq!(fresh.not_selected.len(), 3);
    assert_eq!(board.statistics(), &fresh);
    assert_eq!(
        board.statistics().most_chosen.as_ref().map(|app| app.id),
        Some(ApplicantId(1))
    );
}
