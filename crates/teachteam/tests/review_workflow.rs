use teachteam::store::{self, FileStore, KeyValueStore, FINAL_SELECTED_KEY, TUTOR_APPLICATIONS_KEY};
use teachteam::workflows::applicants::{
    default_applications, Applicant, ApplicantId, ConfirmOutcome, FilterCriteria, Rank,
    ReviewBoard, SortKey,
};

fn open_board(dir: &tempfile::TempDir) -> ReviewBoard<FileStore> {
    let store = FileStore::open(dir.path()).expect("data dir opens");
    ReviewBoard::load(store)
}

fn seeded_board(dir: &tempfile::TempDir) -> (ReviewBoard<FileStore>, Vec<ApplicantId>) {
    let mut board = open_board(dir);
    let ids = default_applications()
        .iter()
        .map(|submission| board.submit(submission).expect("seed submission").id)
        .collect();
    (board, ids)
}

#[test]
fn review_state_survives_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (mut board, ids) = seeded_board(&dir);

    let outcome = board.confirm(ids[1]).expect("confirm succeeds");
    assert_eq!(
        outcome,
        ConfirmOutcome::Confirmed {
            acknowledgment: "Aisha Rahman has been confirmed!".to_string()
        }
    );
    board
        .set_rank(ids[1], Rank::new(2).expect("rank"))
        .expect("rank persists");
    board
        .set_comment(ids[0], "Follow up on AWS experience".to_string())
        .expect("comment persists");
    drop(board);

    let reloaded = open_board(&dir);
    assert_eq!(reloaded.applicants().len(), 5);
    assert_eq!(reloaded.confirmed_ids(), &[ids[1]]);
    assert!(reloaded.is_consistent());
    assert_eq!(
        reloaded.applicant(ids[0]).and_then(|app| app.comment.as_deref()),
        Some("Follow up on AWS experience")
    );

    let snapshot: Vec<Applicant> =
        store::load_collection(&FileStore::open(dir.path()).expect("reopen"), FINAL_SELECTED_KEY);
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].rank.map(Rank::get), Some(2));
    assert!(snapshot[0].is_selected);
}

#[test]
fn confirmed_applicants_never_appear_pending() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (mut board, ids) = seeded_board(&dir);

    for id in [ids[0], ids[4]] {
        board.confirm(id).expect("confirm succeeds");
    }
    assert_eq!(
        board.confirm(ids[0]).expect("repeat confirm"),
        ConfirmOutcome::AlreadyConfirmed
    );

    let pending: Vec<ApplicantId> = board
        .pending_view(&FilterCriteria::default(), Some(SortKey::Course))
        .into_iter()
        .map(|app| app.id)
        .collect();
    assert_eq!(pending, vec![ids[1], ids[2], ids[3]]);
    assert_eq!(board.confirmed().len(), 2);

    assert!(board.unconfirm(ids[0]).expect("unconfirm"));
    assert!(!board.unconfirm(ids[0]).expect("second unconfirm is a no-op"));
    assert!(board
        .pending_view(&FilterCriteria::default(), None)
        .iter()
        .any(|app| app.id == ids[0] && !app.is_selected));
}

#[test]
fn statistics_follow_confirmed_ranks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (mut board, ids) = seeded_board(&dir);

    for (id, rank) in [(ids[2], 7), (ids[3], 1), (ids[4], 4)] {
        board.confirm(id).expect("confirm succeeds");
        board
            .set_rank(id, Rank::new(rank).expect("rank"))
            .expect("rank persists");
    }

    let revision = board.revision();
    let stats = board.statistics().clone();
    assert_eq!(stats.most_chosen.as_ref().map(|app| app.id), Some(ids[3]));
    assert_eq!(stats.least_chosen.as_ref().map(|app| app.id), Some(ids[2]));
    assert_eq!(stats.describe_most_chosen(), "Priya Sharma (Rank: 1)");
    assert_eq!(stats.not_selected.len(), 2);
    assert_eq!(board.revision(), revision);

    board.unconfirm(ids[3]).expect("unconfirm");
    assert_eq!(
        board.statistics().describe_most_chosen(),
        "Tom Walker (Rank: 4)"
    );
}

#[test]
fn corrupt_confirmed_list_is_repaired_on_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (board, ids) = seeded_board(&dir);
    drop(board);

    let store = FileStore::open(dir.path()).expect("reopen");
    let records: Vec<Applicant> = store::load_collection(&store, TUTOR_APPLICATIONS_KEY);
    let mut orphan = records[0].clone();
    orphan.id = ApplicantId(1);
    let confirmed = [records[3].clone(), orphan, records[3].clone()];
    store::save_value(&store, FINAL_SELECTED_KEY, &confirmed).expect("write confirmed list");

    let board = open_board(&dir);
    assert_eq!(board.confirmed_ids(), &[ids[3]]);
    assert!(board.is_consistent());
    assert!(board.applicant(ids[3]).is_some_and(|app| app.is_selected));

    let repaired: Vec<Applicant> = store::load_collection(&store, FINAL_SELECTED_KEY);
    assert_eq!(repaired.len(), 1);
}

#[test]
fn unreadable_applications_fail_closed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::open(dir.path()).expect("data dir opens");
    store
        .set(TUTOR_APPLICATIONS_KEY, "[{\"id\": \"broken\"")
        .expect("write corrupt value");

    let board = ReviewBoard::load(store);
    assert!(board.applicants().is_empty());
    assert!(board.confirmed_ids().is_empty());
}
