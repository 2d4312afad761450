use rusqlite::Connection;
use stacknote_core::db::open_db_in_memory;
use stacknote_core::{
    resolve_target_index, Item, ItemId, ItemRepository, RepoError, SqliteItemRepository,
};

fn setup_with_items(labels: &[&str]) -> (Connection, Vec<ItemId>) {
    let conn = open_db_in_memory().unwrap();
    let ids = {
        let repo = SqliteItemRepository::try_new(&conn).unwrap();
        labels
            .iter()
            .map(|label| repo.insert_item(&Item::new(*label)).unwrap().uuid)
            .collect()
    };
    (conn, ids)
}

fn listed_ids(repo: &SqliteItemRepository<'_>) -> Vec<ItemId> {
    repo.list_items()
        .unwrap()
        .into_iter()
        .map(|item| item.uuid)
        .collect()
}

fn listed_ranks(repo: &SqliteItemRepository<'_>) -> Vec<i64> {
    repo.list_items()
        .unwrap()
        .into_iter()
        .map(|item| item.sort_order)
        .collect()
}

#[test]
fn forward_move_shifts_only_the_span_between_source_and_target() {
    let (conn, ids) = setup_with_items(&["a", "b", "c", "d"]);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    // Drag the first row so it lands before the current index 3.
    let moved = repo.reorder_item(0, 3).unwrap();
    assert_eq!(moved, Some(ids[0]));

    assert_eq!(listed_ids(&repo), vec![ids[1], ids[2], ids[0], ids[3]]);
    // b and c each stepped back one rank, a took c's old rank, d untouched.
    assert_eq!(listed_ranks(&repo), vec![0, 1, 2, 3]);
}

#[test]
fn backward_move_shifts_only_the_span_between_target_and_source() {
    let (conn, ids) = setup_with_items(&["a", "b", "c", "d"]);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let moved = repo.reorder_item(2, 0).unwrap();
    assert_eq!(moved, Some(ids[2]));

    assert_eq!(listed_ids(&repo), vec![ids[2], ids[0], ids[1], ids[3]]);
    assert_eq!(listed_ranks(&repo), vec![0, 1, 2, 3]);
}

#[test]
fn moving_first_to_past_the_end_rotates_the_whole_list() {
    let (conn, ids) = setup_with_items(&["a", "b", "c", "d"]);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let moved = repo.reorder_item(0, 4).unwrap();
    assert_eq!(moved, Some(ids[0]));

    assert_eq!(listed_ids(&repo), vec![ids[1], ids[2], ids[3], ids[0]]);
    assert_eq!(listed_ranks(&repo), vec![0, 1, 2, 3]);
}

#[test]
fn moving_last_to_front_rotates_the_whole_list() {
    let (conn, ids) = setup_with_items(&["a", "b", "c", "d"]);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let moved = repo.reorder_item(3, 0).unwrap();
    assert_eq!(moved, Some(ids[3]));

    assert_eq!(listed_ids(&repo), vec![ids[3], ids[0], ids[1], ids[2]]);
    assert_eq!(listed_ranks(&repo), vec![0, 1, 2, 3]);
}

#[test]
fn gestures_that_resolve_to_the_source_are_noops() {
    let (conn, ids) = setup_with_items(&["a", "b", "c"]);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    // Same index, and the slot just after self, both resolve to no move.
    assert_eq!(repo.reorder_item(1, 1).unwrap(), None);
    assert_eq!(repo.reorder_item(1, 2).unwrap(), None);

    assert_eq!(listed_ids(&repo), ids);
    assert_eq!(listed_ranks(&repo), vec![0, 1, 2]);
}

#[test]
fn single_item_gestures_are_noops() {
    let (conn, ids) = setup_with_items(&["only"]);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    assert_eq!(repo.reorder_item(0, 0).unwrap(), None);
    assert_eq!(repo.reorder_item(0, 1).unwrap(), None);

    assert_eq!(listed_ids(&repo), ids);
    assert_eq!(listed_ranks(&repo), vec![0]);
}

#[test]
fn reorder_matches_remove_and_reinsert_for_every_index_pair() {
    let labels = ["a", "b", "c", "d", "e"];

    for source in 0..labels.len() {
        for destination in 0..=labels.len() {
            let (conn, ids) = setup_with_items(&labels);
            let repo = SqliteItemRepository::try_new(&conn).unwrap();

            repo.reorder_item(source, destination).unwrap();

            let mut expected = ids.clone();
            let moved = expected.remove(source);
            expected.insert(resolve_target_index(source, destination), moved);
            assert_eq!(
                listed_ids(&repo),
                expected,
                "source={source} destination={destination}"
            );

            // Ranks come back sorted; rejecting adjacent duplicates proves
            // they stayed pairwise distinct.
            let ranks = listed_ranks(&repo);
            let mut deduped = ranks.clone();
            deduped.dedup();
            assert_eq!(
                ranks, deduped,
                "ranks must stay strictly increasing, source={source} destination={destination}"
            );
        }
    }
}

#[test]
fn reorder_preserves_rank_gaps_left_by_deletes() {
    let (conn, ids) = setup_with_items(&["a", "b", "c", "d", "e"]);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    // Open a gap at rank 2.
    repo.delete_item(ids[2]).unwrap();
    assert_eq!(listed_ranks(&repo), vec![0, 1, 3, 4]);

    // List is now a, b, d, e. Drag a past the end.
    repo.reorder_item(0, 4).unwrap();

    assert_eq!(listed_ids(&repo), vec![ids[1], ids[3], ids[4], ids[0]]);
    // The shifted span slid into the gap; the moved item took rank 4.
    assert_eq!(listed_ranks(&repo), vec![0, 2, 3, 4]);
}

#[test]
fn backward_move_across_a_gap_takes_the_target_slots_old_rank() {
    let (conn, ids) = setup_with_items(&["a", "b", "c", "d"]);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    repo.delete_item(ids[1]).unwrap();
    assert_eq!(listed_ranks(&repo), vec![0, 2, 3]);

    // List is now a, c, d. Drag d in front of c (position 1, old rank 2).
    repo.reorder_item(2, 1).unwrap();

    assert_eq!(listed_ids(&repo), vec![ids[0], ids[3], ids[2]]);
    assert_eq!(listed_ranks(&repo), vec![0, 2, 3]);
}

#[test]
fn ranks_stay_distinct_through_mixed_create_delete_reorder_traffic() {
    let (conn, ids) = setup_with_items(&["a", "b", "c", "d"]);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let assert_distinct = |repo: &SqliteItemRepository<'_>| {
        let ranks = listed_ranks(repo);
        let mut deduped = ranks.clone();
        deduped.dedup();
        assert_eq!(ranks, deduped, "ranks must stay pairwise distinct");
    };

    repo.delete_item(ids[1]).unwrap();
    assert_distinct(&repo);

    let appended = repo.insert_item(&Item::new("e")).unwrap();
    assert_distinct(&repo);

    // List is a, c, d, e. Drag e to the front, then retire a.
    repo.reorder_item(3, 0).unwrap();
    assert_distinct(&repo);
    repo.delete_item(ids[0]).unwrap();
    assert_distinct(&repo);

    // List is e, c, d. Drag e back past the end.
    repo.reorder_item(0, 3).unwrap();
    assert_distinct(&repo);

    assert_eq!(listed_ids(&repo), vec![ids[2], ids[3], appended.uuid]);
    // The vacated low ranks were never reused.
    assert_eq!(listed_ranks(&repo), vec![2, 3, 4]);
}

#[test]
fn out_of_range_indices_fail_before_any_mutation() {
    let (conn, ids) = setup_with_items(&["a", "b", "c"]);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let err = repo.reorder_item(3, 0).unwrap_err();
    assert!(matches!(err, RepoError::InvalidRange { index: 3, len: 3 }));

    let err = repo.reorder_item(0, 4).unwrap_err();
    assert!(matches!(err, RepoError::InvalidRange { index: 4, len: 3 }));

    assert_eq!(listed_ids(&repo), ids);
    assert_eq!(listed_ranks(&repo), vec![0, 1, 2]);
}

#[test]
fn reorder_on_empty_store_is_out_of_range() {
    let (conn, _) = setup_with_items(&[]);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let err = repo.reorder_item(0, 0).unwrap_err();
    assert!(matches!(err, RepoError::InvalidRange { index: 0, len: 0 }));
}

#[test]
fn failed_shift_update_rolls_back_the_whole_reorder() {
    let (conn, ids) = setup_with_items(&["a", "b", "c", "d"]);

    // Force the third rank update to fail after earlier span updates ran.
    conn.execute_batch(&format!(
        "CREATE TRIGGER items_fail_rank_update
         BEFORE UPDATE OF sort_order ON items
         WHEN NEW.uuid = '{}'
         BEGIN
             SELECT RAISE(ABORT, 'forced rank failure');
         END;",
        ids[2]
    ))
    .unwrap();

    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    assert!(repo.reorder_item(0, 4).is_err());

    assert_eq!(listed_ids(&repo), ids);
    assert_eq!(listed_ranks(&repo), vec![0, 1, 2, 3]);
}
