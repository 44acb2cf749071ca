use chrono::{NaiveDate, Utc};
use kanbandesk::csv;
use kanbandesk::drag::{self, DragEffect, DragEvent, DragGesture};
use kanbandesk::storage::MemoryStorage;
use kanbandesk::{BoardError, BoardState, BoardStore, Priority, TicketDraft};
use proptest::prelude::*;

fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::High),
        Just(Priority::Medium),
        Just(Priority::Low),
    ]
}

fn text_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ,\"'.\r\n-]{0,24}"
}

fn tag_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9,-]{1,8}"
}

fn board_with_columns(columns: &[usize]) -> BoardState {
    let mut board = BoardState::default_board();
    for (idx, col) in columns.iter().enumerate() {
        let column_id = (col % 4 + 1).to_string();
        board.tickets.push(
            TicketDraft::new(format!("t{}", idx)).into_ticket(format!("t{}", idx), column_id, Utc::now()),
        );
    }
    board
}

proptest! {
    #[test]
    fn drag_end_reorder_is_a_permutation(
        columns in prop::collection::vec(0usize..4, 2..24),
        active_pick in any::<prop::sample::Index>(),
        over_pick in any::<prop::sample::Index>(),
    ) {
        let board = board_with_columns(&columns);
        let active = board.tickets[active_pick.index(board.tickets.len())].clone();
        let in_column: Vec<String> = board.tickets_in(&active.column_id).map(|t| t.id.clone()).collect();
        let over = in_column[over_pick.index(in_column.len())].clone();
        let over_position = in_column.iter().position(|id| *id == over).unwrap();

        let (gesture, _) = drag::step(DragGesture::Idle, DragEvent::Start { active: active.id.clone() }, &board);
        let (gesture, effect) = drag::step(gesture, DragEvent::End { over: Some(over.clone()) }, &board);
        prop_assert!(gesture.is_idle());

        if over == active.id {
            prop_assert_eq!(effect, None);
        } else {
            let Some(DragEffect::Reorder { column_id, ticket_ids }) = effect else {
                return Err(TestCaseError::fail("expected a reorder"));
            };
            prop_assert_eq!(&column_id, &active.column_id);
            let mut before = in_column.clone();
            let mut after = ticket_ids.clone();
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
            prop_assert_eq!(&ticket_ids[over_position], &active.id);

            let mut store = BoardStore::open(MemoryStorage::with_board(board.clone()));
            store.reorder_column(&column_id, &ticket_ids).unwrap();
            let others_before: Vec<&str> = board.tickets.iter().filter(|t| t.column_id != column_id).map(|t| t.id.as_str()).collect();
            let others_after: Vec<&str> = store.board().tickets.iter().filter(|t| t.column_id != column_id).map(|t| t.id.as_str()).collect();
            prop_assert_eq!(others_before, others_after);
        }
    }

    #[test]
    fn drag_over_is_idempotent_once_applied(
        columns in prop::collection::vec(0usize..4, 1..12),
        active_pick in any::<prop::sample::Index>(),
        target in 1usize..=4,
    ) {
        let mut store = BoardStore::open(MemoryStorage::with_board(board_with_columns(&columns)));
        let active = store.board().tickets[active_pick.index(columns.len())].id.clone();
        let over = target.to_string();

        if let Some(DragEffect::MoveToColumn { ticket_id, column_id }) =
            drag::cross_column_move(store.board(), &active, &over)
        {
            store.move_ticket_to_column(&ticket_id, &column_id).unwrap();
        }
        prop_assert_eq!(&store.board().ticket(&active).unwrap().column_id, &over);
        prop_assert_eq!(drag::cross_column_move(store.board(), &active, &over), None);
    }

    #[test]
    fn csv_round_trip_keeps_exported_fields(
        title in "[A-Za-z0-9][A-Za-z0-9 ,\"'.\n-]{0,23}[A-Za-z0-9]",
        assignee in text_strategy(),
        customer in text_strategy(),
        priority in priority_strategy(),
        due in prop::option::of(0u32..3000),
        tags in prop::collection::vec(tag_strategy(), 0..4),
        column in 1usize..=4,
    ) {
        let due_date = due.and_then(|days| NaiveDate::from_ymd_opt(2020, 1, 1).map(|d| d + chrono::Days::new(days as u64)));
        let has_comma_tag = tags.iter().any(|t| t.contains(','));
        let mut store = BoardStore::open(MemoryStorage::new());
        let added = store.add_ticket(
            TicketDraft {
                assignee: assignee.clone(),
                customer: customer.clone(),
                priority,
                due_date,
                tags,
                ..TicketDraft::new(title)
            },
            &column.to_string(),
        );
        if has_comma_tag {
            prop_assert!(matches!(added, Err(BoardError::Validation(_))));
            prop_assert!(store.board().tickets.is_empty());
            return Ok(());
        }
        let original = added.unwrap();

        let board = store.board();
        let text = csv::encode(&board.tickets, &board.columns);
        let decoded = csv::decode(&text, &board.columns).unwrap();
        prop_assert_eq!(decoded.len(), 1);
        let back = &decoded[0];
        prop_assert_eq!(&back.title, &original.title);
        prop_assert_eq!(back.priority, original.priority);
        prop_assert_eq!(&back.assignee, &original.assignee);
        prop_assert_eq!(&back.customer, &original.customer);
        prop_assert_eq!(back.due_date, original.due_date);
        prop_assert_eq!(&back.tags, &original.tags);
        prop_assert_eq!(&back.column_id, &original.column_id);
    }
}
