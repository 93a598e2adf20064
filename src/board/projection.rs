//! Board projection: preview collection -> ordered lanes

use super::engine::BoardState;
use crate::models::{Column, Lead, COLUMNS};

/// Everything a card renders. Used whole as the list key, so a refresh
/// that edits a lead rebuilds its card.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardView {
    pub lead: Lead,
    /// Card being dragged (rendered faded)
    pub dragging: bool,
    /// Status write in flight (actions disabled)
    pub updating: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    pub column: Column,
    pub cards: Vec<CardView>,
}

impl ColumnView {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Six lanes in display order, each listing the preview leads of its status
pub fn project(board: &BoardState) -> Vec<ColumnView> {
    let dragging = board.dragging();
    COLUMNS
        .iter()
        .map(|column| ColumnView {
            column: *column,
            cards: board
                .preview()
                .iter()
                .filter(|lead| lead.status == column.status)
                .map(|lead| CardView {
                    dragging: dragging == Some(lead.id.as_str()),
                    updating: board.is_updating(&lead.id),
                    lead: lead.clone(),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadStatus;

    fn lead(id: &str, status: LeadStatus) -> Lead {
        Lead {
            id: id.to_string(),
            client_name: id.to_string(),
            phone: None,
            last_contact: None,
            appointment_date: None,
            appointment_time: None,
            status,
            notes: None,
            clinic_id: None,
        }
    }

    fn lane<'a>(view: &'a [ColumnView], id: &str) -> Vec<&'a str> {
        view.iter()
            .find(|c| c.column.id() == id)
            .map(|c| c.cards.iter().map(|card| card.lead.id.as_str()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_lanes_in_order() {
        let mut board = BoardState::new();
        board.load(vec![
            lead("a", LeadStatus::New),
            lead("b", LeadStatus::Canceled),
            lead("c", LeadStatus::New),
            lead("p", LeadStatus::Pending),
        ]);
        let view = project(&board);
        let order: Vec<&str> = view.iter().map(|c| c.column.id()).collect();
        assert_eq!(order, vec!["new", "in-attendance", "contacted", "no-show", "to-reschedule", "canceled"]);
        assert_eq!(lane(&view, "new"), vec!["a", "c"]);
        assert_eq!(lane(&view, "canceled"), vec!["b"]);
        assert!(view[1].is_empty());
        // Pending has no lane
        assert_eq!(view.iter().map(|c| c.cards.len()).sum::<usize>(), 3);
    }

    #[test]
    fn test_dragged_card_jumps_lane() {
        let mut board = BoardState::new();
        board.load(vec![lead("a", LeadStatus::New), lead("b", LeadStatus::New)]);
        board.begin_drag("a");
        board.preview_move("a", "no-show");
        let view = project(&board);
        assert_eq!(lane(&view, "new"), vec!["b"]);
        assert_eq!(lane(&view, "no-show"), vec!["a"]);
        let card = &view[3].cards[0];
        assert!(card.dragging);
        assert!(!card.updating);
    }

    #[test]
    fn test_updating_flag() {
        let mut board = BoardState::new();
        board.load(vec![lead("a", LeadStatus::New)]);
        board.begin_drag("a");
        board.end_drag("a", Some("canceled"), |_| true);
        let view = project(&board);
        let card = &view[5].cards[0];
        assert!(card.updating);
        assert!(!card.dragging);
    }

    #[test]
    fn test_refreshed_lead_gets_a_new_card() {
        use std::collections::HashSet;

        let mut board = BoardState::new();
        board.load(vec![lead("a", LeadStatus::New), lead("b", LeadStatus::New)]);
        let before: HashSet<CardView> = project(&board)[0].cards.iter().cloned().collect();

        let mut renamed = lead("a", LeadStatus::New);
        renamed.client_name = "Ana Souza".to_string();
        renamed.notes = Some("prefers mornings".to_string());
        board.refresh(vec![renamed, lead("b", LeadStatus::New)]);
        let after = project(&board);
        let cards = &after[0].cards;

        assert_eq!(cards[0].lead.id, "a");
        assert!(!before.contains(&cards[0]), "edited lead kept its old card");
        assert!(before.contains(&cards[1]), "untouched lead was rebuilt");
    }
}
