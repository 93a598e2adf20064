//! Board State Engine
//!
//! Owns the two lead collections behind the Kanban board:
//! - committed: last known-good state, mirrors the backend
//! - preview: what is rendered; differs from committed only for the lead
//!   being dragged, whose status follows the lane under the pointer
//!
//! Status changes are applied optimistically in [`BoardState::end_drag`]
//! and settled by [`BoardState::resolve_update`] once the backend answers.

use std::collections::HashMap;

use crate::error::ApiResult;
use crate::models::{Column, Lead, LeadId, LeadStatus};

/// Gesture in progress
#[derive(Debug, Clone, PartialEq)]
struct DragState {
    lead_id: LeadId,
    /// Last lane hovered during this gesture
    last_hovered: Option<LeadStatus>,
}

/// A status write issued by a drop, to be settled with the backend result
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub lead_id: LeadId,
    pub client_name: String,
    pub requested: LeadStatus,
    /// Committed status before the gesture started
    pub previous: LeadStatus,
    pub ticket: u64,
}

/// How a gesture ended
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Dropped outside any zone
    Cancelled,
    /// Dragged lead is not on the board
    Missing,
    /// Target lane is the lead's current lane
    NoOp,
    /// Move into a sensitive lane was not confirmed
    Declined,
    /// Applied locally; the caller must send it and report back
    Commit(StatusUpdate),
    /// Visual move within a lane
    Reordered { from: usize, to: usize },
    /// Dropped on a card of another lane with no lane hovered
    Invalid,
}

/// How a backend answer was applied
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Server status applied (may differ from the requested one)
    Applied(LeadStatus),
    /// Rolled back to the pre-gesture status
    RolledBack(LeadStatus),
    /// The lead left the board meanwhile
    Gone,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    committed: Vec<Lead>,
    preview: Vec<Lead>,
    drag: Option<DragState>,
    /// Tickets of the writes still in flight, per lead
    in_flight: HashMap<LeadId, Vec<u64>>,
    next_ticket: u64,
    loaded: bool,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Queries
    // ========================

    pub fn committed(&self) -> &[Lead] {
        &self.committed
    }

    pub fn preview(&self) -> &[Lead] {
        &self.preview
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    pub fn dragging(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.lead_id.as_str())
    }

    pub fn last_hovered(&self) -> Option<LeadStatus> {
        self.drag.as_ref().and_then(|d| d.last_hovered)
    }

    pub fn is_updating(&self, lead_id: &str) -> bool {
        self.in_flight.contains_key(lead_id)
    }

    pub fn lead(&self, lead_id: &str) -> Option<&Lead> {
        self.committed.iter().find(|l| l.id == lead_id)
    }

    // ========================
    // Loading
    // ========================

    /// Replace the board with a fresh load, dropping any gesture
    pub fn load(&mut self, leads: Vec<Lead>) {
        self.preview = leads.clone();
        self.committed = leads;
        self.drag = None;
        self.loaded = true;
    }

    /// Replace the data but keep an ongoing gesture and in-flight markers
    pub fn refresh(&mut self, leads: Vec<Lead>) {
        self.committed = leads;
        self.loaded = true;
        self.reset_preview();
        if let Some(DragState { lead_id, last_hovered: Some(status) }) = self.drag.clone() {
            set_status(&mut self.preview, &lead_id, status);
        }
    }

    // ========================
    // Gesture
    // ========================

    pub fn begin_drag(&mut self, lead_id: &str) {
        self.reset_preview();
        self.drag = Some(DragState { lead_id: lead_id.to_string(), last_hovered: None });
    }

    /// Move the dragged lead's preview into the lane `candidate` stands for.
    /// Returns whether the preview changed.
    pub fn preview_move(&mut self, lead_id: &str, candidate: &str) -> bool {
        if self.dragging() != Some(lead_id) {
            return false;
        }
        let Some(status) = self.hovered_lane(lead_id, candidate) else {
            return false;
        };
        if let Some(drag) = self.drag.as_mut() {
            drag.last_hovered = Some(status);
        }
        set_status(&mut self.preview, lead_id, status)
    }

    /// A lane id names its lane. A card of another lane stands for that lane;
    /// cards of the dragged lead's own lane are reorder targets, not lanes.
    fn hovered_lane(&self, lead_id: &str, candidate: &str) -> Option<LeadStatus> {
        if let Some(column) = Column::find(candidate) {
            return Some(column.status);
        }
        let own = self.lead(lead_id)?.status;
        let over = self.lead(candidate)?.status;
        (over != own && Column::for_status(over).is_some()).then_some(over)
    }

    /// Settle a gesture. `confirm` is asked only before moving into a
    /// sensitive lane.
    pub fn end_drag<F>(&mut self, lead_id: &str, over: Option<&str>, confirm: F) -> DropOutcome
    where
        F: FnOnce(&Lead) -> bool,
    {
        let last_hovered = self.drag.take().and_then(|d| d.last_hovered);

        let Some(over) = over else {
            self.reset_preview();
            return DropOutcome::Cancelled;
        };

        let target = Column::find(over)
            .map(|c| c.status)
            .or(last_hovered)
            .and_then(Column::for_status);

        match target {
            Some(column) => self.drop_on_column(lead_id, column, confirm),
            None => self.reorder(lead_id, over),
        }
    }

    fn drop_on_column<F>(&mut self, lead_id: &str, column: &Column, confirm: F) -> DropOutcome
    where
        F: FnOnce(&Lead) -> bool,
    {
        let Some(lead) = self.lead(lead_id).cloned() else {
            self.reset_preview();
            return DropOutcome::Missing;
        };
        if lead.status == column.status {
            self.reset_preview();
            return DropOutcome::NoOp;
        }
        if column.is_sensitive() && !confirm(&lead) {
            self.reset_preview();
            return DropOutcome::Declined;
        }

        set_status(&mut self.committed, lead_id, column.status);
        self.reset_preview();

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight.entry(lead_id.to_string()).or_default().push(ticket);

        DropOutcome::Commit(StatusUpdate {
            lead_id: lead_id.to_string(),
            client_name: lead.client_name,
            requested: column.status,
            previous: lead.status,
            ticket,
        })
    }

    /// Move the dragged lead to the slot of `over_id` among the leads of its
    /// lane. Other lanes keep their positions.
    fn reorder(&mut self, lead_id: &str, over_id: &str) -> DropOutcome {
        let (Some(active), Some(target)) = (self.lead(lead_id), self.lead(over_id)) else {
            self.reset_preview();
            return DropOutcome::Invalid;
        };
        if active.status != target.status {
            self.reset_preview();
            return DropOutcome::Invalid;
        }
        let status = active.status;

        let slots: Vec<usize> = self
            .committed
            .iter()
            .enumerate()
            .filter(|(_, l)| l.status == status)
            .map(|(i, _)| i)
            .collect();
        let mut lane: Vec<Lead> = slots.iter().map(|&i| self.committed[i].clone()).collect();
        let from = lane.iter().position(|l| l.id == lead_id);
        let to = lane.iter().position(|l| l.id == over_id);
        let (Some(from), Some(to)) = (from, to) else {
            self.reset_preview();
            return DropOutcome::Invalid;
        };

        let moved = lane.remove(from);
        lane.insert(to, moved);
        for (slot, lead) in slots.into_iter().zip(lane) {
            self.committed[slot] = lead;
        }
        self.reset_preview();
        DropOutcome::Reordered { from, to }
    }

    // ========================
    // Server reconciliation
    // ========================

    /// Apply the backend answer for `update`. Answers are applied in arrival
    /// order; a lead stays marked as updating until its last write settles.
    pub fn resolve_update(&mut self, update: &StatusUpdate, result: &ApiResult<Lead>) -> Resolution {
        if let Some(tickets) = self.in_flight.get_mut(&update.lead_id) {
            tickets.retain(|t| *t != update.ticket);
            if tickets.is_empty() {
                self.in_flight.remove(&update.lead_id);
            }
        }
        let status = match result {
            Ok(stored) => stored.status,
            Err(_) => update.previous,
        };
        if !set_status(&mut self.committed, &update.lead_id, status) && self.lead(&update.lead_id).is_none() {
            return Resolution::Gone;
        }
        self.sync_preview(&update.lead_id, status);
        match result {
            Ok(_) => Resolution::Applied(status),
            Err(_) => Resolution::RolledBack(status),
        }
    }

    // ========================
    // Helpers
    // ========================

    fn reset_preview(&mut self) {
        self.preview.clone_from(&self.committed);
    }

    /// Mirror a committed status into the preview, unless that lead is
    /// being dragged over a lane right now
    fn sync_preview(&mut self, lead_id: &str, status: LeadStatus) {
        let hovering = self
            .drag
            .as_ref()
            .is_some_and(|d| d.lead_id == lead_id && d.last_hovered.is_some());
        if !hovering {
            set_status(&mut self.preview, lead_id, status);
        }
    }
}

/// Returns whether the status changed
fn set_status(leads: &mut [Lead], lead_id: &str, status: LeadStatus) -> bool {
    match leads.iter_mut().find(|l| l.id == lead_id) {
        Some(lead) if lead.status != status => {
            lead.status = status;
            true
        }
        _ => false,
    }
}
