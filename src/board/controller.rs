//! Board Controller
//!
//! Drives a drop end-to-end: settle the gesture in the engine, send the
//! status write, fold the answer back in and tell the user.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;

use super::engine::{BoardState, DropOutcome, Resolution};
use crate::commands::LeadRepository;
use crate::error::ApiResult;
use crate::models::Lead;

/// Shared handle to the board state
pub trait BoardCell {
    /// Run `f` against the state; `None` if the state is gone
    fn with_board<R>(&self, f: impl FnOnce(&mut BoardState) -> R) -> Option<R>;
}

impl BoardCell for RwSignal<BoardState> {
    fn with_board<R>(&self, f: impl FnOnce(&mut BoardState) -> R) -> Option<R> {
        self.try_update(f)
    }
}

impl BoardCell for Rc<RefCell<BoardState>> {
    fn with_board<R>(&self, f: impl FnOnce(&mut BoardState) -> R) -> Option<R> {
        Some(f(&mut self.borrow_mut()))
    }
}

/// User-facing notifications
pub trait Notifier {
    fn success(&self, message: String);
    fn error(&self, message: String);
}

/// Replace the board with the tenant's open leads
pub async fn load_board<C, R>(cell: &C, repo: &R, limit: usize) -> ApiResult<usize>
where
    C: BoardCell,
    R: LeadRepository + ?Sized,
{
    let leads = repo.fetch_leads(limit).await?;
    let count = leads.len();
    cell.with_board(|board| {
        if board.is_loaded() {
            board.refresh(leads)
        } else {
            board.load(leads)
        }
    });
    Ok(count)
}

/// Finish a gesture. Commits are sent to the backend and settled before
/// returning; `None` if the board went away.
pub async fn finish_drag<C, R, N, F>(
    cell: &C,
    repo: &R,
    notifier: &N,
    lead_id: &str,
    over: Option<&str>,
    confirm: F,
) -> Option<DropOutcome>
where
    C: BoardCell,
    R: LeadRepository + ?Sized,
    N: Notifier + ?Sized,
    F: FnOnce(&Lead) -> bool,
{
    let outcome = cell.with_board(|board| board.end_drag(lead_id, over, confirm))?;
    match &outcome {
        DropOutcome::Commit(update) => {
            log::info!("[BOARD] {} {} -> {}", update.lead_id, update.previous, update.requested);
            let result = repo.update_lead_status(&update.lead_id, update.requested).await;
            let resolution = cell.with_board(|board| board.resolve_update(update, &result));
            match (&result, resolution) {
                (Ok(_), Some(Resolution::Applied(status))) => {
                    notifier.success(format!("Lead {} moved to {}", update.client_name, status.label()));
                }
                (Ok(_), _) => log::debug!("[BOARD] {} left the board before its update settled", update.lead_id),
                (Err(e), _) => {
                    log::error!("[BOARD] update of {} failed: {}", update.lead_id, e);
                    notifier.error(format!("Failed to update lead status: {}", e));
                }
            }
        }
        DropOutcome::Missing => {
            log::error!("[BOARD] lead not found: {}", lead_id);
            notifier.error("Lead not found".to_string());
        }
        DropOutcome::Declined => log::info!("[BOARD] move of {} not confirmed", lead_id),
        DropOutcome::Invalid => log::warn!("[BOARD] invalid drop of {} on {:?}", lead_id, over),
        DropOutcome::Reordered { from, to } => log::debug!("[BOARD] reordered {} {} -> {}", lead_id, from, to),
        DropOutcome::NoOp | DropOutcome::Cancelled => log::debug!("[BOARD] {:?} for {}", outcome, lead_id),
    }
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::LeadStatus;
    use async_trait::async_trait;

    /// In-memory repository recording every write
    #[derive(Default)]
    struct FakeRepo {
        leads: RefCell<Vec<Lead>>,
        calls: RefCell<Vec<(String, LeadStatus)>>,
        fail_with: Option<ApiError>,
        /// Status the store answers with instead of the requested one
        normalize_to: Option<LeadStatus>,
    }

    #[async_trait(?Send)]
    impl LeadRepository for FakeRepo {
        async fn fetch_leads(&self, limit: usize) -> ApiResult<Vec<Lead>> {
            Ok(self
                .leads
                .borrow()
                .iter()
                .filter(|l| l.status != LeadStatus::Contacted)
                .take(limit)
                .cloned()
                .collect())
        }

        async fn update_lead_status(&self, lead_id: &str, status: LeadStatus) -> ApiResult<Lead> {
            self.calls.borrow_mut().push((lead_id.to_string(), status));
            if let Some(e) = &self.fail_with {
                return Err(e.clone());
            }
            let mut leads = self.leads.borrow_mut();
            let lead = leads
                .iter_mut()
                .find(|l| l.id == lead_id)
                .ok_or_else(|| ApiError::from_response(406, r#"{"message":"no rows"}"#))?;
            lead.status = self.normalize_to.unwrap_or(status);
            Ok(lead.clone())
        }
    }

    #[derive(Default)]
    struct Toasts {
        success: RefCell<Vec<String>>,
        error: RefCell<Vec<String>>,
    }

    impl Notifier for Toasts {
        fn success(&self, message: String) {
            self.success.borrow_mut().push(message);
        }

        fn error(&self, message: String) {
            self.error.borrow_mut().push(message);
        }
    }

    fn lead(id: &str, name: &str, status: LeadStatus) -> Lead {
        Lead {
            id: id.to_string(),
            client_name: name.to_string(),
            phone: None,
            last_contact: None,
            appointment_date: None,
            appointment_time: None,
            status,
            notes: None,
            clinic_id: Some("c1".to_string()),
        }
    }

    fn repo() -> FakeRepo {
        FakeRepo {
            leads: RefCell::new(vec![
                lead("A1", "Ana", LeadStatus::New),
                lead("A2", "Bruno", LeadStatus::New),
                lead("A3", "Carla", LeadStatus::New),
                lead("Z9", "Done", LeadStatus::Contacted),
            ]),
            ..Default::default()
        }
    }

    async fn loaded(repo: &FakeRepo) -> Rc<RefCell<BoardState>> {
        let cell = Rc::new(RefCell::new(BoardState::new()));
        let count = load_board(&cell, repo, 100).await.unwrap();
        assert_eq!(count, 3);
        cell
    }

    fn status(cell: &Rc<RefCell<BoardState>>, id: &str) -> (LeadStatus, LeadStatus) {
        let board = cell.borrow();
        let committed = board.committed().iter().find(|l| l.id == id).unwrap().status;
        let preview = board.preview().iter().find(|l| l.id == id).unwrap().status;
        (committed, preview)
    }

    fn drag_over(cell: &Rc<RefCell<BoardState>>, id: &str, lane: &str) {
        let mut board = cell.borrow_mut();
        board.begin_drag(id);
        board.preview_move(id, lane);
    }

    #[tokio::test]
    async fn test_move_to_attendance() {
        let repo = repo();
        let toasts = Toasts::default();
        let cell = loaded(&repo).await;

        drag_over(&cell, "A1", "in-attendance");
        let outcome = finish_drag(&cell, &repo, &toasts, "A1", Some("in-attendance"), |_| true)
            .await
            .unwrap();

        assert!(matches!(outcome, DropOutcome::Commit(_)));
        assert_eq!(*repo.calls.borrow(), vec![("A1".to_string(), LeadStatus::InAttendance)]);
        assert_eq!(status(&cell, "A1"), (LeadStatus::InAttendance, LeadStatus::InAttendance));
        assert!(!cell.borrow().is_updating("A1"));
        assert_eq!(*toasts.success.borrow(), vec!["Lead Ana moved to In Attendance".to_string()]);
    }

    #[tokio::test]
    async fn test_declined_confirmation_sends_nothing() {
        let repo = repo();
        let toasts = Toasts::default();
        let cell = loaded(&repo).await;

        drag_over(&cell, "A2", "contacted");
        let outcome = finish_drag(&cell, &repo, &toasts, "A2", Some("contacted"), |_| false)
            .await
            .unwrap();

        assert_eq!(outcome, DropOutcome::Declined);
        assert!(repo.calls.borrow().is_empty());
        assert_eq!(status(&cell, "A2"), (LeadStatus::New, LeadStatus::New));
        assert!(toasts.success.borrow().is_empty());
        assert!(toasts.error.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_rolls_back() {
        let mut repo = repo();
        repo.fail_with = Some(ApiError::Http("network error".to_string()));
        let toasts = Toasts::default();
        let cell = loaded(&repo).await;

        drag_over(&cell, "A3", "no-show");
        finish_drag(&cell, &repo, &toasts, "A3", Some("no-show"), |_| true).await;

        assert_eq!(repo.calls.borrow().len(), 1);
        assert_eq!(status(&cell, "A3"), (LeadStatus::New, LeadStatus::New));
        assert!(!cell.borrow().is_updating("A3"));
        assert_eq!(
            *toasts.error.borrow(),
            vec!["Failed to update lead status: network error".to_string()]
        );
    }

    #[tokio::test]
    async fn test_server_answer_wins_over_request() {
        let mut repo = repo();
        repo.normalize_to = Some(LeadStatus::Rescheduled);
        let toasts = Toasts::default();
        let cell = loaded(&repo).await;

        drag_over(&cell, "A1", "to-reschedule");
        finish_drag(&cell, &repo, &toasts, "A1", Some("to-reschedule"), |_| true).await;
        assert_eq!(status(&cell, "A1"), (LeadStatus::Rescheduled, LeadStatus::Rescheduled));
        assert_eq!(*toasts.success.borrow(), vec!["Lead Ana moved to Rescheduled".to_string()]);
    }

    #[tokio::test]
    async fn test_own_lane_and_reorder_send_nothing() {
        let repo = repo();
        let toasts = Toasts::default();
        let cell = loaded(&repo).await;

        drag_over(&cell, "A1", "new");
        let outcome = finish_drag(&cell, &repo, &toasts, "A1", Some("new"), |_| true).await;
        assert_eq!(outcome, Some(DropOutcome::NoOp));

        cell.borrow_mut().begin_drag("A3");
        let outcome = finish_drag(&cell, &repo, &toasts, "A3", Some("A1"), |_| true).await;
        assert_eq!(outcome, Some(DropOutcome::Reordered { from: 2, to: 0 }));

        assert!(repo.calls.borrow().is_empty());
        let board = cell.borrow();
        assert_eq!(board.preview(), board.committed());
    }

    #[tokio::test]
    async fn test_missing_lead_notifies() {
        let repo = repo();
        let toasts = Toasts::default();
        let cell = loaded(&repo).await;

        cell.borrow_mut().begin_drag("gone");
        let outcome = finish_drag(&cell, &repo, &toasts, "gone", Some("canceled"), |_| true).await;
        assert_eq!(outcome, Some(DropOutcome::Missing));
        assert_eq!(*toasts.error.borrow(), vec!["Lead not found".to_string()]);
        assert!(repo.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_keeps_loaded_board() {
        let repo = repo();
        let cell = loaded(&repo).await;
        drag_over(&cell, "A1", "canceled");
        repo.leads.borrow_mut().push(lead("N1", "Nova", LeadStatus::New));
        assert_eq!(load_board(&cell, &repo, 100).await.unwrap(), 4);
        let board = cell.borrow();
        assert_eq!(board.dragging(), Some("A1"));
        assert_eq!(board.committed().len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_status_from_fetch_is_pending() {
        let row: crate::models::LeadRow =
            serde_json::from_str(r#"{"remotejid":"X1","status":"archived"}"#).unwrap();
        let repo = FakeRepo {
            leads: RefCell::new(vec![Lead::from(row)]),
            ..Default::default()
        };
        let cell = Rc::new(RefCell::new(BoardState::new()));
        load_board(&cell, &repo, 100).await.unwrap();
        assert_eq!(cell.borrow().committed()[0].status, LeadStatus::Pending);
    }
}
