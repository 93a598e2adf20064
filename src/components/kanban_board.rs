//! Kanban Board Component
//!
//! Lead-status board: six lanes, drag-and-drop between them with optimistic
//! moves that are reconciled with the server answer.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{bind_dnd, create_dnd_signals, overlay_style, DndEvent};

use crate::board::{finish_drag, load_board, project, BoardState};
use crate::commands::SupabaseLeads;
use crate::components::BoardColumn;
use crate::context::use_app_context;
use crate::models::{Column, Lead, LeadStatus};
use crate::store::ToastKind;

#[derive(Clone, Debug, PartialEq)]
enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// Native confirmation for moves into a sensitive lane
fn confirm_move(lead: &Lead, column: &Column) -> bool {
    let question = format!("Are you sure you want to move lead \"{}\" to {}?", lead.client_name, column.title);
    web_sys::window()
        .and_then(|w| w.confirm_with_message(&question).ok())
        .unwrap_or(false)
}

#[component]
pub fn KanbanBoard() -> impl IntoView {
    let ctx = use_app_context();
    let config = ctx.config();

    let board = RwSignal::new(BoardState::new());
    let load_state = RwSignal::new(LoadState::Loading);
    let refreshing = RwSignal::new(false);
    let dnd = create_dnd_signals(config.drag_activation_distance);

    let reload = move || {
        let Some(client) = ctx.client() else {
            load_state.set(LoadState::Failed("No active session".to_string()));
            return;
        };
        let initial = !board.with_untracked(|b| b.is_loaded());
        if initial {
            load_state.set(LoadState::Loading);
        }
        refreshing.set(true);
        let limit = ctx.config().lead_page_size;
        spawn_local(async move {
            let repo = SupabaseLeads::new(client);
            match load_board(&board, &repo, limit).await {
                Ok(count) => {
                    log::info!("[BOARD] loaded {} leads", count);
                    load_state.set(LoadState::Ready);
                }
                Err(e) => {
                    log::error!("[BOARD] load failed: {}", e);
                    if ctx.expire_on_auth_error(&e) {
                        return;
                    }
                    if initial {
                        load_state.set(LoadState::Failed(e.to_string()));
                    } else {
                        ctx.notify(ToastKind::Error, format!("Failed to refresh leads: {}", e));
                    }
                }
            }
            refreshing.set(false);
        });
    };

    reload();

    let binding = bind_dnd(dnd, move |event| match event {
        DndEvent::Start { id } => {
            log::debug!("[DND] drag start {}", id);
            board.update(|b| b.begin_drag(&id));
        }
        DndEvent::Over { id, over } => {
            board.update(|b| {
                b.preview_move(&id, &over);
            });
        }
        DndEvent::End { id, over } => {
            log::debug!("[DND] drag end {} over {:?}", id, over);
            let Some(client) = ctx.client() else {
                board.update(|b| {
                    b.end_drag(&id, None, |_| false);
                });
                return;
            };
            spawn_local(async move {
                let repo = SupabaseLeads::new(client);
                // Only consulted for a drop whose lane is sensitive
                let confirm = |lead: &Lead| {
                    Column::for_status(LeadStatus::Contacted).is_some_and(|column| confirm_move(lead, column))
                };
                finish_drag(&board, &repo, &ctx, &id, over.as_deref(), confirm).await;
            });
        }
    });
    if let Some(binding) = binding {
        on_cleanup(move || binding.unbind());
    }

    let columns = Memo::new(move |_| board.with(project));

    let overlay = move || {
        let rect = dnd.overlay.get()?;
        let id = dnd.active_id.get()?;
        let lead = board.with(|b| b.lead(&id).cloned())?;
        Some(view! {
            <div class="lead-card drag-overlay" style=overlay_style(&rect)>
                <div class="lead-name">{lead.client_name}</div>
            </div>
        })
    };

    view! {
        <div class="kanban">
            <div class="kanban-header">
                <h2>"Leads"</h2>
                <button
                    class="refresh-btn"
                    disabled=move || refreshing.get() || dnd.is_dragging()
                    on:click=move |_| reload()
                >
                    {move || if refreshing.get() { "Refreshing..." } else { "Refresh" }}
                </button>
            </div>

            {move || match load_state.get() {
                LoadState::Loading if !board.with(|b| b.is_loaded()) => view! {
                    <div class="kanban-status">"Loading leads..."</div>
                }.into_any(),
                LoadState::Failed(message) if !board.with(|b| b.is_loaded()) => view! {
                    <div class="kanban-status kanban-error">
                        <p>{message}</p>
                        <button class="primary-btn" on:click=move |_| reload()>"Retry"</button>
                    </div>
                }.into_any(),
                _ => view! {
                    <Show when=move || board.with(|b| b.is_empty())>
                        <p class="kanban-empty">"No leads found for this clinic."</p>
                    </Show>
                    <div class="kanban-columns">
                        <For
                            each=move || columns.get()
                            key=|lane| lane.column.id()
                            children=move |lane| {
                                let id = lane.column.id();
                                let cards = Signal::derive(move || {
                                    columns.with(|cols| {
                                        cols.iter()
                                            .find(|c| c.column.id() == id)
                                            .map(|c| c.cards.clone())
                                            .unwrap_or_default()
                                    })
                                });
                                view! { <BoardColumn column=lane.column cards=cards dnd=dnd /> }
                            }
                        />
                    </div>
                }.into_any(),
            }}

            {overlay}
        </div>
    }
}
