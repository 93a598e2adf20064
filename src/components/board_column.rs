//! Board Column Component

use leptos::prelude::*;
use leptos_dragdrop::DndSignals;

use crate::board::CardView;
use crate::components::LeadCard;
use crate::models::Column;

/// One lane; the lane itself is a drop zone keyed by its status
#[component]
pub fn BoardColumn(column: Column, cards: Signal<Vec<CardView>>, dnd: DndSignals) -> impl IntoView {
    let id = column.id();
    let count = move || cards.with(|c| c.len());

    view! {
        <section
            class=move || if dnd.is_over(id) { "board-column over" } else { "board-column" }
            data-dnd-id=id
        >
            <header class="board-column-header">
                <h3>{column.title}</h3>
                <span class="board-column-count">{count}</span>
            </header>
            <div class="board-column-body">
                <Show
                    when=move || cards.with(|c| !c.is_empty())
                    fallback=|| view! { <p class="board-column-empty">"No leads"</p> }
                >
                    <For
                        each=move || cards.get()
                        key=CardView::clone
                        children=move |card| view! { <LeadCard card=card dnd=dnd /> }
                    />
                </Show>
            </div>
        </section>
    }
}
