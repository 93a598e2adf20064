//! Lead Card Component

use leptos::prelude::*;
use leptos_dragdrop::{make_on_pointerdown, DndSignals};

use crate::board::CardView;

#[component]
pub fn LeadCard(card: CardView, dnd: DndSignals) -> impl IntoView {
    let CardView { lead, dragging, updating } = card;
    let on_pointerdown = make_on_pointerdown(dnd, lead.id.clone());

    let mut class = String::from("lead-card");
    if dragging {
        class.push_str(" dragging");
    }
    if updating {
        class.push_str(" updating");
    }

    let appointment = lead.appointment_label().unwrap_or_else(|| "No appointment".to_string());

    view! {
        <article
            class=class
            tabindex="0"
            data-dnd-id=lead.id.clone()
            data-dnd-draggable=lead.id.clone()
            aria-busy=updating.to_string()
            on:pointerdown=on_pointerdown
        >
            <div class="lead-name">{lead.client_name}</div>
            {lead.phone.map(|phone| view! { <div class="lead-phone">{phone}</div> })}
            <div class="lead-appointment">{appointment}</div>
            {lead.notes.map(|notes| view! { <p class="lead-notes">{notes}</p> })}
            {updating.then(|| view! { <span class="lead-updating">"Updating..."</span> })}
        </article>
    }
}
