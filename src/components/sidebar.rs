//! Sidebar Component
//!
//! Section navigation and logout.

use leptos::prelude::*;

use crate::context::use_app_context;
use crate::store::{use_app_store, AppStateStoreFields, Tab};

#[component]
pub fn Sidebar() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let email = move || {
        store
            .tenant()
            .get()
            .and_then(|t| t.session.user.email)
            .unwrap_or_default()
    };

    view! {
        <nav class="sidebar">
            <div class="sidebar-header">
                <h1>"Clinic Dashboard"</h1>
                <p class="sidebar-user">{email}</p>
            </div>
            <ul class="sidebar-tabs">
                {Tab::ALL.iter().map(|tab| {
                    let tab = *tab;
                    let is_active = move || store.active_tab().get() == tab;
                    view! {
                        <li>
                            <button
                                class=move || if is_active() { "sidebar-tab active" } else { "sidebar-tab" }
                                on:click=move |_| store.active_tab().set(tab)
                            >
                                {tab.label()}
                            </button>
                        </li>
                    }
                }).collect_view()}
            </ul>
            <button class="sidebar-logout" on:click=move |_| ctx.sign_out()>
                "Logout"
            </button>
        </nav>
    }
}
