//! Clinic Dashboard App
//!
//! Root component: restores the persisted session, then shows either the
//! sign-in screens or the dashboard.

use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;
use tokio_util::sync::CancellationToken;

use crate::commands;
use crate::components::{
    ClinicProfilePanel, KanbanBoard, LoginForm, OperatingHoursPanel, ResetPasswordConfirm, ResetPasswordForm,
    Sidebar, ToastStack, WhatsAppChannels,
};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::store::{AppState, AppStateStoreFields, AuthScreen, Tab};

#[component]
pub fn App() -> impl IntoView {
    let initial_screen = if commands::location_path() == commands::RESET_CONFIRM_PATH {
        AuthScreen::ResetConfirm
    } else {
        AuthScreen::Login
    };
    let store = Store::new(AppState::new(initial_screen.clone()));
    provide_context(store);

    let ctx = AppContext::new(AppConfig::from_env(), store);
    provide_context(ctx);

    // A recovery link always lands on its own screen
    match commands::load_session().filter(|_| initial_screen != AuthScreen::ResetConfirm) {
        Some(session) => spawn_local(async move {
            match commands::restore_session(&ctx.rest(), session).await {
                Ok(tenant) => store.tenant().set(Some(tenant)),
                Err(e) if commands::refresh_rejected(&e) => {
                    log::info!("[AUTH] stored session expired: {}", e);
                    commands::clear_session();
                }
                Err(e) => {
                    log::error!("[AUTH] session restore failed: {}", e);
                    store.session_error().set(Some(e.to_string()));
                }
            }
            store.restoring().set(false);
        }),
        None => store.restoring().set(false),
    }

    // A token refresh replaces the tenant; only signing in or out swaps screens
    let signed_in = Memo::new(move |_| store.tenant().with(|t| t.is_some()));

    view! {
        <ToastStack />
        {move || {
            if store.restoring().get() {
                return view! { <div class="splash">"Loading..."</div> }.into_any();
            }
            if let Some(message) = store.session_error().get() {
                return view! {
                    <div class="auth-page">
                        <div class="auth-card session-error">
                            <h2>"Unable to open your clinic"</h2>
                            <p>{message}</p>
                            <button class="primary-btn" on:click=move |_| ctx.sign_out()>"Back to Login"</button>
                        </div>
                    </div>
                }.into_any();
            }
            if signed_in.get() {
                return view! { <Dashboard /> }.into_any();
            }
            match store.auth_screen().get() {
                AuthScreen::Login => view! { <LoginForm /> }.into_any(),
                AuthScreen::ResetRequest => view! { <ResetPasswordForm /> }.into_any(),
                AuthScreen::ResetConfirm => view! { <ResetPasswordConfirm /> }.into_any(),
            }
        }}
    }
}

/// Signed-in layout: sidebar plus the active section
#[component]
fn Dashboard() -> impl IntoView {
    let store = crate::store::use_app_store();
    let ctx = crate::context::use_app_context();

    let token = CancellationToken::new();
    ctx.keep_session_fresh(token.clone());
    on_cleanup(move || token.cancel());

    view! {
        <div class="app-layout">
            <Sidebar />
            <main class="main-content">
                {move || match store.active_tab().get() {
                    Tab::Leads => view! { <KanbanBoard /> }.into_any(),
                    Tab::Profile => view! { <ClinicProfilePanel /> }.into_any(),
                    Tab::Hours => view! { <OperatingHoursPanel /> }.into_any(),
                    Tab::Channels => view! { <WhatsAppChannels /> }.into_any(),
                }}
            </main>
        </div>
    }
}
