//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::commands::TenantSession;

/// Dashboard sections
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    Leads,
    Profile,
    Hours,
    Channels,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Leads, Tab::Profile, Tab::Hours, Tab::Channels];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Leads => "Leads",
            Tab::Profile => "Clinic Profile",
            Tab::Hours => "Operating Hours",
            Tab::Channels => "WhatsApp Channels",
        }
    }
}

/// Signed-out screens
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthScreen {
    #[default]
    Login,
    ResetRequest,
    /// Landing page of a recovery link
    ResetConfirm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Signed-in user and their clinic
    pub tenant: Option<TenantSession>,
    /// Session restore still running
    pub restoring: bool,
    /// Blocking session/tenant failure
    pub session_error: Option<String>,
    pub auth_screen: AuthScreen,
    pub active_tab: Tab,
    pub toasts: Vec<Toast>,
    pub next_toast_id: u64,
}

impl AppState {
    pub fn new(auth_screen: AuthScreen) -> Self {
        Self {
            restoring: true,
            auth_screen,
            ..Default::default()
        }
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Queue a toast and return its id
pub fn store_push_toast(store: &AppStore, kind: ToastKind, message: String) -> u64 {
    let id = store.next_toast_id().get_untracked();
    store.next_toast_id().set(id + 1);
    store.toasts().write().push(Toast { id, kind, message });
    id
}

pub fn store_dismiss_toast(store: &AppStore, id: u64) {
    store.toasts().write().retain(|t| t.id != id);
}

/// Forget the signed-in user and go back to the login screen
pub fn store_sign_out(store: &AppStore) {
    store.tenant().set(None);
    store.session_error().set(None);
    store.active_tab().set(Tab::Leads);
    store.auth_screen().set(AuthScreen::Login);
}
