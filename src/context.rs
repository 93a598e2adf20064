//! Application Context
//!
//! Shared handles provided via Leptos Context API: configuration, the
//! store, and the tenant-scoped backend client.

use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;
use tokio_util::sync::CancellationToken;

use crate::board::Notifier;
use crate::commands::{self, RestClient, ScopedClient};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::polling::spawn_polling;
use crate::store::{store_dismiss_toast, store_push_toast, store_sign_out, AppStateStoreFields, AppStore, ToastKind};

const TOAST_TTL: Duration = Duration::from_secs(4);

/// How often the signed-in session's expiry is looked at
const SESSION_CHECK_INTERVAL: Duration = Duration::from_secs(30);

const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    config: StoredValue<AppConfig>,
    pub store: AppStore,
}

impl AppContext {
    pub fn new(config: AppConfig, store: AppStore) -> Self {
        Self { config: StoredValue::new(config), store }
    }

    pub fn config(&self) -> AppConfig {
        self.config.get_value()
    }

    /// Client without a user credential (sign-in, recovery)
    pub fn rest(&self) -> RestClient {
        RestClient::new(self.config())
    }

    /// Client bound to the signed-in user's clinic
    pub fn client(&self) -> Option<ScopedClient> {
        let tenant = self.store.tenant().get_untracked()?;
        Some(ScopedClient::new(self.config(), tenant))
    }

    /// Show a toast that dismisses itself
    pub fn notify(&self, kind: ToastKind, message: String) {
        let store = self.store;
        let id = store_push_toast(&store, kind, message);
        spawn_local(async move {
            gloo_timers::future::sleep(TOAST_TTL).await;
            store_dismiss_toast(&store, id);
        });
    }

    /// Sign out when the backend rejected the user's token. Returns whether it did.
    pub fn expire_on_auth_error(&self, e: &ApiError) -> bool {
        if !e.is_auth_expired() {
            return false;
        }
        log::info!("[AUTH] access token rejected, signing out");
        self.notify(ToastKind::Error, SESSION_EXPIRED.to_string());
        self.sign_out();
        true
    }

    /// Refresh the access token ahead of its expiry until `token` is cancelled
    pub fn keep_session_fresh(&self, token: CancellationToken) {
        let ctx = *self;
        spawn_polling(SESSION_CHECK_INTERVAL, token, move || async move {
            let Some(tenant) = ctx.store.tenant().get_untracked() else { return };
            match commands::refresh_tenant(&ctx.rest(), &tenant).await {
                Ok(Some(fresh)) => ctx.store.tenant().set(Some(fresh)),
                Ok(None) => {}
                Err(e) if commands::refresh_rejected(&e) => {
                    log::info!("[AUTH] refresh rejected: {}", e);
                    ctx.notify(ToastKind::Error, SESSION_EXPIRED.to_string());
                    ctx.sign_out();
                }
                Err(e) => log::warn!("[AUTH] refresh failed, will retry: {}", e),
            }
        });
    }

    pub fn sign_out(&self) {
        let token = self.store.tenant().get_untracked().map(|t| t.session.access_token);
        commands::clear_session();
        store_sign_out(&self.store);
        if let Some(token) = token {
            let rest = self.rest();
            spawn_local(async move {
                if let Err(e) = commands::sign_out(&rest, &token).await {
                    log::warn!("[AUTH] sign-out request failed: {}", e);
                }
            });
        }
    }
}

impl Notifier for AppContext {
    fn success(&self, message: String) {
        self.notify(ToastKind::Success, message);
    }

    fn error(&self, message: String) {
        self.notify(ToastKind::Error, message);
    }
}

pub fn use_app_context() -> AppContext {
    use_context::<AppContext>().expect("AppContext should be provided")
}
