//! Reset Password Confirm Component
//!
//! Landing page of the recovery link: sets a new password with the access
//! token carried in the URL fragment.

use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands;
use crate::context::use_app_context;
use crate::store::{AppStateStoreFields, AuthScreen};

const BACK_TO_LOGIN_DELAY: Duration = Duration::from_secs(2);

fn back_to_login(store: crate::store::AppStore) {
    // Drop the recovery path and token from the address bar
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some("/"));
    }
    store.auth_screen().set(AuthScreen::Login);
}

#[component]
pub fn ResetPasswordConfirm() -> impl IntoView {
    let ctx = use_app_context();
    let store = ctx.store;

    let token = commands::recovery_token(&commands::location_hash());
    let invalid_link = token.is_none();
    let token = StoredValue::new(token);

    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (error, set_error) = signal::<Option<String>>(
        invalid_link.then(|| "Invalid or expired reset link. Please try again.".to_string()),
    );
    let (message, set_message) = signal::<Option<String>>(None);
    let (loading, set_loading) = signal(false);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let new_password = password.get_untracked();
        if let Err(e) = commands::check_new_password(&new_password, &confirm.get_untracked()) {
            set_error.set(Some(e.to_string()));
            return;
        }
        let Some(access_token) = token.get_value() else {
            set_error.set(Some("Invalid or expired reset link. Please try again.".to_string()));
            return;
        };
        set_error.set(None);
        set_loading.set(true);
        let rest = ctx.rest();
        spawn_local(async move {
            match commands::update_password(&rest, &access_token, &new_password).await {
                Ok(()) => {
                    set_message.set(Some("Password updated successfully! You can now log in.".to_string()));
                    gloo_timers::future::sleep(BACK_TO_LOGIN_DELAY).await;
                    back_to_login(store);
                }
                Err(e) => set_error.set(Some(e.to_string())),
            }
            set_loading.set(false);
        });
    };

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h2>"Choose a new password"</h2>
                {move || match message.get() {
                    Some(text) => view! {
                        <div class="auth-message">
                            <p>{text}</p>
                            <button class="primary-btn" on:click=move |_| back_to_login(store)>"Back to Login"</button>
                        </div>
                    }.into_any(),
                    None => view! {
                        <form on:submit=submit>
                            <label class="field">
                                <span>"New Password"</span>
                                <input
                                    type="password"
                                    placeholder="Enter new password"
                                    prop:value=move || password.get()
                                    on:input=move |ev| set_password.set(event_target_value(&ev))
                                />
                            </label>
                            <label class="field">
                                <span>"Confirm Password"</span>
                                <input
                                    type="password"
                                    placeholder="Confirm new password"
                                    prop:value=move || confirm.get()
                                    on:input=move |ev| set_confirm.set(event_target_value(&ev))
                                />
                            </label>
                            {move || error.get().map(|e| view! { <p class="field-error">{e}</p> })}
                            <button type="submit" class="primary-btn" disabled=move || loading.get()>
                                "Update Password"
                            </button>
                        </form>
                    }.into_any(),
                }}
            </div>
        </div>
    }
}
