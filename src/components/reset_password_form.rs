//! Reset Password Form Component
//!
//! Requests a recovery email.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands;
use crate::context::use_app_context;
use crate::store::{AppStateStoreFields, AuthScreen};

#[component]
pub fn ResetPasswordForm() -> impl IntoView {
    let ctx = use_app_context();
    let store = ctx.store;

    let (email, set_email) = signal(String::new());
    let (error, set_error) = signal::<Option<String>>(None);
    let (message, set_message) = signal::<Option<String>>(None);
    let (loading, set_loading) = signal(false);

    let back = move |_| store.auth_screen().set(AuthScreen::Login);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let value = email.get_untracked();
        if value.trim().is_empty() {
            set_error.set(Some("Email is required".to_string()));
            return;
        }
        set_error.set(None);
        set_loading.set(true);
        let rest = ctx.rest();
        let redirect = format!("{}{}", commands::location_origin(), commands::RESET_CONFIRM_PATH);
        spawn_local(async move {
            match commands::request_password_reset(&rest, &value, &redirect).await {
                Ok(()) => set_message.set(Some("Password reset email sent! Please check your inbox.".to_string())),
                Err(e) => set_error.set(Some(e.to_string())),
            }
            set_loading.set(false);
        });
    };

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h2>"Reset password"</h2>
                {move || match message.get() {
                    Some(text) => view! {
                        <div class="auth-message">
                            <p>{text}</p>
                            <button class="primary-btn" on:click=back>"Back to Login"</button>
                        </div>
                    }.into_any(),
                    None => view! {
                        <form on:submit=submit>
                            <label class="field">
                                <span>"Email Address"</span>
                                <input
                                    type="email"
                                    placeholder="Enter your email"
                                    prop:value=move || email.get()
                                    on:input=move |ev| {
                                        set_email.set(event_target_value(&ev));
                                        set_error.set(None);
                                    }
                                />
                                {move || error.get().map(|e| view! { <p class="field-error">{e}</p> })}
                            </label>
                            <button type="submit" class="primary-btn" disabled=move || loading.get()>
                                "Send Reset Link"
                            </button>
                            <button type="button" class="link-btn" on:click=back>"Back to Login"</button>
                        </form>
                    }.into_any(),
                }}
            </div>
        </div>
    }
}
