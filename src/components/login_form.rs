//! Login Form Component

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands;
use crate::context::use_app_context;
use crate::store::{AppStateStoreFields, AuthScreen};

#[component]
pub fn LoginForm() -> impl IntoView {
    let ctx = use_app_context();
    let store = ctx.store;

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (show_password, set_show_password) = signal(false);
    let (email_error, set_email_error) = signal::<Option<String>>(None);
    let (password_error, set_password_error) = signal::<Option<String>>(None);
    let (loading, set_loading) = signal(false);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let email_value = email.get_untracked();
        let password_value = password.get_untracked();
        let (email_err, password_err) = commands::check_login(&email_value, &password_value);
        if email_err.is_some() || password_err.is_some() {
            set_email_error.set(email_err.map(str::to_string));
            set_password_error.set(password_err.map(str::to_string));
            return;
        }

        set_loading.set(true);
        let rest = ctx.rest();
        spawn_local(async move {
            let result = match commands::sign_in(&rest, &email_value, &password_value).await {
                Ok(session) => commands::resolve_tenant(&rest, session).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(tenant) => {
                    commands::save_session(&tenant.session);
                    store.tenant().set(Some(tenant));
                }
                Err(e) if e.is_session() => {
                    log::error!("[AUTH] no tenant for this account: {}", e);
                    store.session_error().set(Some(e.to_string()));
                }
                Err(e) => {
                    log::warn!("[AUTH] sign-in failed: {}", e);
                    set_password_error.set(Some(e.to_string()));
                }
            }
            set_loading.set(false);
        });
    };

    view! {
        <div class="auth-page">
            <form class="auth-card" on:submit=submit>
                <h2>"Sign in"</h2>
                <p class="auth-subtitle">"Clinic administration dashboard"</p>

                <label class="field">
                    <span>"Email Address"</span>
                    <input
                        type="email"
                        placeholder="Enter your email"
                        prop:value=move || email.get()
                        on:input=move |ev| {
                            set_email.set(event_target_value(&ev));
                            set_email_error.set(None);
                        }
                    />
                    {move || email_error.get().map(|e| view! { <p class="field-error">{e}</p> })}
                </label>

                <label class="field">
                    <span>"Password"</span>
                    <div class="password-row">
                        <input
                            type=move || if show_password.get() { "text" } else { "password" }
                            placeholder="Enter your password"
                            prop:value=move || password.get()
                            on:input=move |ev| {
                                set_password.set(event_target_value(&ev));
                                set_password_error.set(None);
                            }
                        />
                        <button
                            type="button"
                            class="password-toggle"
                            on:click=move |_| set_show_password.update(|v| *v = !*v)
                        >
                            {move || if show_password.get() { "Hide" } else { "Show" }}
                        </button>
                    </div>
                    {move || password_error.get().map(|e| view! { <p class="field-error">{e}</p> })}
                </label>

                <button type="submit" class="primary-btn" disabled=move || loading.get()>
                    {move || if loading.get() { "Signing in..." } else { "Sign In" }}
                </button>

                <button
                    type="button"
                    class="link-btn"
                    on:click=move |_| store.auth_screen().set(AuthScreen::ResetRequest)
                >
                    "Forgot your password?"
                </button>
            </form>
        </div>
    }
}
