//! Confirm Button Component
//!
//! Inline two-step confirmation for destructive actions.

use leptos::prelude::*;

/// Shows `label` first. Once clicked, asks `question` with ✓/✗ buttons.
///
/// # Arguments
/// * `button_class` - CSS class for the initial button
/// * `busy` - action running; the button is disabled and shows a spinner
/// * `on_confirm` - runs when the user confirms
#[component]
pub fn ConfirmButton(
    #[prop(into)] label: String,
    #[prop(into)] question: String,
    #[prop(into)] button_class: String,
    #[prop(into)] busy: Signal<bool>,
    #[prop(optional, into)] disabled: Signal<bool>,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView {
    let (asking, set_asking) = signal(false);

    view! {
        <Show when=move || !asking.get()>
            <button
                class=button_class.clone()
                disabled=move || busy.get() || disabled.get()
                on:click=move |ev| {
                    ev.stop_propagation();
                    set_asking.set(true);
                }
            >
                {
                    let label = label.clone();
                    move || if busy.get() { "…".to_string() } else { label.clone() }
                }
            </button>
        </Show>
        <Show when=move || asking.get()>
            <span class="inline-confirm">
                <span class="inline-confirm-text">{question.clone()}</span>
                <button
                    class="confirm-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_asking.set(false);
                        on_confirm.run(());
                    }
                >
                    "✓"
                </button>
                <button
                    class="cancel-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_asking.set(false);
                    }
                >
                    "✗"
                </button>
            </span>
        </Show>
    }
}
