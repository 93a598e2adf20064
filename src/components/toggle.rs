//! Toggle Switch Component

use leptos::prelude::*;

/// On/off switch
#[component]
pub fn Toggle(
    #[prop(into)] enabled: Signal<bool>,
    #[prop(into)] on_change: Callback<bool>,
    #[prop(optional, into)] label: Option<String>,
    #[prop(optional, into)] disabled: Signal<bool>,
) -> impl IntoView {
    let class = move || {
        let mut c = String::from("toggle");
        if enabled.get() { c.push_str(" on"); }
        if disabled.get() { c.push_str(" disabled"); }
        c
    };

    view! {
        <label class="toggle-row">
            <button
                type="button"
                role="switch"
                class=class
                aria-checked=move || enabled.get().to_string()
                disabled=move || disabled.get()
                on:click=move |_| on_change.run(!enabled.get_untracked())
            >
                <span class="toggle-knob"></span>
            </button>
            {label.map(|text| view! { <span class="toggle-label">{text}</span> })}
        </label>
    }
}
