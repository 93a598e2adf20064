//! Operating Hours Component

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands::{self, TimeField};
use crate::components::Toggle;
use crate::context::use_app_context;
use crate::models::{OperatingHours, DAYS};
use crate::store::ToastKind;

fn day_label(day: &str) -> String {
    let mut chars = day.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[component]
pub fn OperatingHoursPanel() -> impl IntoView {
    let ctx = use_app_context();

    let hours = RwSignal::new(OperatingHours::new());
    let loading = RwSignal::new(true);
    let load_error = RwSignal::new(None::<String>);
    let saving = RwSignal::new(false);

    let reload = move || {
        let Some(client) = ctx.client() else { return };
        loading.set(true);
        spawn_local(async move {
            match commands::fetch_hours(&client).await {
                Ok(loaded) => {
                    hours.set(loaded);
                    load_error.set(None);
                }
                Err(e) => {
                    log::error!("[HOURS] load failed: {}", e);
                    if ctx.expire_on_auth_error(&e) {
                        return;
                    }
                    load_error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    reload();

    let save = move |_| {
        let Some(client) = ctx.client() else { return };
        let current = hours.get_untracked();
        saving.set(true);
        spawn_local(async move {
            match commands::save_hours(&client, &current).await {
                Ok(saved) => {
                    hours.set(saved);
                    ctx.notify(ToastKind::Success, "Operating hours saved".to_string());
                }
                Err(e) => ctx.notify(ToastKind::Error, format!("Failed to save operating hours: {}", e)),
            }
            saving.set(false);
        });
    };

    let day_row = move |day: &'static str| {
        let enabled = Signal::derive(move || hours.with(|h| h.get(day).is_some_and(|d| d.enabled)));
        let time = move |field: TimeField| {
            hours.with(|h| {
                h.get(day)
                    .and_then(|d| match field {
                        TimeField::Start => d.start_time.clone(),
                        TimeField::End => d.end_time.clone(),
                    })
                    .unwrap_or_default()
            })
        };
        let on_time = move |field: TimeField| {
            move |ev: web_sys::Event| {
                let value = event_target_value(&ev);
                hours.update(|h| commands::set_time(h, day, field, &value));
            }
        };

        view! {
            <div class=move || if enabled.get() { "hours-row" } else { "hours-row closed" }>
                <Toggle
                    enabled=enabled
                    on_change=move |_: bool| hours.update(|h| commands::toggle_day(h, day))
                    label=day_label(day)
                />
                <input
                    type="time"
                    prop:value=move || time(TimeField::Start)
                    disabled=move || !enabled.get()
                    on:input=on_time(TimeField::Start)
                />
                <span class="hours-sep">"to"</span>
                <input
                    type="time"
                    prop:value=move || time(TimeField::End)
                    disabled=move || !enabled.get()
                    on:input=on_time(TimeField::End)
                />
            </div>
        }
    };

    view! {
        <div class="panel hours">
            <h2>"Operating Hours"</h2>
            {move || {
                if loading.get() {
                    return view! { <p class="panel-status">"Loading operating hours..."</p> }.into_any();
                }
                if let Some(message) = load_error.get() {
                    return view! {
                        <div class="panel-status panel-error">
                            <p>{message}</p>
                            <button class="primary-btn" on:click=move |_| reload()>"Retry"</button>
                        </div>
                    }.into_any();
                }
                view! {
                    <div class="hours-list">
                        {DAYS.iter().copied().map(day_row).collect_view()}
                    </div>
                    <button class="primary-btn" disabled=move || saving.get() on:click=save>
                        {move || if saving.get() { "Saving..." } else { "Save Hours" }}
                    </button>
                }.into_any()
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_label() {
        assert_eq!(day_label("monday"), "Monday");
        assert_eq!(day_label(""), "");
    }
}
