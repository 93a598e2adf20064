//! Clinic Profile Component
//!
//! Basic clinic info, payment/scheduling integrations and the automation
//! agents with their prompt templates. Everything is saved together.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands::{self, ProfileBundle, AGENT_DEFAULTS};
use crate::components::Toggle;
use crate::context::use_app_context;
use crate::models::{ClinicProfile, DEFAULT_VARIABLES};
use crate::store::ToastKind;

/// Text input bound to one profile field
fn text_field(
    bundle: RwSignal<ProfileBundle>,
    label: &'static str,
    get: fn(&ClinicProfile) -> &String,
    set: fn(&mut ClinicProfile) -> &mut String,
) -> impl IntoView {
    view! {
        <label class="field">
            <span>{label}</span>
            <input
                type="text"
                prop:value=move || bundle.with(|b| get(&b.profile).clone())
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    bundle.update(|b| *set(&mut b.profile) = value);
                }
            />
        </label>
    }
}

fn has_prompts(bundle: &ProfileBundle) -> bool {
    !bundle.prompts.is_empty()
}

#[component]
pub fn ClinicProfilePanel() -> impl IntoView {
    let ctx = use_app_context();

    let bundle = RwSignal::new(ProfileBundle::default());
    let loading = RwSignal::new(true);
    let load_error = RwSignal::new(None::<String>);
    let saving = RwSignal::new(false);

    let reload = move || {
        let Some(client) = ctx.client() else { return };
        loading.set(true);
        spawn_local(async move {
            match commands::fetch_profile(&client).await {
                Ok(loaded) => {
                    bundle.set(loaded);
                    load_error.set(None);
                }
                Err(e) => {
                    log::error!("[PROFILE] load failed: {}", e);
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
        let current = bundle.get_untracked();
        saving.set(true);
        spawn_local(async move {
            match commands::save_profile(&client, &current).await {
                Ok(saved) => {
                    bundle.set(saved);
                    ctx.notify(ToastKind::Success, "Clinic profile saved".to_string());
                }
                Err(e) => ctx.notify(ToastKind::Error, format!("Failed to save clinic profile: {}", e)),
            }
            saving.set(false);
        });
    };

    let basic_info = move || {
        view! {
            <section class="profile-section">
                <h3>"Basic Information"</h3>
                {text_field(bundle, "Clinic Name", |p| &p.name, |p| &mut p.name)}
                {text_field(bundle, "Assistant Name", |p| &p.assistant_name, |p| &mut p.assistant_name)}
                {text_field(bundle, "Address", |p| &p.address, |p| &mut p.address)}
                {text_field(bundle, "Support Phone", |p| &p.support_phone, |p| &mut p.support_phone)}
                <label class="field">
                    <span>"Recommendations"</span>
                    <textarea
                        rows="4"
                        prop:value=move || bundle.with(|b| b.profile.recommendations.clone())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            bundle.update(|b| b.profile.recommendations = value);
                        }
                    ></textarea>
                </label>
            </section>
        }
    };

    let integrations = move || {
        let asaas = Signal::derive(move || bundle.with(|b| b.profile.asaas_enabled));
        let klingo = Signal::derive(move || bundle.with(|b| b.profile.klingo_enabled));
        view! {
            <section class="profile-section">
                <h3>"Integrations"</h3>
                <Toggle
                    enabled=asaas
                    on_change=move |on: bool| bundle.update(|b| b.profile.asaas_enabled = on)
                    label="Asaas (payments)".to_string()
                />
                <Show when=move || asaas.get()>
                    {text_field(bundle, "Asaas API Key", |p| &p.asaas_api_key, |p| &mut p.asaas_api_key)}
                </Show>
                <Toggle
                    enabled=klingo
                    on_change=move |on: bool| bundle.update(|b| b.profile.klingo_enabled = on)
                    label="Klingo (scheduling)".to_string()
                />
                <Show when=move || klingo.get()>
                    {text_field(bundle, "Klingo API Key", |p| &p.klingo_api_key, |p| &mut p.klingo_api_key)}
                </Show>
            </section>
        }
    };

    let agents = move || {
        let prompt_count = move || bundle.with(|b| b.prompts.len());
        view! {
            <section class="profile-section">
                <h3>"Agent Configuration"</h3>
                <ul class="agent-summary">
                    {AGENT_DEFAULTS.iter().map(|(name, _)| {
                        let name = *name;
                        let on = move || bundle.with(|b| commands::agent_enabled(&b.prompts, name));
                        view! {
                            <li class=move || if on() { "agent-badge on" } else { "agent-badge" }>{name}</li>
                        }
                    }).collect_view()}
                </ul>
                <Show
                    when=move || bundle.with(has_prompts)
                    fallback=|| view! { <p class="panel-status">"No agent prompts configured."</p> }
                >
                    <For
                        each=move || 0..prompt_count()
                        key=|index| *index
                        children=move |index| view! { <PromptEditor bundle=bundle index=index /> }
                    />
                </Show>
            </section>
        }
    };

    view! {
        <div class="panel profile">
            <h2>"Clinic Profile"</h2>
            {move || {
                if loading.get() {
                    return view! { <p class="panel-status">"Loading clinic profile..."</p> }.into_any();
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
                    {basic_info()}
                    {integrations()}
                    {agents()}
                    <button class="primary-btn" disabled=move || saving.get() on:click=save>
                        {move || if saving.get() { "Saving..." } else { "Save Profile" }}
                    </button>
                }.into_any()
            }}
        </div>
    }
}

/// One agent prompt: on/off, template text and its variables
#[component]
fn PromptEditor(bundle: RwSignal<ProfileBundle>, index: usize) -> impl IntoView {
    let (new_variable, set_new_variable) = signal(String::new());

    let field = move |f: fn(&crate::models::AgentPrompt) -> String| {
        move || bundle.with(|b| b.prompts.get(index).map(f).unwrap_or_default())
    };
    let edit = move |f: &dyn Fn(&mut crate::models::AgentPrompt)| {
        bundle.update(|b| {
            if let Some(p) = b.prompts.get_mut(index) {
                f(p);
            }
        });
    };
    let enabled = Signal::derive(move || bundle.with(|b| b.prompts.get(index).is_some_and(|p| p.enabled)));
    let variables = move || bundle.with(|b| b.prompts.get(index).map(|p| p.variables.clone()).unwrap_or_default());
    let description = move || bundle.with(|b| b.prompts.get(index).map(|p| p.description()).unwrap_or_default());

    let add_variable = move |name: String| {
        edit(&|p| {
            p.add_variable(&name);
        });
    };

    view! {
        <div class="prompt-editor">
            <div class="prompt-header">
                <div>
                    <h4>{field(|p| p.name.clone())}</h4>
                    <p class="prompt-description">{description}</p>
                </div>
                <Toggle
                    enabled=enabled
                    on_change=move |on: bool| edit(&|p| p.enabled = on)
                />
            </div>
            <textarea
                rows="6"
                prop:value=field(|p| p.prompt.clone())
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    edit(&|p| p.prompt = value.clone());
                }
            ></textarea>
            <div class="prompt-variables">
                {move || variables().into_iter().map(|variable| {
                    let remove = variable.clone();
                    view! {
                        <span class="variable-chip">
                            {variable}
                            <button class="chip-remove" on:click=move |_| edit(&|p| p.remove_variable(&remove))>"×"</button>
                        </span>
                    }
                }).collect_view()}
            </div>
            <div class="prompt-add-variable">
                <input
                    type="text"
                    placeholder="Add custom variable"
                    prop:value=move || new_variable.get()
                    on:input=move |ev| set_new_variable.set(event_target_value(&ev))
                />
                <button
                    class="secondary-btn"
                    on:click=move |_| {
                        let name = new_variable.get_untracked();
                        if !name.trim().is_empty() {
                            add_variable(name);
                            set_new_variable.set(String::new());
                        }
                    }
                >
                    "Add"
                </button>
            </div>
            <div class="prompt-defaults">
                <p class="prompt-defaults-label">"Default variables:"</p>
                {DEFAULT_VARIABLES.iter().map(|variable| {
                    let variable = *variable;
                    view! {
                        <button class="variable-suggestion" on:click=move |_| add_variable(variable.to_string())>
                            {variable}
                        </button>
                    }
                }).collect_view()}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgentPrompt;

    #[test]
    fn test_has_prompts() {
        let mut bundle = ProfileBundle::default();
        assert!(!has_prompts(&bundle));
        bundle.prompts.push(AgentPrompt { name: "Reminder Agent".to_string(), ..Default::default() });
        assert!(has_prompts(&bundle));
    }
}
