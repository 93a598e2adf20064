//! WhatsApp Channels Component
//!
//! Lists the clinic's messaging instances, creates new ones and keeps
//! pairing instances fresh by polling their status.

use std::collections::HashSet;

use leptos::prelude::*;
use leptos::task::spawn_local;
use tokio_util::sync::CancellationToken;

use crate::commands::{self, ChannelApi, NewInstance};
use crate::components::ConfirmButton;
use crate::context::{use_app_context, AppContext};
use crate::models::{InstanceKind, InstanceStatus, WhatsAppInstance};
use crate::polling::spawn_polling;
use crate::store::ToastKind;

fn now_millis() -> i64 {
    js_sys::Date::now() as i64
}

fn channel_api(ctx: &AppContext) -> Option<ChannelApi> {
    ctx.client().map(ChannelApi::new)
}

fn status_class(status: InstanceStatus) -> &'static str {
    match status {
        InstanceStatus::Connected => "instance-status connected",
        InstanceStatus::Connecting => "instance-status connecting",
        InstanceStatus::Disconnected => "instance-status disconnected",
    }
}

#[component]
pub fn WhatsAppChannels() -> impl IntoView {
    let ctx = use_app_context();

    let instances = RwSignal::new(Vec::<WhatsAppInstance>::new());
    let loading = RwSignal::new(true);
    let load_error = RwSignal::new(None::<String>);
    let verifying = RwSignal::new(HashSet::<String>::new());
    let deleting = RwSignal::new(HashSet::<String>::new());

    let form = RwSignal::new(NewInstance::new(now_millis()));
    let phone_error = RwSignal::new(None::<String>);
    let creating = RwSignal::new(false);

    let reload = move || {
        let Some(api) = channel_api(&ctx) else { return };
        loading.set(true);
        spawn_local(async move {
            match api.list_instances().await {
                Ok(list) => {
                    log::info!("[CHANNELS] loaded {} instances", list.len());
                    instances.set(list);
                    load_error.set(None);
                }
                Err(e) => {
                    log::error!("[CHANNELS] load failed: {}", e);
                    load_error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    reload();

    // Background refresh of instances still pairing
    let token = CancellationToken::new();
    spawn_polling(ctx.config().channel_poll_interval, token.clone(), move || async move {
        let Some(api) = channel_api(&ctx) else { return };
        let busy: HashSet<String> = verifying
            .with_untracked(|v| deleting.with_untracked(|d| v.union(d).cloned().collect()));
        let keys = instances.with_untracked(|list| commands::pollable(list, &busy));
        for key in keys {
            match api.verify_instance(&key).await {
                Ok(result) => {
                    instances.update(|list| {
                        commands::apply_verification(list, &result);
                    });
                }
                Err(e) => log::warn!("[CHANNELS] poll of {} failed: {}", key, e),
            }
        }
    });
    on_cleanup(move || token.cancel());

    let create = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let draft = form.get_untracked();
        if let Err(e) = commands::validate_phone(&draft.phone_number) {
            phone_error.set(Some(e.to_string()));
            return;
        }
        let Some(api) = channel_api(&ctx) else { return };
        creating.set(true);
        spawn_local(async move {
            match api.create_instance(&draft).await {
                Ok(()) => {
                    ctx.notify(ToastKind::Success, "WhatsApp instance created".to_string());
                    form.set(NewInstance::new(now_millis()));
                    reload();
                }
                Err(e) => ctx.notify(ToastKind::Error, format!("Failed to create instance: {}", e)),
            }
            creating.set(false);
        });
    };

    let verify = move |api_key: String| {
        let Some(api) = channel_api(&ctx) else { return };
        verifying.update(|v| {
            v.insert(api_key.clone());
        });
        spawn_local(async move {
            match api.verify_instance(&api_key).await {
                Ok(result) => {
                    instances.update(|list| {
                        commands::apply_verification(list, &result);
                    });
                    ctx.notify(ToastKind::Success, format!("Instance status: {}", result.status.label()));
                }
                Err(e) => ctx.notify(ToastKind::Error, format!("Failed to verify instance: {}", e)),
            }
            verifying.update(|v| {
                v.remove(&api_key);
            });
        });
    };

    let delete = move |api_key: String| {
        let Some(api) = channel_api(&ctx) else { return };
        deleting.update(|d| {
            d.insert(api_key.clone());
        });
        spawn_local(async move {
            match api.delete_instance(&api_key).await {
                Ok(()) => {
                    instances.update(|list| list.retain(|inst| inst.api_key != api_key));
                    ctx.notify(ToastKind::Success, "WhatsApp instance deleted".to_string());
                }
                Err(e) => ctx.notify(ToastKind::Error, format!("Failed to delete instance: {}", e)),
            }
            deleting.update(|d| {
                d.remove(&api_key);
            });
        });
    };

    let on_verify = Callback::new(verify);
    let on_delete = Callback::new(delete);

    view! {
        <div class="panel channels">
            <h2>"WhatsApp Channels"</h2>

            <form class="channel-form" on:submit=create>
                <label class="field">
                    <span>"Instance Name"</span>
                    <input
                        type="text"
                        prop:value=move || form.with(|f| f.instance_name.clone())
                        on:input=move |ev| form.update(|f| f.instance_name = event_target_value(&ev))
                    />
                </label>
                <label class="field">
                    <span>"Phone Number"</span>
                    <input
                        type="tel"
                        placeholder="+5511999999999"
                        prop:value=move || form.with(|f| f.phone_number.clone())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            // Live validation once something is typed
                            phone_error.set(if value.is_empty() {
                                None
                            } else {
                                commands::validate_phone(&value).err().map(|e| e.to_string())
                            });
                            form.update(|f| f.phone_number = value);
                        }
                    />
                    {move || phone_error.get().map(|e| view! { <p class="field-error">{e}</p> })}
                </label>
                <label class="field">
                    <span>"Type"</span>
                    <select
                        prop:value=move || form.with(|f| f.kind.as_str())
                        on:change=move |ev| form.update(|f| f.kind = InstanceKind::from_str(&event_target_value(&ev)))
                    >
                        <option value=InstanceKind::Baileys.as_str()>"WhatsApp (Baileys)"</option>
                        <option value=InstanceKind::Business.as_str()>"WhatsApp Business"</option>
                    </select>
                </label>
                <button
                    type="submit"
                    class="primary-btn"
                    disabled=move || creating.get() || phone_error.with(|e| e.is_some())
                >
                    {move || if creating.get() { "Creating..." } else { "Create Instance" }}
                </button>
            </form>

            {move || {
                if loading.get() && instances.with(|l| l.is_empty()) {
                    return view! { <p class="panel-status">"Loading instances..."</p> }.into_any();
                }
                if let Some(message) = load_error.get() {
                    return view! {
                        <div class="panel-status panel-error">
                            <p>{message}</p>
                            <button class="primary-btn" on:click=move |_| reload()>"Retry"</button>
                        </div>
                    }.into_any();
                }
                if instances.with(|l| l.is_empty()) {
                    return view! { <p class="panel-status">"No WhatsApp instances yet."</p> }.into_any();
                }
                view! {
                    <ul class="instance-list">
                        <For
                            each=move || instances.get()
                            key=|inst| (inst.api_key.clone(), inst.status.label(), inst.qr_code.clone())
                            children=move |inst| view! {
                                <InstanceRow inst=inst verifying=verifying deleting=deleting on_verify=on_verify on_delete=on_delete />
                            }
                        />
                    </ul>
                }.into_any()
            }}
        </div>
    }
}

#[component]
fn InstanceRow(
    inst: WhatsAppInstance,
    verifying: RwSignal<HashSet<String>>,
    deleting: RwSignal<HashSet<String>>,
    on_verify: Callback<String>,
    on_delete: Callback<String>,
) -> impl IntoView {
    let key = StoredValue::new(inst.api_key.clone());
    let is_verifying = Signal::derive(move || key.with_value(|k| verifying.with(|v| v.contains(k))));
    let is_deleting = Signal::derive(move || key.with_value(|k| deleting.with(|d| d.contains(k))));

    let qr = inst.qr_code.clone().filter(|q| !q.is_empty()).map(|code| {
        if code.starts_with("data:") {
            view! { <img class="instance-qr" src=code alt="Pairing QR code" /> }.into_any()
        } else {
            view! { <code class="instance-pairing-code">{code}</code> }.into_any()
        }
    });

    view! {
        <li class="instance-row">
            <div class="instance-info">
                <strong>{inst.display_name().to_string()}</strong>
                <span class="instance-phone">{inst.phone_number.clone()}</span>
                <span class=status_class(inst.status)>{inst.status.label()}</span>
            </div>
            {(inst.status == InstanceStatus::Connecting).then_some(qr).flatten()}
            <div class="instance-actions">
                <button
                    class="secondary-btn"
                    disabled=move || is_verifying.get() || is_deleting.get()
                    on:click=move |_| on_verify.run(key.get_value())
                >
                    {move || if is_verifying.get() { "Verifying..." } else { "Verify" }}
                </button>
                <ConfirmButton
                    label="Delete"
                    question="Delete this instance?"
                    button_class="danger-btn"
                    busy=is_deleting
                    disabled=is_verifying
                    on_confirm=move |_: ()| on_delete.run(key.get_value())
                />
            </div>
        </li>
    }
}
