//! Leptos DragDrop Utilities
//!
//! Pointer and keyboard drag-and-drop for Leptos.
//! Uses a movement threshold to distinguish click from drag and
//! nearest-corner collision to pick the drop zone under the dragged card.
//!
//! Elements opt in with data attributes: `data-dnd-id` marks a drop zone
//! (columns and cards alike), `data-dnd-draggable` marks an element that can
//! be picked up with the keyboard once focused.

pub mod collision;
pub mod geometry;
pub mod sensor;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

pub use collision::{closest_corners, Droppable};
pub use geometry::{Point, Rect};
pub use sensor::{
    key_action, Direction, KeyAction, KeyboardDrag, PointerMotion, PointerSensor, DEFAULT_ACTIVATION_DISTANCE,
};

/// Attribute naming an element as a drop zone
pub const DROP_ATTR: &str = "data-dnd-id";
/// Attribute naming an element as a keyboard draggable
pub const DRAG_ATTR: &str = "data-dnd-draggable";

/// Gesture events reported to the owner of the binding
#[derive(Clone, Debug, PartialEq)]
pub enum DndEvent {
    Start { id: String },
    /// The drop zone under the dragged element changed
    Over { id: String, over: String },
    /// Gesture finished; `over` is `None` when cancelled or dropped nowhere
    End { id: String, over: Option<String> },
}

/// Sensor state shared between element handlers and document listeners
#[derive(Clone, Debug, Default)]
struct Gesture {
    pointer: PointerSensor,
    keyboard: Option<KeyboardDrag>,
    /// Drop zones measured when the drag started
    droppables: Vec<Droppable>,
}

/// DnD state signals
#[derive(Clone, Copy)]
pub struct DndSignals {
    pub active_id: RwSignal<Option<String>>,
    pub over_id: RwSignal<Option<String>>,
    /// Dragged element at its current position
    pub overlay: RwSignal<Option<Rect>>,
    gesture: StoredValue<Gesture>,
}

pub fn create_dnd_signals(activation_distance: f64) -> DndSignals {
    DndSignals {
        active_id: RwSignal::new(None),
        over_id: RwSignal::new(None),
        overlay: RwSignal::new(None),
        gesture: StoredValue::new(Gesture {
            pointer: PointerSensor::new(activation_distance),
            ..Default::default()
        }),
    }
}

impl DndSignals {
    /// Whether `id` is the element being dragged (tracked)
    pub fn is_active(&self, id: &str) -> bool {
        self.active_id.with(|a| a.as_deref() == Some(id))
    }

    /// Whether `id` is the drop zone currently under the dragged element (tracked)
    pub fn is_over(&self, id: &str) -> bool {
        self.over_id.with(|o| o.as_deref() == Some(id))
    }

    pub fn is_dragging(&self) -> bool {
        self.active_id.with(|a| a.is_some())
    }

    fn reset(&self) {
        self.active_id.set(None);
        self.over_id.set(None);
        self.overlay.set(None);
        self.gesture.update_value(|g| {
            g.keyboard = None;
            g.droppables.clear();
        });
    }

    fn start(&self, id: &str, rect: Rect, emit: &dyn Fn(DndEvent)) {
        let droppables = measure_droppables();
        log::debug!("[DND] start {} with {} drop zones", id, droppables.len());
        self.gesture.update_value(|g| g.droppables = droppables);
        self.active_id.set(Some(id.to_string()));
        self.overlay.set(Some(rect));
        emit(DndEvent::Start { id: id.to_string() });
    }

    /// Recompute the drop zone under `rect`, emitting `Over` when it changes
    fn track(&self, id: &str, rect: Rect, emit: &dyn Fn(DndEvent)) {
        self.overlay.set(Some(rect));
        let over = self
            .gesture
            .with_value(|g| closest_corners(&rect, &g.droppables).map(|d| d.id.clone()));
        self.set_over(id, over, emit);
    }

    fn set_over(&self, id: &str, over: Option<String>, emit: &dyn Fn(DndEvent)) {
        if self.over_id.get_untracked() == over {
            return;
        }
        self.over_id.set(over.clone());
        if let Some(over) = over {
            emit(DndEvent::Over { id: id.to_string(), over });
        }
    }

    fn finish(&self, id: String, over: Option<String>, emit: &dyn Fn(DndEvent)) {
        self.reset();
        emit(DndEvent::End { id, over });
    }
}

/// Inline style placing an overlay element over `rect`
pub fn overlay_style(rect: &Rect) -> String {
    format!(
        "position: fixed; left: {}px; top: {}px; width: {}px; pointer-events: none; z-index: 1000;",
        rect.left, rect.top, rect.width
    )
}

fn measure_droppables() -> Vec<Droppable> {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return Vec::new();
    };
    let Ok(nodes) = document.query_selector_all(&format!("[{}]", DROP_ATTR)) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .filter_map(|el| {
            let id = el.get_attribute(DROP_ATTR)?;
            Some(Droppable::new(id, Rect::from_dom(&el.get_bounding_client_rect())))
        })
        .collect()
}

fn focused_draggable() -> Option<(String, Rect)> {
    let el = web_sys::window()?.document()?.active_element()?;
    let id = el.get_attribute(DRAG_ATTR)?;
    Some((id, Rect::from_dom(&el.get_bounding_client_rect())))
}

fn is_form_control(target: &web_sys::EventTarget) -> bool {
    target.dyn_ref::<web_sys::HtmlInputElement>().is_some()
        || target.dyn_ref::<web_sys::HtmlButtonElement>().is_some()
        || target.dyn_ref::<web_sys::HtmlTextAreaElement>().is_some()
        || target.dyn_ref::<web_sys::HtmlSelectElement>().is_some()
}

/// Create pointerdown handler for draggable elements.
/// Records a pending press; the drag starts once the pointer travels far enough.
pub fn make_on_pointerdown(dnd: DndSignals, id: String) -> impl Fn(web_sys::PointerEvent) + Clone + 'static {
    move |ev: web_sys::PointerEvent| {
        if ev.button() != 0 {
            return;
        }
        if ev.target().is_some_and(|t| is_form_control(&t)) {
            return;
        }
        let Some(el) = ev.current_target().and_then(|t| t.dyn_into::<web_sys::Element>().ok()) else {
            return;
        };
        let rect = Rect::from_dom(&el.get_bounding_client_rect());
        let at = Point::new(ev.client_x() as f64, ev.client_y() as f64);
        let id = id.clone();
        dnd.gesture.update_value(|g| g.pointer.press(id, at, rect));
    }
}

struct Listeners {
    document: web_sys::Document,
    handlers: Vec<(&'static str, Closure<dyn FnMut(web_sys::Event)>)>,
}

impl Drop for Listeners {
    fn drop(&mut self) {
        for (name, handler) in &self.handlers {
            let _ = self
                .document
                .remove_event_listener_with_callback(name, handler.as_ref().unchecked_ref());
        }
    }
}

thread_local! {
    static BINDINGS: RefCell<HashMap<u64, Listeners>> = RefCell::new(HashMap::new());
    static NEXT_BINDING: Cell<u64> = const { Cell::new(0) };
}

/// Handle to document listeners installed by [`bind_dnd`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DndBinding(u64);

impl DndBinding {
    /// Remove the document listeners
    pub fn unbind(self) {
        BINDINGS.with(|b| b.borrow_mut().remove(&self.0));
    }
}

/// Bind global pointer and keyboard listeners for a drag context.
/// Call [`DndBinding::unbind`] when the owning view is torn down.
pub fn bind_dnd<F>(dnd: DndSignals, on_event: F) -> Option<DndBinding>
where
    F: Fn(DndEvent) + 'static,
{
    let document = web_sys::window()?.document()?;
    let emit: Rc<dyn Fn(DndEvent)> = Rc::new(on_event);

    let on_pointermove = {
        let emit = emit.clone();
        Closure::<dyn FnMut(web_sys::Event)>::new(move |ev: web_sys::Event| {
            let Some(ev) = ev.dyn_ref::<web_sys::PointerEvent>() else { return };
            let at = Point::new(ev.client_x() as f64, ev.client_y() as f64);
            match dnd.gesture.try_update_value(|g| g.pointer.motion(at)).flatten() {
                Some(PointerMotion::Activated { id, rect }) => {
                    dnd.start(&id, rect, emit.as_ref());
                    dnd.track(&id, rect, emit.as_ref());
                }
                Some(PointerMotion::Moved { id, rect }) => dnd.track(&id, rect, emit.as_ref()),
                None => {}
            }
        })
    };

    let on_pointerup = {
        let emit = emit.clone();
        Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
            // A press that never activated falls through as a normal click
            if let Some(id) = dnd.gesture.try_update_value(|g| g.pointer.release()).flatten() {
                let over = dnd.over_id.get_untracked();
                dnd.finish(id, over, emit.as_ref());
            }
        })
    };

    let on_pointercancel = {
        let emit = emit.clone();
        Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
            if let Some(id) = dnd.gesture.try_update_value(|g| g.pointer.release()).flatten() {
                dnd.finish(id, None, emit.as_ref());
            }
        })
    };

    let on_keydown = {
        let emit = emit.clone();
        Closure::<dyn FnMut(web_sys::Event)>::new(move |ev: web_sys::Event| {
            let Some(key_ev) = ev.dyn_ref::<web_sys::KeyboardEvent>() else { return };
            let dragging = dnd.gesture.with_value(|g| g.keyboard.is_some());
            let Some(action) = key_action(&key_ev.key(), dragging) else { return };
            match action {
                KeyAction::Pick => {
                    if dnd.gesture.with_value(|g| g.pointer.is_dragging()) {
                        return;
                    }
                    let Some((id, rect)) = focused_draggable() else { return };
                    ev.prevent_default();
                    dnd.gesture.update_value(|g| g.keyboard = Some(KeyboardDrag::new(id.clone(), rect)));
                    dnd.start(&id, rect, emit.as_ref());
                    dnd.set_over(&id, Some(id.clone()), emit.as_ref());
                }
                KeyAction::Move(direction) => {
                    ev.prevent_default();
                    let stepped = dnd
                        .gesture
                        .try_update_value(|g| {
                            let Gesture { keyboard, droppables, .. } = g;
                            let drag = keyboard.as_mut()?;
                            let over = drag.step(direction, droppables)?;
                            Some((drag.id.clone(), over, drag.rect))
                        })
                        .flatten();
                    if let Some((id, over, rect)) = stepped {
                        dnd.overlay.set(Some(rect));
                        dnd.set_over(&id, Some(over), emit.as_ref());
                    }
                }
                KeyAction::Drop => {
                    ev.prevent_default();
                    if let Some(drag) = dnd.gesture.try_update_value(|g| g.keyboard.take()).flatten() {
                        dnd.finish(drag.id, drag.over, emit.as_ref());
                    }
                }
                KeyAction::Cancel => {
                    ev.prevent_default();
                    if let Some(drag) = dnd.gesture.try_update_value(|g| g.keyboard.take()).flatten() {
                        dnd.finish(drag.id, None, emit.as_ref());
                    }
                }
            }
        })
    };

    let handlers = vec![
        ("pointermove", on_pointermove),
        ("pointerup", on_pointerup),
        ("pointercancel", on_pointercancel),
        ("keydown", on_keydown),
    ];
    for (name, handler) in &handlers {
        let _ = document.add_event_listener_with_callback(name, handler.as_ref().unchecked_ref());
    }

    let key = NEXT_BINDING.with(|n| {
        let key = n.get();
        n.set(key + 1);
        key
    });
    BINDINGS.with(|b| b.borrow_mut().insert(key, Listeners { document, handlers }));
    Some(DndBinding(key))
}
