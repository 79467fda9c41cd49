//! DOM Events
//!
//! Event objects, listener storage and the dispatch algorithm:
//!   1. Build the propagation path from target to the window.
//!   2. Capture phase: walk window → target.parent, invoke capture listeners.
//!   3. At-target phase: invoke every listener on the target.
//!   4. Bubble phase: walk target.parent → window, invoke bubble listeners.
//!
//! Listeners run with no borrow of the document held, so callbacks are free to
//! mutate the tree or add and remove listeners.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::{Document, NodeId};

/// Event types created as mouse events by [`Event::for_type`]
pub const MOUSE_EVENTS: [&str; 5] = ["click", "dblclick", "mousedown", "mouseup", "mousemove"];

/// Event types created as keyboard events by [`Event::for_type`]
pub const KEYBOARD_EVENTS: [&str; 3] = ["keydown", "keyup", "keypress"];

/// Which phase of the dispatch algorithm is currently executing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// Mouse event payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MouseData {
    pub client_x: f64,
    pub client_y: f64,
    pub button: i16,
    pub buttons: u16,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
}

/// Keyboard event payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyboardData {
    pub key: String,
    pub code: String,
    pub repeat: bool,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
}

/// Event interface
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EventKind {
    #[default]
    Generic,
    Mouse(MouseData),
    Keyboard(KeyboardData),
}

/// Event constructor options
#[derive(Debug, Clone, Default)]
pub struct EventInit {
    pub bubbles: bool,
    pub cancelable: bool,
    /// Crosses shadow boundaries while propagating
    pub composed: bool,
    pub mouse: Option<MouseData>,
    pub keyboard: Option<KeyboardData>,
}

impl EventInit {
    /// Bubbling, cancelable init
    pub fn bubbling() -> Self {
        Self {
            bubbles: true,
            cancelable: true,
            ..Default::default()
        }
    }
}

/// A DOM event that can be dispatched through the tree
#[derive(Debug, Clone)]
pub struct Event {
    /// Event type name (e.g. `"click"`)
    pub event_type: String,
    /// The node the event was dispatched on
    pub target: Option<NodeId>,
    /// The node whose listeners are currently being invoked
    pub current_target: Option<NodeId>,
    /// Set by delegated handlers: the node matching the delegate selector
    pub delegate: Option<NodeId>,
    pub phase: EventPhase,
    pub bubbles: bool,
    pub cancelable: bool,
    pub composed: bool,
    pub kind: EventKind,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
    in_passive_listener: bool,
}

impl Event {
    /// Create a generic event
    pub fn new(event_type: &str, init: EventInit) -> Self {
        Self {
            event_type: event_type.to_string(),
            target: None,
            current_target: None,
            delegate: None,
            phase: EventPhase::None,
            bubbles: init.bubbles,
            cancelable: init.cancelable,
            composed: init.composed,
            kind: EventKind::Generic,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
            in_passive_listener: false,
        }
    }

    /// Pick the event interface from the type name: mouse and keyboard
    /// types get their payload, anything else is a generic event.
    pub fn for_type(event_type: &str, init: EventInit) -> Self {
        let kind = if MOUSE_EVENTS.contains(&event_type) {
            EventKind::Mouse(init.mouse.clone().unwrap_or_default())
        } else if KEYBOARD_EVENTS.contains(&event_type) {
            EventKind::Keyboard(init.keyboard.clone().unwrap_or_default())
        } else {
            EventKind::Generic
        };
        let mut event = Self::new(event_type, init);
        event.kind = kind;
        event
    }

    /// Prevent the default action (no-op for non-cancelable events or
    /// inside passive listeners)
    pub fn prevent_default(&mut self) {
        if self.cancelable && !self.in_passive_listener {
            self.default_prevented = true;
        }
    }

    /// Stop propagation after the current node's listeners
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop all further listeners
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Check if propagation was stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Type-erased listener callback, compared by identity
#[derive(Clone)]
pub struct EventCallback(Rc<dyn Fn(&mut Event)>);

impl EventCallback {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&mut Event) + 'static,
    {
        Self(Rc::new(callback))
    }

    /// Invoke the callback
    pub fn call(&self, event: &mut Event) {
        (self.0)(event);
    }
}

impl PartialEq for EventCallback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for EventCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EventCallback({:p})", Rc::as_ptr(&self.0))
    }
}

/// addEventListener options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub once: bool,
    pub passive: bool,
}

/// Handle of a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A single event listener attached to a node
#[derive(Debug, Clone)]
pub struct Listener {
    pub id: ListenerId,
    pub event_type: String,
    pub callback: EventCallback,
    pub options: ListenerOptions,
}

/// Stores event listeners for every node that has at least one
#[derive(Debug, Default)]
pub struct EventTargetMap {
    listeners: HashMap<NodeId, Vec<Listener>>,
    next_id: u64,
}

impl EventTargetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Every call creates a distinct listener.
    pub fn add(&mut self, node: NodeId, event_type: &str, callback: EventCallback, options: ListenerOptions) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.entry(node).or_default().push(Listener {
            id,
            event_type: event_type.to_string(),
            callback,
            options,
        });
        id
    }

    /// Remove a listener by id
    pub fn remove(&mut self, node: NodeId, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(&node) else { return false };
        let before = list.len();
        list.retain(|l| l.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.listeners.remove(&node);
        }
        removed
    }

    /// removeEventListener: first listener with the same type, callback and capture flag
    pub fn find(&self, node: NodeId, event_type: &str, callback: &EventCallback, capture: bool) -> Option<ListenerId> {
        self.listeners.get(&node)?
            .iter()
            .find(|l| l.event_type == event_type && &l.callback == callback && l.options.capture == capture)
            .map(|l| l.id)
    }

    /// Whether the listener is still registered
    pub fn contains(&self, node: NodeId, id: ListenerId) -> bool {
        self.listeners.get(&node).is_some_and(|list| list.iter().any(|l| l.id == id))
    }

    /// Number of listeners on a node
    pub fn count(&self, node: NodeId) -> usize {
        self.listeners.get(&node).map_or(0, Vec::len)
    }

    /// Snapshot of the listeners on `node` for `event_type`, in registration order
    pub fn matching(&self, node: NodeId, event_type: &str) -> Vec<Listener> {
        self.listeners.get(&node)
            .map(|list| list.iter().filter(|l| l.event_type == event_type).cloned().collect())
            .unwrap_or_default()
    }
}

/// Dispatch `event` at `target` through capture, at-target and bubble phases.
///
/// Returns `true` if the default action was *not* prevented.
pub fn dispatch_event(doc: &RefCell<Document>, target: NodeId, event: &mut Event) -> bool {
    event.target = Some(target);
    event.delegate = None;

    // [target, parent, ..., document, window]
    let path = doc.borrow().event_path(target, event.composed);
    tracing::trace!("dispatch {} at {} through {} nodes", event.event_type, target, path.len());

    event.phase = EventPhase::Capturing;
    for &node in path[1..].iter().rev() {
        if event.propagation_stopped {
            break;
        }
        invoke_listeners(doc, node, event);
    }

    if !event.propagation_stopped {
        event.phase = EventPhase::AtTarget;
        invoke_listeners(doc, target, event);
    }

    if event.bubbles {
        event.phase = EventPhase::Bubbling;
        for &node in &path[1..] {
            if event.propagation_stopped {
                break;
            }
            invoke_listeners(doc, node, event);
        }
    }

    event.phase = EventPhase::None;
    event.current_target = None;
    event.propagation_stopped = false;
    event.immediate_propagation_stopped = false;

    !event.default_prevented
}

fn invoke_listeners(doc: &RefCell<Document>, node: NodeId, event: &mut Event) {
    let listeners = doc.borrow().listeners().matching(node, &event.event_type);
    event.current_target = Some(node);

    for listener in listeners {
        if event.immediate_propagation_stopped {
            break;
        }
        let wanted = match event.phase {
            EventPhase::Capturing => listener.options.capture,
            EventPhase::Bubbling => !listener.options.capture,
            _ => true,
        };
        if !wanted {
            continue;
        }
        {
            let mut d = doc.borrow_mut();
            // removed by an earlier callback
            if !d.listeners().contains(node, listener.id) {
                continue;
            }
            if listener.options.once {
                d.remove_event_listener(node, listener.id);
            }
        }

        event.in_passive_listener = listener.options.passive;
        listener.callback.call(event);
        event.in_passive_listener = false;
    }
}
