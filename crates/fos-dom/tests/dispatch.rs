//! Event dispatch tests
//!
//! Phase order, propagation control, `once` listeners and composed paths
//! through shadow roots.

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::{
    dispatch_event, Document, Event, EventCallback, EventInit, EventPhase, ListenerOptions, NodeId,
    ShadowRootMode,
};

type Log = Rc<RefCell<Vec<String>>>;

fn recorder(log: &Log, label: &str) -> EventCallback {
    let log = log.clone();
    let label = label.to_string();
    EventCallback::new(move |e: &mut Event| {
        let phase = match e.phase {
            EventPhase::Capturing => "capture",
            EventPhase::AtTarget => "target",
            EventPhase::Bubbling => "bubble",
            EventPhase::None => "none",
        };
        log.borrow_mut().push(format!("{}:{}", label, phase));
    })
}

/// document > html > body > div > span
fn setup() -> (Rc<RefCell<Document>>, NodeId, NodeId) {
    let mut doc = Document::new("about:blank");
    let body = doc.body();
    let div = doc.tree.create_element("div");
    let span = doc.tree.create_element("span");
    doc.tree.append_child(body, div).unwrap();
    doc.tree.append_child(div, span).unwrap();
    (Rc::new(RefCell::new(doc)), div, span)
}

#[test]
fn test_phase_order() {
    let (doc, div, span) = setup();
    let log: Log = Rc::default();
    {
        let mut d = doc.borrow_mut();
        let window = d.window();
        let capture = ListenerOptions { capture: true, ..Default::default() };
        d.add_event_listener(window, "ping", recorder(&log, "window"), capture);
        d.add_event_listener(div, "ping", recorder(&log, "div-capture"), capture);
        d.add_event_listener(div, "ping", recorder(&log, "div"), ListenerOptions::default());
        d.add_event_listener(span, "ping", recorder(&log, "span"), ListenerOptions::default());
    }

    let mut event = Event::new("ping", EventInit::bubbling());
    assert!(dispatch_event(&doc, span, &mut event));
    assert_eq!(
        *log.borrow(),
        vec!["window:capture", "div-capture:capture", "span:target", "div:bubble"]
    );
    assert_eq!(event.phase, EventPhase::None);
    assert_eq!(event.target, Some(span));
}

#[test]
fn test_non_bubbling_event_skips_bubble_phase() {
    let (doc, div, span) = setup();
    let log: Log = Rc::default();
    doc.borrow_mut().add_event_listener(div, "ping", recorder(&log, "div"), ListenerOptions::default());

    let mut event = Event::new("ping", EventInit::default());
    dispatch_event(&doc, span, &mut event);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_stop_propagation_and_immediate() {
    let (doc, div, span) = setup();
    let log: Log = Rc::default();
    {
        let mut d = doc.borrow_mut();
        d.add_event_listener(span, "ping", EventCallback::new(|e: &mut Event| e.stop_immediate_propagation()), ListenerOptions::default());
        d.add_event_listener(span, "ping", recorder(&log, "span-second"), ListenerOptions::default());
        d.add_event_listener(div, "ping", recorder(&log, "div"), ListenerOptions::default());
    }
    dispatch_event(&doc, span, &mut Event::new("ping", EventInit::bubbling()));
    assert!(log.borrow().is_empty());

    // a plain stop still runs the remaining listeners of the same node
    let (doc, div, span) = setup();
    {
        let mut d = doc.borrow_mut();
        d.add_event_listener(span, "ping", EventCallback::new(|e: &mut Event| e.stop_propagation()), ListenerOptions::default());
        d.add_event_listener(span, "ping", recorder(&log, "span-second"), ListenerOptions::default());
        d.add_event_listener(div, "ping", recorder(&log, "div"), ListenerOptions::default());
    }
    dispatch_event(&doc, span, &mut Event::new("ping", EventInit::bubbling()));
    assert_eq!(*log.borrow(), vec!["span-second:target"]);
}

#[test]
fn test_prevent_default_and_passive() {
    let (doc, _div, span) = setup();
    {
        let mut d = doc.borrow_mut();
        let passive = ListenerOptions { passive: true, ..Default::default() };
        d.add_event_listener(span, "a", EventCallback::new(|e: &mut Event| e.prevent_default()), passive);
        d.add_event_listener(span, "b", EventCallback::new(|e: &mut Event| e.prevent_default()), ListenerOptions::default());
    }
    assert!(dispatch_event(&doc, span, &mut Event::new("a", EventInit::bubbling())));
    assert!(!dispatch_event(&doc, span, &mut Event::new("b", EventInit::bubbling())));
}

#[test]
fn test_once_listener_and_registration() {
    let (doc, _div, span) = setup();
    let log: Log = Rc::default();
    {
        let mut d = doc.borrow_mut();
        let once = ListenerOptions { once: true, ..Default::default() };
        let cb = recorder(&log, "once");
        d.register(span, "ping", Some("ns".into()), cb.clone(), cb, once);
    }
    dispatch_event(&doc, span, &mut Event::new("ping", EventInit::default()));
    dispatch_event(&doc, span, &mut Event::new("ping", EventInit::default()));

    assert_eq!(log.borrow().len(), 1);
    let d = doc.borrow();
    assert_eq!(d.listeners().count(span), 0);
    assert!(d.registrations(span).is_empty());
}

#[test]
fn test_listener_added_during_dispatch_waits() {
    let (doc, _div, span) = setup();
    let log: Log = Rc::default();
    let weak = Rc::downgrade(&doc);
    let late = recorder(&log, "late");
    doc.borrow_mut().add_event_listener(
        span,
        "ping",
        EventCallback::new(move |_| {
            if let Some(doc) = weak.upgrade() {
                doc.borrow_mut().add_event_listener(span, "ping", late.clone(), ListenerOptions::default());
            }
        }),
        ListenerOptions::default(),
    );

    dispatch_event(&doc, span, &mut Event::new("ping", EventInit::default()));
    assert!(log.borrow().is_empty());
    dispatch_event(&doc, span, &mut Event::new("ping", EventInit::default()));
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_composed_path_crosses_shadow_root() {
    let (doc, div, _span) = setup();
    let log: Log = Rc::default();
    let inner = {
        let mut d = doc.borrow_mut();
        let root = d.tree.attach_shadow(div, ShadowRootMode::Open).unwrap();
        let inner = d.tree.create_element("button");
        d.tree.append_child(root, inner).unwrap();
        d.add_event_listener(div, "ping", recorder(&log, "host"), ListenerOptions::default());
        inner
    };

    dispatch_event(&doc, inner, &mut Event::new("ping", EventInit::bubbling()));
    assert!(log.borrow().is_empty());

    let composed = EventInit { composed: true, ..EventInit::bubbling() };
    dispatch_event(&doc, inner, &mut Event::new("ping", composed));
    assert_eq!(*log.borrow(), vec!["host:bubble"]);
    assert!(doc.borrow().is_connected(inner));
}
