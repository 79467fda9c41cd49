//! Event binding
//!
//! `on` attaches one listener per node and event name and records it in the
//! document's side-table together with its scope. `off` removes listener and
//! record in one step. A delegate selector wraps the handler so it only runs
//! for events whose target sits inside a matching node.

use std::rc::Rc;

use fos_css::{closest, SelectorList};
use fos_dom::{dispatch_event, Event, EventCallback, EventInit, ListenerOptions};

use crate::classes::split_list;
use crate::{Collection, QueryResult};

/// Options of [`Collection::on_with`]
#[derive(Debug, Clone, Default)]
pub struct OnOptions {
    /// Only call the handler for targets inside a node matching this selector
    pub delegate: Option<String>,
    pub listener: ListenerOptions,
}

impl OnOptions {
    /// Delegate to `selector`
    pub fn delegate(selector: &str) -> Self {
        Self {
            delegate: Some(selector.to_string()),
            ..Default::default()
        }
    }

    pub fn once(mut self) -> Self {
        self.listener.once = true;
        self
    }

    pub fn capture(mut self) -> Self {
        self.listener.capture = true;
        self
    }
}

/// `click.scope` → (`click`, Some(`scope`)); names are lowercased
fn split_name(name: &str) -> (String, Option<String>) {
    let lower = name.to_lowercase();
    let mut parts = lower.split('.');
    let event = parts.next().unwrap_or_default().to_string();
    let scope = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
    (event, scope)
}

impl Collection {
    /// Listen for the space or comma separated `events` (each optionally
    /// `name.scope`) on every node
    pub fn on(&self, events: &str, handler: EventCallback) -> &Self {
        self.bind(events, None, ListenerOptions::default(), handler);
        self
    }

    /// [`on`](Self::on) with listener options and an optional delegate
    /// selector. Fails when the delegate selector does not parse.
    pub fn on_with(&self, events: &str, options: OnOptions, handler: EventCallback) -> QueryResult<&Self> {
        let delegate = match &options.delegate {
            Some(selector) => Some(self.dom.selector(selector)?),
            None => None,
        };
        self.bind(events, delegate, options.listener, handler);
        Ok(self)
    }

    fn bind(&self, events: &str, delegate: Option<Rc<SelectorList>>, options: ListenerOptions, handler: EventCallback) {
        for name in split_list(events) {
            let (event, scope) = split_name(name);
            let callback = match &delegate {
                Some(list) => self.delegating(list.clone(), handler.clone()),
                None => handler.clone(),
            };
            let mut doc = self.dom.document_mut();
            for &node in self.iter() {
                doc.register(node, &event, scope.clone(), handler.clone(), callback.clone(), options);
            }
        }
    }

    /// Wrap `handler` so it runs only when the target or one of its
    /// ancestors matches `selector`; that node becomes `event.delegate`
    fn delegating(&self, selector: Rc<SelectorList>, handler: EventCallback) -> EventCallback {
        let document = Rc::downgrade(self.dom.cell());
        EventCallback::new(move |event| {
            let (Some(document), Some(target)) = (document.upgrade(), event.target) else {
                return;
            };
            let matched = {
                let doc = document.borrow();
                let tree = doc.tree();
                let start = if tree.element(target).is_some() { Some(target) } else { tree.parent(target) };
                start.and_then(|node| closest(tree, node, &selector))
            };
            if let Some(node) = matched {
                event.delegate = Some(node);
                handler.call(event);
            }
        })
    }

    /// Remove registrations made by [`on`](Self::on).
    ///
    /// For each `name.scope` in `events`: without a scope, registrations of
    /// that name (any name when empty) go when `handler` is `None` or equals
    /// the registered handler. With a scope, registrations of that name (any
    /// name when empty) carrying the same scope go regardless of handler.
    pub fn off(&self, events: &str, handler: Option<&EventCallback>) -> &Self {
        let mut names = split_list(events);
        if names.is_empty() {
            names.push("");
        }
        let mut doc = self.dom.document_mut();
        for name in names {
            let (event, scope) = split_name(name);
            for &node in self.iter() {
                doc.unregister_where(node, |r| {
                    let same_event = event.is_empty() || r.event == event;
                    match &scope {
                        None => same_event && handler.is_none_or(|h| *h == r.handler || *h == r.callback),
                        Some(scope) => same_event && r.scope.as_ref() == Some(scope),
                    }
                });
            }
        }
        self
    }

    /// Dispatch a new `name` event on every node. Mouse and keyboard event
    /// names produce events of that kind.
    pub fn trigger(&self, name: &str, init: EventInit) -> &Self {
        let mut event = Event::for_type(name, init);
        self.trigger_event(&mut event)
    }

    /// Dispatch `event` on every node in turn
    pub fn trigger_event(&self, event: &mut Event) -> &Self {
        for &node in self.iter() {
            dispatch_event(self.dom.cell(), node, event);
        }
        self
    }

    pub fn click(&self) -> &Self {
        self.trigger("click", EventInit::bubbling())
    }

    pub fn change(&self) -> &Self {
        self.trigger("change", EventInit::bubbling())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use crate::Dom;

    fn counter() -> (Rc<Cell<u32>>, EventCallback) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, EventCallback::new(move |_| c.set(c.get() + 1)))
    }

    fn setup() -> (Dom, crate::Collection) {
        let dom = Dom::new();
        dom.query(dom.body())
            .unwrap()
            .append(r#"<div id="list"><p class="child"><span><b>deep</b></span></p><p>other</p></div>"#)
            .unwrap();
        let list = dom.query("#list").unwrap();
        (dom, list)
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("Click.NS"), ("click".to_string(), Some("ns".to_string())));
        assert_eq!(split_name("click"), ("click".to_string(), None));
        assert_eq!(split_name(".ns"), (String::new(), Some("ns".to_string())));
        assert_eq!(split_name("a.b.c"), ("a".to_string(), Some("b".to_string())));
    }

    #[test]
    fn test_scoped_on_off_leaves_nothing() {
        let (dom, list) = setup();
        let (count, cb) = counter();
        list.on("click.ns", cb);
        assert_eq!(dom.document().listeners().count(list[0]), 1);

        list.click();
        assert_eq!(count.get(), 1);

        list.off("click.ns", None);
        let doc = dom.document();
        assert_eq!(doc.listeners().count(list[0]), 0);
        assert!(doc.registrations(list[0]).is_empty());
    }

    #[test]
    fn test_multiple_events() {
        let (dom, list) = setup();
        let (count, cb) = counter();
        list.on("click, change focus", cb);
        assert_eq!(dom.document().registrations(list[0]).len(), 3);

        list.click().change().trigger("focus", EventInit::default());
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_delegate_nested_target() {
        let (dom, list) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let cb = EventCallback::new(move |e: &mut Event| log.borrow_mut().push(e.delegate));
        list.on_with("click", OnOptions::delegate(".child"), cb).unwrap();

        dom.query("b").unwrap().click();
        let child = dom.query(".child").unwrap()[0];
        assert_eq!(*seen.borrow(), vec![Some(child)]);

        // outside the delegate
        dom.query("p:not(.child)").unwrap().click();
        list.click();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_delegate_off_by_handler() {
        let (dom, list) = setup();
        let (count, cb) = counter();
        list.on_with("click", OnOptions::delegate("p"), cb.clone()).unwrap();

        list.off("click", Some(&cb));
        dom.query("b").unwrap().click();
        assert_eq!(count.get(), 0);
        assert_eq!(dom.document().listeners().count(list[0]), 0);
    }

    #[test]
    fn test_invalid_delegate() {
        let (_dom, list) = setup();
        let (_, cb) = counter();
        assert!(list.on_with("click", OnOptions::delegate("p >"), cb).is_err());
    }

    #[test]
    fn test_off_matching_rules() {
        let (dom, list) = setup();
        let (_, a) = counter();
        let (_, b) = counter();
        let node = list[0];
        let events = |d: &Dom| -> Vec<(String, Option<String>)> {
            d.document().registrations(node).iter().map(|r| (r.event.clone(), r.scope.clone())).collect()
        };

        list.on("click.x", a.clone()).on("click", b.clone()).on("keyup.x", a.clone());

        // no scope: name and handler must match
        list.off("click", Some(&a));
        assert_eq!(events(&dom).len(), 2);
        assert_eq!(events(&dom)[0], ("click".to_string(), None));

        // empty name with a scope: any event with that scope
        list.off(".x", None);
        assert_eq!(events(&dom), vec![("click".to_string(), None)]);

        // no event names: everything
        list.on("change.y", a.clone());
        list.off("", None);
        assert!(events(&dom).is_empty());
        assert_eq!(dom.document().listeners().count(node), 0);
    }

    #[test]
    fn test_off_without_registrations_is_quiet() {
        let (dom, list) = setup();
        list.off("click.nothing", None).off("", None);
        let window = dom.query(dom.window()).unwrap();
        assert_eq!(window.off("load", None).len(), 1);
        assert!(dom.document().registrations(list[0]).is_empty());
    }

    #[test]
    fn test_once_purges_registration() {
        let (dom, list) = setup();
        let (count, cb) = counter();
        list.on_with("click.one", OnOptions::default().once(), cb).unwrap();

        list.click().click();
        assert_eq!(count.get(), 1);
        assert!(dom.document().registrations(list[0]).is_empty());
    }

    #[test]
    fn test_trigger_kinds() {
        let (_dom, list) = setup();
        let kinds = Rc::new(RefCell::new(Vec::new()));
        let log = kinds.clone();
        list.on(
            "mousedown keydown custom",
            EventCallback::new(move |e: &mut Event| log.borrow_mut().push(e.kind.clone())),
        );
        list.trigger("mousedown", EventInit::default())
            .trigger("keydown", EventInit::default())
            .trigger("custom", EventInit::default());

        let kinds = kinds.borrow();
        assert!(matches!(kinds[0], fos_dom::EventKind::Mouse(_)));
        assert!(matches!(kinds[1], fos_dom::EventKind::Keyboard(_)));
        assert_eq!(kinds[2], fos_dom::EventKind::Generic);
    }

    #[test]
    fn test_handler_may_mutate_document() {
        let (dom, list) = setup();
        let inner = dom.clone();
        list.on(
            "click",
            EventCallback::new(move |_| {
                inner.query("#list").unwrap().append("<i>added</i>").unwrap();
            }),
        );
        list.click();
        assert_eq!(dom.query("#list i").unwrap().len(), 1);
    }
}
