//! Integration tests - collections over a parsed document
//!
//! Construction, traversal order, insertion, visibility and event
//! delegation through the public API only.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fos_query::{
    Config, Content, Dom, Event, EventCallback, EventInit, Filter, NodeId, OnOptions, QueryError,
    Selector,
};

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>List</title>
    <style>
        .collapsed { display: none }
    </style>
</head>
<body>
    <nav id="menu">
        <ul class="links">
            <li class="item"><a href="/a">A</a></li>
            <li class="item"><a href="/b">B</a></li>
        </ul>
    </nav>
    <section id="panel" class="collapsed">
        <ul class="links">
            <li class="item"><a href="/c">C</a></li>
        </ul>
    </section>
</body>
</html>"#;

fn page() -> Dom {
    Dom::parse(PAGE).unwrap()
}

fn hrefs(c: &fos_query::Collection) -> Vec<String> {
    c.iter()
        .map(|&n| c.dom().query(n).unwrap().attr("href").unwrap_or_default())
        .collect()
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

#[test]
fn test_selector_results_in_document_order() {
    let dom = page();
    let links = dom.query("#panel a, #menu a").unwrap();
    assert_eq!(hrefs(&links), vec!["/a", "/b", "/c"]);
}

#[test]
fn test_node_lists_keep_input_order() {
    let dom = page();
    let links = dom.query("a").unwrap();
    let reversed: Vec<_> = links.iter().rev().copied().collect();
    let again = dom.query(reversed).unwrap();
    assert_eq!(hrefs(&again), vec!["/c", "/b", "/a"]);
}

#[test]
fn test_query_in_context() {
    let dom = page();
    let panel = dom.query("#panel").unwrap()[0];
    assert_eq!(dom.query_in("a", panel).unwrap().len(), 1);
}

#[test]
fn test_construction_errors() {
    let dom = page();
    assert!(matches!(dom.query("li["), Err(QueryError::InvalidSelector(_))));
    assert!(matches!(dom.query_in("a", dom.window()), Err(QueryError::InvalidContext)));
    assert!(dom.query(Selector::None).unwrap().is_empty());
}

#[test]
fn test_config_disables_scripts() {
    let config = Config::from_json(r#"{ "enable_scripts": false }"#).unwrap();
    let dom = Dom::with_config(config);
    let ran = Rc::new(Cell::new(false));
    let flag = ran.clone();
    dom.set_script_runner(move |_, _| flag.set(true));

    dom.query(dom.body()).unwrap().append("<script>run()</script>").unwrap();
    assert!(!ran.get());
    assert_eq!(dom.query("script").unwrap().len(), 1);
}

// ============================================================================
// TRAVERSAL
// ============================================================================

#[test]
fn test_find_visits_per_source_in_order() {
    let dom = page();
    let lists = dom.query(".links").unwrap();
    let mut seen = Vec::new();
    lists.find("a").each(|node, _, c| {
        seen.push(c.dom().query(node).unwrap().text().unwrap_or_default());
    });
    assert_eq!(seen, vec!["A", "B", "C"]);

    // sources in reverse give the per-source blocks in reverse
    let reversed = dom.query(lists.iter().rev().copied().collect::<Vec<_>>()).unwrap();
    assert_eq!(hrefs(&reversed.find("a")), vec!["/c", "/a", "/b"]);
}

#[test]
fn test_traversal_never_mutates_receiver() {
    let dom = page();
    let items = dom.query(".item").unwrap();
    let before = items.nodes().to_vec();

    let parents = items.parents(Some("ul"));
    assert_eq!(parents.len(), 2);
    assert_eq!(items.nodes(), &before[..]);
    assert_eq!(parents.previous().map(|p| p.nodes()), Some(&before[..]));
}

#[test]
fn test_filter_with_predicate() {
    let dom = page();
    let links = dom.query("a").unwrap();
    let probe = dom.clone();
    let in_menu = move |n: NodeId| probe.query(n).unwrap().closest("#menu").len() == 1;
    assert_eq!(links.filter(Filter::Predicate(&in_menu)).len(), 2);
    assert!(links.filter("a[").is_empty());
}

// ============================================================================
// INSERTION
// ============================================================================

#[test]
fn test_html_insert_gives_independent_copies() {
    let dom = page();
    let ul = dom.query("#menu ul").unwrap();
    ul.append("<li class=\"new\">new</li>").unwrap();
    assert_eq!(dom.query(".new").unwrap().len(), 1);

    let items = dom.query(".item").unwrap();
    items.append("<em>tag</em>").unwrap();
    let tags = dom.query(".item em").unwrap();
    assert_eq!(tags.len(), 3);

    tags.eq(1).set_text("changed");
    let texts: Vec<_> = tags.iter().map(|&n| dom.query(n).unwrap().text().unwrap()).collect();
    assert_eq!(texts, vec!["tag", "changed", "tag"]);
}

#[test]
fn test_content_variants() {
    let dom = page();
    let panel = dom.query("#panel ul").unwrap();
    let menu_items = dom.query("#menu .item").unwrap();

    panel.append(Content::Collection(&menu_items)).unwrap();
    assert_eq!(dom.query("#menu .item").unwrap().len(), 0);
    assert_eq!(dom.query("#panel .item").unwrap().len(), 3);

    let fragment = dom.fragment("<li>x</li><li>y</li>").unwrap();
    panel.append(&fragment).unwrap();
    let texts: Vec<_> = dom.query("#panel li").unwrap().iter()
        .map(|&n| dom.query(n).unwrap().text().unwrap_or_default())
        .collect();
    assert_eq!(&texts[3..], ["x", "y"]);
}

#[test]
fn test_replace_then_chain() {
    let dom = page();
    let replaced = dom.query("#menu a").unwrap().replace("<span class=\"gone\">-</span>").unwrap();
    replaced.add_class("marked");

    assert_eq!(dom.query(".gone.marked").unwrap().len(), 2);
    assert!(dom.query("#menu a").unwrap().is_empty());
}

// ============================================================================
// VISIBILITY
// ============================================================================

#[test]
fn test_show_hide_show_is_exact() {
    let dom = page();
    let nav = dom.query("#menu").unwrap();
    nav.set_attr("style", "display: flex");

    nav.show().hide().show();
    assert_eq!(nav.css("display").as_deref(), Some("flex"));
    assert_eq!(nav.attr("style").as_deref(), Some("display: flex;"));
}

#[test]
fn test_stylesheet_hidden_section() {
    let dom = page();
    let panel = dom.query("#panel").unwrap();

    panel.toggle(None);
    assert_eq!(panel.css("display").as_deref(), Some("block"));
    panel.hide();
    assert_eq!(panel.css("display").as_deref(), Some("none"));
}

// ============================================================================
// EVENTS
// ============================================================================

#[test]
fn test_scoped_registration_round_trip() {
    let dom = page();
    let links = dom.query("a").unwrap();
    links.on("click.ns", EventCallback::new(|_| {}));
    links.off("click.ns", None);

    let doc = dom.document();
    for &node in links.iter() {
        assert_eq!(doc.listeners().count(node), 0);
        assert!(doc.registrations(node).is_empty());
    }
}

#[test]
fn test_delegation_from_document() {
    let dom = page();
    let calls = Rc::new(RefCell::new(Vec::new()));
    let log = calls.clone();
    dom.query(dom.root())
        .unwrap()
        .on_with(
            "click",
            OnOptions::delegate(".item"),
            EventCallback::new(move |e: &mut Event| log.borrow_mut().push(e.delegate)),
        )
        .unwrap();

    let link = dom.query("a[href='/b']").unwrap();
    link.click();

    let item = link.closest(".item")[0];
    assert_eq!(*calls.borrow(), vec![Some(item)]);
}

#[test]
fn test_stop_propagation_in_handler() {
    let dom = page();
    let outer = Rc::new(Cell::new(0));
    let count = outer.clone();
    dom.query("#menu")
        .unwrap()
        .on("click", EventCallback::new(move |_| count.set(count.get() + 1)));
    dom.query("ul")
        .unwrap()
        .on("click", EventCallback::new(|e: &mut Event| e.stop_propagation()));

    dom.query("a").unwrap().eq(0).click();
    assert_eq!(outer.get(), 0);

    let mut event = Event::new("click", EventInit::bubbling());
    dom.query("#menu").unwrap().trigger_event(&mut event);
    assert_eq!(outer.get(), 1);
}

#[test]
fn test_ready_after_loading() {
    let dom = page();
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    dom.ready(move || flag.set(true));
    assert!(!fired.get());
    dom.finish_loading();
    assert!(fired.get());
}

#[test]
fn test_version() {
    assert!(!fos_query::VERSION.is_empty());
}
