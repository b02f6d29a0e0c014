/// Tests for part discovery, routing and handler dispatch during hydration
use crate::builder::define;
use crate::error::LoadError;
use crate::hydration::{DeferredHandlers, HydrationReport, PartHandlers};
use crate::parts::{PartDeclaration, PART_ATTRIBUTE};
use crate::runtime::Runtime;
use crate::PARTS_ROOT_TAG;
use anyhow::bail;
use shade_dom::NodeId;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

type Calls = Rc<RefCell<Vec<(String, NodeId)>>>;

fn body(rt: &mut Runtime) -> NodeId {
    let body = rt.create_element("body");
    let root = rt.document().root();
    rt.append_child(root, body).unwrap();
    body
}

fn part(rt: &mut Runtime, parent: NodeId, tag: &str, parts: &str) -> NodeId {
    let el = rt.create_element(tag);
    rt.set_attribute(el, PART_ATTRIBUTE, parts).unwrap();
    rt.append_child(parent, el).unwrap();
    el
}

fn recording(calls: &Calls, keys: &[&str]) -> PartHandlers {
    keys.iter().fold(PartHandlers::new(), |handlers, key| {
        let log = calls.clone();
        let name = key.to_string();
        handlers.on(*key, move |_, el| {
            log.borrow_mut().push((name.clone(), el));
            Ok(())
        })
    })
}

#[test]
fn test_failing_handler_does_not_stop_the_pass() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut rt = Runtime::new();
    let calls: Calls = Rc::default();
    let log = calls.clone();
    define()
        .parts(PartDeclaration::new().part("item", Vec::<String>::new()).unwrap())
        .tag("x-list")
        .class()
        .part_callbacks(PartHandlers::new().on("item", move |ctx, el| {
            log.borrow_mut().push(("item".to_string(), el));
            if ctx.document().get_attribute(el, "id") == Some("bad") {
                bail!("cannot render item");
            }
            ctx.set_text_content(el, "ok")?;
            Ok(())
        }))
        .register(&mut rt)
        .unwrap();

    let body = body(&mut rt);
    let host = rt.create_element("x-list");
    rt.set_attribute(host, "data-item", "").unwrap();
    let bad = part(&mut rt, host, "li", "item");
    rt.set_attribute(bad, "id", "bad").unwrap();
    let good = part(&mut rt, host, "li", "item");
    rt.append_child(body, host).unwrap();

    let seen: Vec<NodeId> = calls.borrow().iter().map(|(_, el)| *el).collect();
    assert_eq!(seen, vec![bad, good]);
    assert_eq!(rt.document().text_content(good), "ok");
    assert_eq!(rt.document().text_content(bad), "");

    let report = rt.hydrate(host);
    assert_eq!(
        report,
        HydrationReport {
            invoked: 2,
            failed: 1,
            deferred: false
        }
    );
}

#[test]
fn test_expected_tags_filter_matches() {
    let mut rt = Runtime::new();
    let calls: Calls = Rc::default();
    define()
        .parts(PartDeclaration::new().part("title", ["span"]).unwrap())
        .tag("x-title")
        .class()
        .part_callbacks(recording(&calls, &["title"]))
        .register(&mut rt)
        .unwrap();

    let body = body(&mut rt);
    let host = rt.create_element("x-title");
    rt.set_attribute(host, "data-title", "").unwrap();
    let div = part(&mut rt, host, "div", "title");
    let span = part(&mut rt, host, "span", "title");
    rt.append_child(body, host).unwrap();

    let seen: Vec<NodeId> = calls.borrow().iter().map(|(_, el)| *el).collect();
    assert_eq!(seen, vec![span]);
    assert!(!seen.contains(&div));
}

#[test]
fn test_keys_follow_routing_order_and_elements_document_order() {
    let mut rt = Runtime::new();
    let calls: Calls = Rc::default();
    define()
        .parts(
            PartDeclaration::new()
                .part("first", Vec::<String>::new())
                .unwrap()
                .part("second", Vec::<String>::new())
                .unwrap(),
        )
        .tag("x-order")
        .class()
        .part_callbacks(recording(&calls, &["first", "second"]))
        .register(&mut rt)
        .unwrap();

    let host = rt.create_element("x-order");
    rt.set_attribute(host, "data-second", "b").unwrap();
    rt.set_attribute(host, "data-first", "a b").unwrap();
    let one = part(&mut rt, host, "p", "b");
    let wrapper = rt.create_element("div");
    rt.append_child(host, wrapper).unwrap();
    let two = part(&mut rt, wrapper, "p", "a");
    let three = part(&mut rt, host, "p", "a b");

    let report = rt.hydrate(host);
    assert_eq!(report.invoked, 5);
    assert_eq!(
        *calls.borrow(),
        vec![
            ("second".to_string(), one),
            ("second".to_string(), three),
            ("first".to_string(), one),
            ("first".to_string(), two),
            ("first".to_string(), three),
        ]
    );
}

#[test]
fn test_kebab_data_attribute_routes_camel_case_key() {
    let mut rt = Runtime::new();
    let calls: Calls = Rc::default();
    define()
        .parts(PartDeclaration::new().part("titleEl", ["h1"]).unwrap())
        .tag("x-kebab")
        .class()
        .part_callbacks(recording(&calls, &["titleEl"]))
        .register(&mut rt)
        .unwrap();

    let host = rt.create_element("x-kebab");
    rt.set_attribute(host, "data-title-el", "").unwrap();
    let h1 = part(&mut rt, host, "h1", "titleEl");
    rt.hydrate(host);
    assert_eq!(*calls.borrow(), vec![("titleEl".to_string(), h1)]);
}

#[test]
fn test_undeclared_routing_key_is_ignored() {
    let mut rt = Runtime::new();
    let calls: Calls = Rc::default();
    define()
        .parts(PartDeclaration::new().part("known", Vec::<String>::new()).unwrap())
        .tag("x-known")
        .class()
        .part_callbacks(recording(&calls, &["known"]))
        .register(&mut rt)
        .unwrap();

    let host = rt.create_element("x-known");
    rt.set_attribute(host, "data-unknown", "known").unwrap();
    part(&mut rt, host, "p", "known");
    let report = rt.hydrate(host);
    assert_eq!(report.invoked, 0);
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_every_pass_rebuilds_the_index() {
    let mut rt = Runtime::new();
    let calls: Calls = Rc::default();
    define()
        .parts(PartDeclaration::new().part("row", Vec::<String>::new()).unwrap())
        .tag("x-rows")
        .class()
        .part_callbacks(recording(&calls, &["row"]))
        .register(&mut rt)
        .unwrap();

    let host = rt.create_element("x-rows");
    rt.set_attribute(host, "data-row", "").unwrap();
    let a = part(&mut rt, host, "p", "row");
    assert_eq!(rt.hydrate(host).invoked, 1);

    rt.remove(a).unwrap();
    let b = part(&mut rt, host, "p", "row");
    let c = part(&mut rt, host, "p", "row");
    assert_eq!(rt.hydrate(host).invoked, 2);
    assert_eq!(
        calls.borrow()[1..].iter().map(|(_, el)| *el).collect::<Vec<_>>(),
        vec![b, c]
    );
}

#[test]
fn test_parts_below_unprojected_boundary_are_excluded() {
    let mut rt = Runtime::new();
    let calls: Calls = Rc::default();
    define()
        .parts(PartDeclaration::new().part("x", Vec::<String>::new()).unwrap())
        .tag("x-outer")
        .class()
        .part_callbacks(recording(&calls, &["x"]))
        .register(&mut rt)
        .unwrap();

    let host = rt.create_element("x-outer");
    rt.set_attribute(host, "data-x", "").unwrap();
    let a = part(&mut rt, host, "div", "x");
    let boundary = rt.create_element(PARTS_ROOT_TAG);
    rt.append_child(a, boundary).unwrap();
    let b = part(&mut rt, boundary, "div", "x");

    rt.hydrate(host);
    let seen: Vec<NodeId> = calls.borrow().iter().map(|(_, el)| *el).collect();
    assert_eq!(seen, vec![a]);
    assert!(!seen.contains(&b));
}

#[test]
fn test_author_connected_callback_replaces_default_hydration() {
    let mut rt = Runtime::new();
    let calls: Calls = Rc::default();
    define()
        .parts(PartDeclaration::new().part("x", Vec::<String>::new()).unwrap())
        .tag("x-manual")
        .class()
        .lifecycle_callbacks(crate::LifecycleCallbacks::new().connected(|_| Ok(())))
        .part_callbacks(recording(&calls, &["x"]))
        .register(&mut rt)
        .unwrap();

    let body = body(&mut rt);
    let host = rt.create_element("x-manual");
    rt.set_attribute(host, "data-x", "").unwrap();
    part(&mut rt, host, "p", "x");
    rt.append_child(body, host).unwrap();
    assert!(calls.borrow().is_empty());
}

fn deferred_component(rt: &mut Runtime, handlers: &DeferredHandlers) {
    define()
        .parts(PartDeclaration::new().part("value", Vec::<String>::new()).unwrap())
        .tag("x-data")
        .class()
        .deferred_part_callbacks(handlers.clone())
        .register(rt)
        .unwrap();
}

fn data_host(rt: &mut Runtime) -> (NodeId, NodeId) {
    let host = rt.create_element("x-data");
    rt.set_attribute(host, "data-value", "").unwrap();
    let el = part(rt, host, "span", "value");
    (host, el)
}

fn value_handlers() -> PartHandlers {
    PartHandlers::new().on("value", |ctx, el| {
        ctx.set_text_content(el, "42")?;
        Ok(())
    })
}

#[test]
fn test_deferred_handlers_hydrate_on_settle() {
    let mut rt = Runtime::new();
    let handlers = DeferredHandlers::new();
    deferred_component(&mut rt, &handlers);
    let body = body(&mut rt);
    let (host, el) = data_host(&mut rt);
    rt.append_child(body, host).unwrap();

    assert!(handlers.is_pending());
    assert_eq!(handlers.waiting(), 1);
    assert_eq!(rt.document().text_content(el), "");

    assert_eq!(rt.settle_handlers(&handlers, Ok(value_handlers())), 1);
    assert_eq!(rt.document().text_content(el), "42");

    // Settled handlers are used directly on later passes.
    rt.set_text_content(el, "").unwrap();
    let report = rt.hydrate(host);
    assert!(!report.deferred);
    assert_eq!(rt.document().text_content(el), "42");
}

#[test]
fn test_deferred_settle_after_disconnect_skips_hydration() {
    let mut rt = Runtime::new();
    let handlers = DeferredHandlers::new();
    deferred_component(&mut rt, &handlers);
    let body = body(&mut rt);
    let (host, el) = data_host(&mut rt);
    rt.append_child(body, host).unwrap();
    rt.remove(host).unwrap();

    assert_eq!(rt.settle_handlers(&handlers, Ok(value_handlers())), 0);
    assert_eq!(rt.document().text_content(el), "");
}

#[test]
fn test_reconnecting_while_pending_keeps_one_waiter() {
    let mut rt = Runtime::new();
    let handlers = DeferredHandlers::new();
    deferred_component(&mut rt, &handlers);
    let body = body(&mut rt);
    let (host, el) = data_host(&mut rt);
    rt.append_child(body, host).unwrap();
    for _ in 0..5 {
        rt.remove(host).unwrap();
        rt.append_child(body, host).unwrap();
    }

    // Waiters from aborted epochs are dropped on the next wait.
    assert_eq!(handlers.waiting(), 1);
    assert_eq!(rt.settle_handlers(&handlers, Ok(value_handlers())), 1);
    assert_eq!(rt.document().text_content(el), "42");
}

#[test]
fn test_deferred_handlers_for_undeclared_key_fail_settlement() {
    let mut rt = Runtime::new();
    let handlers = DeferredHandlers::new();
    deferred_component(&mut rt, &handlers);
    let body = body(&mut rt);
    let (host, el) = data_host(&mut rt);
    rt.append_child(body, host).unwrap();

    let stray = value_handlers().on("notDeclared", |_, _| Ok(()));
    assert_eq!(rt.settle_handlers(&handlers, Ok(stray)), 0);
    assert!(!handlers.is_pending());
    assert_eq!(
        handlers.error(),
        Some(LoadError::UnknownPartKey {
            tag: "x-data".to_string(),
            key: "notDeclared".to_string(),
        })
    );
    assert_eq!(rt.hydrate(host), HydrationReport::default());
    assert_eq!(rt.document().text_content(el), "");
}

#[test]
fn test_failed_deferred_handlers_leave_instances_unhydrated() {
    let mut rt = Runtime::new();
    let handlers = DeferredHandlers::new();
    deferred_component(&mut rt, &handlers);
    let body = body(&mut rt);
    let (host, el) = data_host(&mut rt);
    rt.append_child(body, host).unwrap();

    let err = LoadError::Data("timeout".to_string());
    assert_eq!(rt.settle_handlers(&handlers, Err(err.clone())), 0);
    assert_eq!(handlers.error(), Some(err));
    assert_eq!(rt.hydrate(host), HydrationReport::default());
    assert_eq!(rt.document().text_content(el), "");

    // A second settlement is ignored.
    assert_eq!(rt.settle_handlers(&handlers, Ok(value_handlers())), 0);
}

#[test]
fn test_panicking_handler_does_not_stall_later_reactions() {
    let mut rt = Runtime::new();
    define()
        .parts(PartDeclaration::new().part("boom", Vec::<String>::new()).unwrap())
        .tag("x-boom")
        .class()
        .part_callbacks(PartHandlers::new().on("boom", |_, _| panic!("handler bug")))
        .register(&mut rt)
        .unwrap();
    let calls: Calls = Rc::default();
    define()
        .parts(PartDeclaration::new().part("x", Vec::<String>::new()).unwrap())
        .tag("x-after")
        .class()
        .part_callbacks(recording(&calls, &["x"]))
        .register(&mut rt)
        .unwrap();
    let body = body(&mut rt);

    let boom = rt.create_element("x-boom");
    rt.set_attribute(boom, "data-boom", "").unwrap();
    part(&mut rt, boom, "p", "boom");
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| rt.append_child(body, boom)));
    assert!(outcome.is_err());

    let after = rt.create_element("x-after");
    rt.set_attribute(after, "data-x", "").unwrap();
    let p = part(&mut rt, after, "p", "x");
    rt.append_child(body, after).unwrap();
    assert_eq!(*calls.borrow(), vec![("x".to_string(), p)]);
}
