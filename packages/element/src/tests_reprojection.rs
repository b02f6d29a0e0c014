/// Tests for `<parts-root>` relocation into an ancestor's shadow tree
use crate::builder::define;
use crate::hydration::PartHandlers;
use crate::parts::{PartDeclaration, PART_ATTRIBUTE};
use crate::reprojection::{connect_root, ReprojectionState, PARTS_ROOT_TAG};
use crate::runtime::Runtime;
use shade_dom::{to_html, NodeId, ShadowRootMode};
use std::cell::RefCell;
use std::rc::Rc;

fn runtime() -> (Runtime, NodeId) {
    let mut rt = Runtime::new();
    rt.bootstrap().unwrap();
    let body = rt.create_element("body");
    let root = rt.document().root();
    rt.append_child(root, body).unwrap();
    (rt, body)
}

/// `<div><parts-root><p></p>text</parts-root></div>`, detached.
fn host_with_root(rt: &mut Runtime) -> (NodeId, NodeId, Vec<NodeId>) {
    let host = rt.create_element("div");
    let parts_root = rt.create_element(PARTS_ROOT_TAG);
    rt.append_child(host, parts_root).unwrap();
    let p = rt.create_element("p");
    let text = rt.create_text("text");
    rt.append_children(parts_root, &[p, text]).unwrap();
    (host, parts_root, vec![p, text])
}

#[test]
fn test_children_move_into_parent_shadow_on_connect() {
    let (mut rt, body) = runtime();
    let (host, parts_root, children) = host_with_root(&mut rt);
    assert_eq!(rt.reprojection_state(parts_root), ReprojectionState::Unattached);

    rt.append_child(body, host).unwrap();

    let shadow = rt.document().shadow_root(host).unwrap();
    let html = to_html(rt.document(), host);
    assert_eq!(rt.document().children(shadow), children.as_slice(), "{html}");
    assert!(
        html.starts_with("<div><template shadowrootmode=\"open\"><p></p>text</template>"),
        "{html}"
    );
    assert!(!rt.document().has_child_nodes(parts_root), "{html}");
    assert_eq!(
        rt.reprojection_state(parts_root),
        ReprojectionState::AttachedWithChildren
    );
    assert!(matches!(
        rt.document().kind(shadow),
        Ok(shade_dom::NodeKind::ShadowRoot {
            mode: ShadowRootMode::Open,
            ..
        })
    ));
}

#[test]
fn test_empty_root_attaches_without_moving() {
    let (mut rt, body) = runtime();
    let host = rt.create_element("div");
    let parts_root = rt.create_element(PARTS_ROOT_TAG);
    rt.append_child(host, parts_root).unwrap();
    rt.append_child(body, host).unwrap();

    assert_eq!(rt.reprojection_state(parts_root), ReprojectionState::AttachedEmpty);
    assert!(rt.document().shadow_root(host).is_none());
}

#[test]
fn test_relocation_is_idempotent() {
    let (mut rt, body) = runtime();
    let (host, parts_root, children) = host_with_root(&mut rt);
    rt.append_child(body, host).unwrap();

    let first = connect_root(&mut rt, parts_root).unwrap();
    let second = connect_root(&mut rt, parts_root).unwrap();
    assert_eq!(first, ReprojectionState::AttachedWithChildren);
    assert_eq!(second, ReprojectionState::AttachedWithChildren);

    let shadow = rt.document().shadow_root(host).unwrap();
    assert_eq!(rt.document().children(shadow), children.as_slice());
}

#[test]
fn test_existing_shadow_root_is_reused() {
    let (mut rt, body) = runtime();
    let (host, _, children) = host_with_root(&mut rt);
    let existing = rt.attach_shadow(host, ShadowRootMode::Closed).unwrap();
    let kept = rt.create_element("header");
    rt.append_child(existing, kept).unwrap();

    rt.append_child(body, host).unwrap();

    assert_eq!(rt.document().shadow_root(host), Some(existing));
    let mut expected = vec![kept];
    expected.extend(children);
    assert_eq!(rt.document().children(existing), expected.as_slice());
}

#[test]
fn test_non_element_parent_receives_children_directly() {
    let (mut rt, body) = runtime();
    let host = rt.create_element("section");
    let shadow = rt.attach_shadow(host, ShadowRootMode::Open).unwrap();
    let parts_root = rt.create_element(PARTS_ROOT_TAG);
    let item = rt.create_element("li");
    rt.append_child(parts_root, item).unwrap();
    rt.append_child(shadow, parts_root).unwrap();

    rt.append_child(body, host).unwrap();
    assert_eq!(rt.document().children(shadow), &[parts_root, item]);
}

#[test]
fn test_slotchange_relocates_late_children() {
    let (mut rt, body) = runtime();
    let host = rt.create_element("div");
    let parts_root = rt.create_element(PARTS_ROOT_TAG);
    rt.append_child(host, parts_root).unwrap();
    rt.append_child(body, host).unwrap();
    assert_eq!(rt.reprojection_state(parts_root), ReprojectionState::AttachedEmpty);

    let late = rt.create_element("p");
    rt.append_child(parts_root, late).unwrap();

    let shadow = rt.document().shadow_root(host).unwrap();
    assert_eq!(rt.document().children(shadow), &[late]);
    assert!(!rt.document().has_child_nodes(parts_root));
    assert_eq!(
        rt.reprojection_state(parts_root),
        ReprojectionState::AttachedWithChildren
    );
}

#[test]
fn test_disconnect_stops_listening_and_keeps_moved_children() {
    let (mut rt, body) = runtime();
    let (host, parts_root, children) = host_with_root(&mut rt);
    rt.append_child(body, host).unwrap();
    let own_shadow = rt.document().shadow_root(parts_root).unwrap();
    let slot = rt.document().children(own_shadow)[0];
    assert!(rt.has_slotchange_listener(slot));

    rt.remove(parts_root).unwrap();
    assert_eq!(rt.reprojection_state(parts_root), ReprojectionState::Unattached);
    assert!(!rt.has_slotchange_listener(slot));

    let shadow = rt.document().shadow_root(host).unwrap();
    assert_eq!(rt.document().children(shadow), children.as_slice());

    // Children added while detached stay put.
    let late = rt.create_element("p");
    rt.append_child(parts_root, late).unwrap();
    assert_eq!(rt.document().parent(late), Some(parts_root));
}

fn register_hydrating_host(rt: &mut Runtime, calls: &Rc<RefCell<Vec<NodeId>>>) {
    let log = calls.clone();
    define()
        .parts(PartDeclaration::new().part("titleEl", ["h1"]).unwrap())
        .tag("x-page")
        .class()
        .part_callbacks(PartHandlers::new().on("titleEl", move |_, el| {
            log.borrow_mut().push(el);
            Ok(())
        }))
        .register(rt)
        .unwrap();
}

#[test]
fn test_reprojected_parts_are_hydrated_by_the_host() {
    let (mut rt, body) = runtime();
    let calls: Rc<RefCell<Vec<NodeId>>> = Rc::default();
    register_hydrating_host(&mut rt, &calls);

    let host = rt.create_element("x-page");
    rt.set_attribute(host, "data-title-el", "").unwrap();
    let parts_root = rt.create_element(PARTS_ROOT_TAG);
    rt.append_child(host, parts_root).unwrap();
    let h1 = rt.create_element("h1");
    rt.set_attribute(h1, PART_ATTRIBUTE, "titleEl").unwrap();
    rt.append_child(parts_root, h1).unwrap();

    rt.append_child(body, host).unwrap();

    let shadow = rt.document().shadow_root(host).unwrap();
    assert_eq!(rt.document().parent(h1), Some(shadow));
    assert_eq!(*calls.borrow(), vec![h1]);
}

#[test]
fn test_parts_moved_into_a_nested_shadow_stay_hidden() {
    let (mut rt, body) = runtime();
    let calls: Rc<RefCell<Vec<NodeId>>> = Rc::default();
    register_hydrating_host(&mut rt, &calls);

    let host = rt.create_element("x-page");
    rt.set_attribute(host, "data-title-el", "").unwrap();
    let a = rt.create_element("h1");
    rt.set_attribute(a, PART_ATTRIBUTE, "titleEl").unwrap();
    rt.append_child(host, a).unwrap();
    let parts_root = rt.create_element(PARTS_ROOT_TAG);
    rt.append_child(a, parts_root).unwrap();
    let b = rt.create_element("h1");
    rt.set_attribute(b, PART_ATTRIBUTE, "titleEl").unwrap();
    rt.append_child(parts_root, b).unwrap();

    rt.append_child(body, host).unwrap();
    assert_eq!(rt.document().parent(b), rt.document().shadow_root(a));

    calls.borrow_mut().clear();
    rt.hydrate(host);
    assert_eq!(*calls.borrow(), vec![a]);
}

#[test]
fn test_bootstrap_runs_once() {
    let mut rt = Runtime::new();
    assert!(!rt.registry().is_defined(PARTS_ROOT_TAG));
    rt.bootstrap().unwrap();
    rt.bootstrap().unwrap();
    assert_eq!(
        rt.registry().names().collect::<Vec<_>>(),
        vec![PARTS_ROOT_TAG, crate::DEFINITION_LOADER_TAG]
    );
}
