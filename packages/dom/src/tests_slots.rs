/// Tests for slot assignment between a host's light children and its shadow tree
use crate::document::{Document, NodeId, ShadowRootMode};

fn host_with_slots(doc: &mut Document, names: &[Option<&str>]) -> (NodeId, Vec<NodeId>) {
    let host = doc.create_element("x-card");
    let shadow = doc.attach_shadow(host, ShadowRootMode::Open).unwrap();
    let mut slots = Vec::new();
    for name in names {
        let slot = doc.create_element("slot");
        if let Some(name) = name {
            doc.set_attribute(slot, "name", *name).unwrap();
        }
        doc.append_child(shadow, slot).unwrap();
        slots.push(slot);
    }
    (host, slots)
}

#[test]
fn test_default_slot_takes_unnamed_children() {
    let mut doc = Document::new();
    let (host, slots) = host_with_slots(&mut doc, &[None]);
    let text = doc.create_text("hi");
    let el = doc.create_element("span");
    doc.append_children(host, &[text, el]).unwrap();

    assert_eq!(doc.assigned_slot(text), Some(slots[0]));
    assert_eq!(doc.assigned_slot(el), Some(slots[0]));
    assert_eq!(doc.assigned_nodes(slots[0]), vec![text, el]);
}

#[test]
fn test_named_slot_takes_matching_children() {
    let mut doc = Document::new();
    let (host, slots) = host_with_slots(&mut doc, &[None, Some("title")]);
    let title = doc.create_element("h2");
    doc.set_attribute(title, "slot", "title").unwrap();
    let body = doc.create_element("p");
    doc.append_children(host, &[title, body]).unwrap();

    assert_eq!(doc.assigned_slot(title), Some(slots[1]));
    assert_eq!(doc.assigned_slot(body), Some(slots[0]));
    assert_eq!(doc.assigned_nodes(slots[1]), vec![title]);
}

#[test]
fn test_unmatched_slot_name_is_unassigned() {
    let mut doc = Document::new();
    let (host, slots) = host_with_slots(&mut doc, &[Some("title")]);
    let body = doc.create_element("p");
    doc.append_child(host, body).unwrap();

    assert_eq!(doc.assigned_slot(body), None);
    assert!(doc.assigned_nodes(slots[0]).is_empty());
}

#[test]
fn test_host_without_shadow_assigns_nothing() {
    let mut doc = Document::new();
    let host = doc.create_element("div");
    let child = doc.create_element("p");
    doc.append_child(host, child).unwrap();
    assert_eq!(doc.assigned_slot(child), None);
}
