//! Reprojection Root (`<parts-root>`).
//!
//! Relocates its children into the nearest ancestor's shadow tree when it
//! connects and whenever its slot reports a `slotchange`. The moved nodes
//! belong to the ancestor afterwards; nothing is moved back on disconnect.

use crate::builder::{define, ComponentClass, Tagged};
use crate::context::ElementContext;
use crate::error::{CallbackResult, ElementResult};
use crate::lifecycle::LifecycleCallbacks;
use crate::runtime::Runtime;
use shade_dom::{to_html, NodeId, ShadowRootMode};
use tracing::debug;

pub const PARTS_ROOT_TAG: &str = "parts-root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReprojectionState {
    #[default]
    Unattached,
    AttachedEmpty,
    AttachedWithChildren,
}

pub(crate) fn parts_root_class() -> ComponentClass<Tagged> {
    define()
        .shadow(ShadowRootMode::Open)
        .tag(PARTS_ROOT_TAG)
        .class()
        .lifecycle_callbacks(
            LifecycleCallbacks::new()
                .connected(on_connected)
                .disconnected(on_disconnected),
        )
}

fn on_connected(ctx: &mut ElementContext<'_>) -> CallbackResult {
    let slot = ensure_slot(ctx)?;
    ctx.listen_slotchange(slot, on_slotchange);
    let root = ctx.node();
    connect_root(ctx.runtime(), root)?;
    Ok(())
}

fn on_disconnected(ctx: &mut ElementContext<'_>) -> CallbackResult {
    if let Some(slot) = own_slot(ctx) {
        ctx.unlisten_slotchange(slot);
    }
    let root = ctx.node();
    ctx.runtime().set_reprojection_state(root, ReprojectionState::Unattached);
    Ok(())
}

fn on_slotchange(ctx: &mut ElementContext<'_>, _slot: NodeId) -> CallbackResult {
    let root = ctx.node();
    connect_root(ctx.runtime(), root)?;
    Ok(())
}

fn own_slot(ctx: &ElementContext<'_>) -> Option<NodeId> {
    let doc = ctx.document();
    let shadow = doc.shadow_root(ctx.node())?;
    doc.children(shadow)
        .iter()
        .copied()
        .find(|&child| doc.is_element_named(child, "slot"))
}

/// The root's own shadow tree holds a single unnamed `<slot>`.
fn ensure_slot(ctx: &mut ElementContext<'_>) -> ElementResult<NodeId> {
    if let Some(slot) = own_slot(ctx) {
        return Ok(slot);
    }
    let shadow = ctx.shadow_root()?;
    let runtime = ctx.runtime();
    let slot = runtime.create_element("slot");
    runtime.append_child(shadow, slot)?;
    Ok(slot)
}

/// Run the relocation decision for `root`. Calling it on a root that has
/// already moved its children is a no-op.
pub fn connect_root(runtime: &mut Runtime, root: NodeId) -> ElementResult<ReprojectionState> {
    let doc = runtime.document();
    let parent = doc.parent(root);
    let children = doc.children(root).to_vec();
    let current = runtime.reprojection_state(root);

    let (Some(parent), false) = (parent, children.is_empty()) else {
        let next = match current {
            ReprojectionState::Unattached if children.is_empty() => ReprojectionState::AttachedEmpty,
            state => state,
        };
        runtime.set_reprojection_state(root, next);
        return Ok(next);
    };

    let target = if runtime.document().is_element(parent) {
        match runtime.document().shadow_root(parent) {
            Some(shadow) => shadow,
            None => runtime.attach_shadow(parent, ShadowRootMode::Open)?,
        }
    } else {
        parent
    };

    runtime.append_children(target, &children)?;
    debug!(
        ?root,
        ?target,
        moved = children.len(),
        html = %to_html(runtime.document(), target),
        "Relocated parts-root children"
    );
    runtime.set_reprojection_state(root, ReprojectionState::AttachedWithChildren);
    if let Some(host) = runtime.document().host(target) {
        runtime.queue_hydration(host);
        runtime.drain();
    }
    Ok(ReprojectionState::AttachedWithChildren)
}
