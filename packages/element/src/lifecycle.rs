//! Lifecycle Dispatcher.
//!
//! Components carry explicit callback tables ([`LifecycleCallbacks`],
//! [`FormCallbacks`]); the runtime queues [`Reaction`]s while it mutates the
//! document and drains them through [`dispatch`]. A failing callback is
//! logged with the instance tag and the hook name, and dispatch carries on.

use crate::context::ElementContext;
use crate::error::CallbackResult;
use crate::hydration::hydrate;
use crate::internals::{FormValue, RestoreReason};
use crate::runtime::Runtime;
use shade_dom::NodeId;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, error};

pub type LifecycleHook = Rc<dyn Fn(&mut ElementContext<'_>) -> CallbackResult>;
pub type AttributeChangedHook = Rc<dyn Fn(&mut ElementContext<'_>, &AttributeChange) -> CallbackResult>;
pub type FormAssociatedHook = Rc<dyn Fn(&mut ElementContext<'_>, Option<NodeId>) -> CallbackResult>;
pub type FormDisabledHook = Rc<dyn Fn(&mut ElementContext<'_>, bool) -> CallbackResult>;
pub type FormStateRestoreHook =
    Rc<dyn Fn(&mut ElementContext<'_>, &FormValue, RestoreReason) -> CallbackResult>;

/// Arguments of `attributeChangedCallback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    pub name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// `connectedCallback`, `disconnectedCallback`, `attributeChangedCallback`
/// and `adoptedCallback`. Installing a table over an existing one replaces
/// only the hooks the new table sets.
#[derive(Clone, Default)]
pub struct LifecycleCallbacks {
    pub(crate) connected: Option<LifecycleHook>,
    pub(crate) disconnected: Option<LifecycleHook>,
    pub(crate) attribute_changed: Option<AttributeChangedHook>,
    pub(crate) adopted: Option<LifecycleHook>,
}

impl LifecycleCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected(
        mut self,
        hook: impl Fn(&mut ElementContext<'_>) -> CallbackResult + 'static,
    ) -> Self {
        self.connected = Some(Rc::new(hook));
        self
    }

    pub fn disconnected(
        mut self,
        hook: impl Fn(&mut ElementContext<'_>) -> CallbackResult + 'static,
    ) -> Self {
        self.disconnected = Some(Rc::new(hook));
        self
    }

    pub fn attribute_changed(
        mut self,
        hook: impl Fn(&mut ElementContext<'_>, &AttributeChange) -> CallbackResult + 'static,
    ) -> Self {
        self.attribute_changed = Some(Rc::new(hook));
        self
    }

    pub fn adopted(
        mut self,
        hook: impl Fn(&mut ElementContext<'_>) -> CallbackResult + 'static,
    ) -> Self {
        self.adopted = Some(Rc::new(hook));
        self
    }

    pub fn has_connected(&self) -> bool {
        self.connected.is_some()
    }

    pub(crate) fn install(&mut self, other: LifecycleCallbacks) {
        if other.connected.is_some() {
            self.connected = other.connected;
        }
        if other.disconnected.is_some() {
            self.disconnected = other.disconnected;
        }
        if other.attribute_changed.is_some() {
            self.attribute_changed = other.attribute_changed;
        }
        if other.adopted.is_some() {
            self.adopted = other.adopted;
        }
    }
}

impl fmt::Debug for LifecycleCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleCallbacks")
            .field("connected", &self.connected.is_some())
            .field("disconnected", &self.disconnected.is_some())
            .field("attribute_changed", &self.attribute_changed.is_some())
            .field("adopted", &self.adopted.is_some())
            .finish()
    }
}

/// `formAssociatedCallback`, `formResetCallback`, `formDisabledCallback`
/// and `formStateRestoreCallback`.
#[derive(Clone, Default)]
pub struct FormCallbacks {
    pub(crate) associated: Option<FormAssociatedHook>,
    pub(crate) reset: Option<LifecycleHook>,
    pub(crate) disabled: Option<FormDisabledHook>,
    pub(crate) state_restore: Option<FormStateRestoreHook>,
}

impl FormCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn associated(
        mut self,
        hook: impl Fn(&mut ElementContext<'_>, Option<NodeId>) -> CallbackResult + 'static,
    ) -> Self {
        self.associated = Some(Rc::new(hook));
        self
    }

    pub fn reset(
        mut self,
        hook: impl Fn(&mut ElementContext<'_>) -> CallbackResult + 'static,
    ) -> Self {
        self.reset = Some(Rc::new(hook));
        self
    }

    pub fn disabled(
        mut self,
        hook: impl Fn(&mut ElementContext<'_>, bool) -> CallbackResult + 'static,
    ) -> Self {
        self.disabled = Some(Rc::new(hook));
        self
    }

    pub fn state_restore(
        mut self,
        hook: impl Fn(&mut ElementContext<'_>, &FormValue, RestoreReason) -> CallbackResult + 'static,
    ) -> Self {
        self.state_restore = Some(Rc::new(hook));
        self
    }

    pub(crate) fn install(&mut self, other: FormCallbacks) {
        if other.associated.is_some() {
            self.associated = other.associated;
        }
        if other.reset.is_some() {
            self.reset = other.reset;
        }
        if other.disabled.is_some() {
            self.disabled = other.disabled;
        }
        if other.state_restore.is_some() {
            self.state_restore = other.state_restore;
        }
    }
}

impl fmt::Debug for FormCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormCallbacks")
            .field("associated", &self.associated.is_some())
            .field("reset", &self.reset.is_some())
            .field("disabled", &self.disabled.is_some())
            .field("state_restore", &self.state_restore.is_some())
            .finish()
    }
}

/// Work queued by a document mutation, run once the mutation completes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Reaction {
    Connected(NodeId),
    Disconnected(NodeId),
    Adopted(NodeId),
    AttributeChanged(NodeId, AttributeChange),
    SlotChange(NodeId),
    FormReset(NodeId),
    FormDisabled(NodeId, bool),
    FormStateRestore(NodeId, FormValue, RestoreReason),
    Hydrate(NodeId),
}

/// Run a callback for `node`, logging instead of propagating its error.
pub(crate) fn invoke(
    runtime: &mut Runtime,
    node: NodeId,
    hook: &'static str,
    callback: impl FnOnce(&mut ElementContext<'_>) -> CallbackResult,
) {
    let result = callback(&mut ElementContext::new(runtime, node));
    if let Err(err) = result {
        let tag = runtime.document().local_name(node).unwrap_or("#unknown");
        error!(tag = %tag, hook, error = %err, "Error in lifecycle callback");
    }
}

pub(crate) fn dispatch(runtime: &mut Runtime, reaction: Reaction) {
    match reaction {
        Reaction::Connected(node) => connected(runtime, node),
        Reaction::Disconnected(node) => disconnected(runtime, node),
        Reaction::Adopted(node) => {
            if let Some(hook) = runtime.definition_of(node).and_then(|d| d.lifecycle().adopted.clone()) {
                invoke(runtime, node, "adoptedCallback", |ctx| hook(ctx));
            }
        }
        Reaction::AttributeChanged(node, change) => {
            let hook = runtime
                .definition_of(node)
                .and_then(|d| d.lifecycle().attribute_changed.clone());
            if let Some(hook) = hook {
                invoke(runtime, node, "attributeChangedCallback", |ctx| hook(ctx, &change));
            }
        }
        Reaction::SlotChange(slot) => {
            for (owner, handler) in runtime.slotchange_listeners(slot) {
                invoke(runtime, owner, "slotchange", |ctx| handler(ctx, slot));
            }
        }
        Reaction::FormReset(node) => {
            if let Some(hook) = runtime.definition_of(node).and_then(|d| d.form().reset.clone()) {
                invoke(runtime, node, "formResetCallback", |ctx| hook(ctx));
            }
        }
        Reaction::FormDisabled(node, disabled) => {
            if let Some(hook) = runtime.definition_of(node).and_then(|d| d.form().disabled.clone()) {
                invoke(runtime, node, "formDisabledCallback", |ctx| hook(ctx, disabled));
            }
        }
        Reaction::FormStateRestore(node, state, reason) => {
            let hook = runtime
                .definition_of(node)
                .and_then(|d| d.form().state_restore.clone());
            if let Some(hook) = hook {
                invoke(runtime, node, "formStateRestoreCallback", |ctx| {
                    hook(ctx, &state, reason)
                });
            }
        }
        Reaction::Hydrate(node) => {
            if runtime.document().is_connected(node) {
                hydrate(runtime, node);
            }
        }
    }
}

/// The installed `connectedCallback` runs; a parts component without one
/// hydrates instead. Form association is refreshed afterwards.
fn connected(runtime: &mut Runtime, node: NodeId) {
    let Some(definition) = runtime.definition_of(node) else {
        return;
    };
    match definition.lifecycle().connected.clone() {
        Some(hook) => invoke(runtime, node, "connectedCallback", |ctx| hook(ctx)),
        None if definition.parts().is_some() => {
            hydrate(runtime, node);
        }
        None => {}
    }
    if definition.form_associated() {
        let form = runtime
            .document()
            .parent(node)
            .and_then(|parent| runtime.document().closest(parent, "form"));
        update_form_owner(runtime, node, form);
    }
}

/// The installed `disconnectedCallback` runs, then the epoch's Disconnect
/// Signal is aborted and discarded.
fn disconnected(runtime: &mut Runtime, node: NodeId) {
    let Some(definition) = runtime.definition_of(node) else {
        return;
    };
    if let Some(hook) = definition.lifecycle().disconnected.clone() {
        invoke(runtime, node, "disconnectedCallback", |ctx| hook(ctx));
    }
    runtime.abort_disconnect_signal(node);
    if definition.form_associated() {
        update_form_owner(runtime, node, None);
    }
}

fn update_form_owner(runtime: &mut Runtime, node: NodeId, form: Option<NodeId>) {
    if !runtime.set_form_owner(node, form) {
        return;
    }
    debug!(?node, ?form, "Form owner changed");
    let hook = runtime
        .definition_of(node)
        .and_then(|d| d.form().associated.clone());
    if let Some(hook) = hook {
        invoke(runtime, node, "formAssociatedCallback", |ctx| hook(ctx, form));
    }
}
