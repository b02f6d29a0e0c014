//! Callback context: the runtime plus the instance a callback runs for.

use crate::builder::ComponentDefinition;
use crate::error::{CallbackResult, ElementError, ElementResult};
use crate::hydration::{hydrate, HydrationReport};
use crate::internals::ElementInternals;
use crate::runtime::Runtime;
use crate::signal::DisconnectSignal;
use shade_dom::{Document, NodeId};
use std::rc::Rc;

pub struct ElementContext<'a> {
    runtime: &'a mut Runtime,
    node: NodeId,
}

impl<'a> ElementContext<'a> {
    pub(crate) fn new(runtime: &'a mut Runtime, node: NodeId) -> Self {
        Self { runtime, node }
    }

    /// The instance element.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn runtime(&mut self) -> &mut Runtime {
        &mut *self.runtime
    }

    pub fn document(&self) -> &Document {
        self.runtime.document()
    }

    pub fn tag_name(&self) -> &str {
        self.runtime.document().local_name(self.node).unwrap_or_default()
    }

    pub fn definition(&self) -> Option<Rc<ComponentDefinition>> {
        self.runtime.definition_of(self.node)
    }

    pub fn is_connected(&self) -> bool {
        self.runtime.document().is_connected(self.node)
    }

    pub fn attr_value(&self, name: &str) -> Option<String> {
        self.runtime
            .document()
            .get_attribute(self.node, name)
            .map(str::to_string)
    }

    /// The attribute value, or `default` when it is unset.
    pub fn attr_or(&self, name: &str, default: &str) -> String {
        self.attr_value(name).unwrap_or_else(|| default.to_string())
    }

    /// Set the attribute, or remove it for `None`.
    pub fn set_attr(&mut self, name: &str, value: Option<&str>) -> ElementResult<()> {
        match value {
            Some(value) => self.runtime.set_attribute(self.node, name, value),
            None => self.runtime.remove_attribute(self.node, name),
        }
    }

    /// The instance's shadow root, attached in the component's shadow mode
    /// on first access. An existing shadow root is reused. Attaching needs
    /// the `shadow` capability.
    pub fn shadow_root(&mut self) -> ElementResult<NodeId> {
        if let Some(shadow) = self.runtime.document().shadow_root(self.node) {
            return Ok(shadow);
        }
        let definition = self
            .definition()
            .ok_or(ElementError::NotAnInstance(self.node))?;
        let mode = definition
            .shadow_mode()
            .ok_or_else(|| ElementError::NoShadowCapability(definition.tag().to_string()))?;
        self.runtime.attach_shadow(self.node, mode)
    }

    pub fn set_text_content(&mut self, target: NodeId, text: &str) -> ElementResult<()> {
        self.runtime.set_text_content(target, text)
    }

    pub fn internals(&self) -> ElementResult<&ElementInternals> {
        self.runtime
            .instance(self.node)
            .and_then(|instance| instance.internals.as_ref())
            .ok_or(ElementError::NotAnInstance(self.node))
    }

    pub fn internals_mut(&mut self) -> ElementResult<&mut ElementInternals> {
        let node = self.node;
        self.runtime
            .instance_mut(node)
            .and_then(|instance| instance.internals.as_mut())
            .ok_or(ElementError::NotAnInstance(node))
    }

    /// The form owner of a form-associated instance.
    pub fn form(&self) -> Option<NodeId> {
        self.runtime.instance(self.node).and_then(|i| i.form_owner)
    }

    /// Signal of the current connected epoch, created on first access.
    pub fn disconnect_signal(&mut self) -> DisconnectSignal {
        self.runtime.disconnect_signal(self.node)
    }

    pub fn hydrate(&mut self) -> HydrationReport {
        hydrate(&mut *self.runtime, self.node)
    }

    /// Listen for `slotchange` on `slot`, on behalf of this instance.
    pub fn listen_slotchange(
        &mut self,
        slot: NodeId,
        handler: impl Fn(&mut ElementContext<'_>, NodeId) -> CallbackResult + 'static,
    ) {
        self.runtime.add_slotchange_listener(slot, self.node, Rc::new(handler));
    }

    pub fn unlisten_slotchange(&mut self, slot: NodeId) {
        self.runtime.remove_slotchange_listener(slot, self.node);
    }
}
