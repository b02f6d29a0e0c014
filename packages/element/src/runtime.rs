//! Single-threaded element runtime.
//!
//! ## Purpose
//!
//! The runtime owns the [`Document`], the [`CustomElementRegistry`] and the
//! state of every custom element instance. Public mutations change the
//! document, queue the custom element reactions they cause and drain the
//! queue before returning. Reactions queued by callbacks are drained by the
//! outermost call, in FIFO order.

use crate::builder::ComponentDefinition;
use crate::context::ElementContext;
use crate::error::{CallbackResult, ElementError, ElementResult, LoadError};
use crate::hydration::{hydrate, DeferredHandlers, HydrationReport, PartHandlers};
use crate::internals::{ElementInternals, FormValue, RestoreReason};
use crate::lifecycle::{dispatch, AttributeChange, Reaction};
use crate::loader::{definition_loader_class, ComponentModule, ModuleLoader};
use crate::registry::CustomElementRegistry;
use crate::reprojection::{parts_root_class, ReprojectionState};
use crate::signal::{DisconnectController, DisconnectSignal};
use shade_dom::{Document, NodeId, ShadowRootMode};
use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, error, warn};

pub(crate) type SlotChangeHandler = Rc<dyn Fn(&mut ElementContext<'_>, NodeId) -> CallbackResult>;

/// Per-instance state of an upgraded custom element.
#[derive(Debug)]
pub struct ElementInstance {
    pub(crate) definition: Rc<ComponentDefinition>,
    pub(crate) internals: Option<ElementInternals>,
    pub(crate) disconnect: DisconnectController,
    pub(crate) form_owner: Option<NodeId>,
}

impl ElementInstance {
    fn new(definition: Rc<ComponentDefinition>) -> Self {
        let internals = match (definition.internals_defaults(), definition.form_associated()) {
            (Some(defaults), _) => Some(ElementInternals::seeded(defaults)),
            (None, true) => Some(ElementInternals::default()),
            (None, false) => None,
        };
        Self {
            definition,
            internals,
            disconnect: DisconnectController::default(),
            form_owner: None,
        }
    }

    pub fn definition(&self) -> &ComponentDefinition {
        &self.definition
    }

    pub fn internals(&self) -> Option<&ElementInternals> {
        self.internals.as_ref()
    }

    pub fn form_owner(&self) -> Option<NodeId> {
        self.form_owner
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ModuleState {
    Requested,
    Loaded,
    Failed(LoadError),
}

/// Holds the draining flag for one drain. Clears it on drop, unwinding
/// included.
struct DrainGuard(Rc<Cell<bool>>);

impl DrainGuard {
    fn enter(flag: &Rc<Cell<bool>>) -> Self {
        flag.set(true);
        Self(flag.clone())
    }
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct Runtime {
    document: Document,
    registry: CustomElementRegistry,
    instances: HashMap<NodeId, ElementInstance>,
    reactions: VecDeque<Reaction>,
    draining: Rc<Cell<bool>>,
    slot_listeners: HashMap<NodeId, Vec<(NodeId, SlotChangeHandler)>>,
    reprojection: HashMap<NodeId, ReprojectionState>,
    loader: Option<Rc<dyn ModuleLoader>>,
    modules: HashMap<String, ModuleState>,
    bootstrapped: bool,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("registry", &self.registry.names().collect::<Vec<_>>())
            .field("instances", &self.instances.len())
            .field("pending_reactions", &self.reactions.len())
            .field("modules", &self.modules)
            .field("bootstrapped", &self.bootstrapped)
            .finish()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// An empty runtime. No element is defined until [`Runtime::bootstrap`]
    /// or a component registration runs.
    pub fn new() -> Self {
        Self {
            document: Document::new(),
            registry: CustomElementRegistry::new(),
            instances: HashMap::new(),
            reactions: VecDeque::new(),
            draining: Rc::default(),
            slot_listeners: HashMap::new(),
            reprojection: HashMap::new(),
            loader: None,
            modules: HashMap::new(),
            bootstrapped: false,
        }
    }

    pub fn set_module_loader(&mut self, loader: impl ModuleLoader + 'static) {
        self.loader = Some(Rc::new(loader));
    }

    /// Define the built-in `parts-root` and `sh-def` elements. Runs once;
    /// later calls do nothing.
    pub fn bootstrap(&mut self) -> ElementResult<()> {
        if self.bootstrapped {
            return Ok(());
        }
        parts_root_class().register(self)?;
        definition_loader_class()?.register(self)?;
        self.bootstrapped = true;
        debug!("Built-in elements defined");
        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn registry(&self) -> &CustomElementRegistry {
        &self.registry
    }

    pub fn instance(&self, node: NodeId) -> Option<&ElementInstance> {
        self.instances.get(&node)
    }

    pub(crate) fn instance_mut(&mut self, node: NodeId) -> Option<&mut ElementInstance> {
        self.instances.get_mut(&node)
    }

    pub fn definition_of(&self, node: NodeId) -> Option<Rc<ComponentDefinition>> {
        self.instances.get(&node).map(|i| i.definition.clone())
    }

    pub fn reprojection_state(&self, root: NodeId) -> ReprojectionState {
        self.reprojection.get(&root).copied().unwrap_or_default()
    }

    pub(crate) fn set_reprojection_state(&mut self, root: NodeId, state: ReprojectionState) {
        self.reprojection.insert(root, state);
    }

    // ---- node creation ----

    /// Create a detached element. A defined tag is constructed right away.
    pub fn create_element(&mut self, local_name: &str) -> NodeId {
        let node = self.document.create_element(local_name);
        let definition = self
            .document
            .local_name(node)
            .and_then(|name| self.registry.get(name))
            .cloned();
        if let Some(definition) = definition {
            self.instances.insert(node, ElementInstance::new(definition));
        }
        node
    }

    pub fn create_text(&mut self, data: impl Into<String>) -> NodeId {
        self.document.create_text(data)
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.document.create_fragment()
    }

    // ---- mutation ----

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> ElementResult<()> {
        self.insert(parent, &[child], None)
    }

    /// Move every node under `parent` in one step, preserving order.
    pub fn append_children(&mut self, parent: NodeId, nodes: &[NodeId]) -> ElementResult<()> {
        self.insert(parent, nodes, None)
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> ElementResult<()> {
        self.insert(parent, &[child], reference)
    }

    fn insert(
        &mut self,
        parent: NodeId,
        nodes: &[NodeId],
        reference: Option<NodeId>,
    ) -> ElementResult<()> {
        let nodes = self.document.flatten_fragments(nodes);
        let was_connected: Vec<bool> = nodes
            .iter()
            .map(|&node| self.document.is_connected(node))
            .collect();
        let mut slots = self.listened_slots(&nodes);

        self.document.insert_children(parent, &nodes, reference)?;

        for (&node, &connected) in nodes.iter().zip(&was_connected) {
            if connected {
                self.queue_disconnected(node);
            }
        }
        if self.document.is_connected(parent) {
            for &node in &nodes {
                self.queue_connected(node);
            }
        }
        for slot in self.listened_slots(&nodes) {
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }
        self.queue_slotchange(slots);
        self.drain();
        Ok(())
    }

    pub fn remove(&mut self, node: NodeId) -> ElementResult<()> {
        let connected = self.document.is_connected(node);
        let slots = self.listened_slots(&[node]);
        self.document.remove(node)?;
        if connected {
            self.queue_disconnected(node);
        }
        self.queue_slotchange(slots);
        self.drain();
        Ok(())
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> ElementResult<()> {
        let slots_before = self.slot_attribute_slots(node, name);
        let old_value = self.document.set_attribute(node, name, value)?;
        self.queue_attribute_changed(node, name, old_value, Some(value.to_string()));
        self.queue_slot_attribute_change(node, name, slots_before);
        self.drain();
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> ElementResult<()> {
        let slots_before = self.slot_attribute_slots(node, name);
        if let Some(old_value) = self.document.remove_attribute(node, name)? {
            self.queue_attribute_changed(node, name, Some(old_value), None);
            self.queue_slot_attribute_change(node, name, slots_before);
        }
        self.drain();
        Ok(())
    }

    /// Replace the children of `node` with a single text node.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> ElementResult<()> {
        let connected = self.document.is_connected(node);
        let children = self.document.children(node).to_vec();
        let mut slots = self.listened_slots(&children);
        let removed = self.document.set_text_content(node, text)?;
        if connected {
            for child in removed {
                self.queue_disconnected(child);
            }
        }
        let added = self.document.children(node).to_vec();
        for slot in self.listened_slots(&added) {
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }
        self.queue_slotchange(slots);
        self.drain();
        Ok(())
    }

    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> ElementResult<NodeId> {
        Ok(self.document.attach_shadow(host, mode)?)
    }

    /// Report that `node` was adopted from another document.
    pub fn adopt(&mut self, node: NodeId) {
        for id in self.document.shadow_including_descendants(node) {
            if self.instances.contains_key(&id) {
                self.reactions.push_back(Reaction::Adopted(id));
            }
        }
        self.drain();
    }

    // ---- forms ----

    /// Run `formResetCallback` for every instance owned by `form`.
    pub fn reset_form(&mut self, form: NodeId) {
        for node in self.document.descendants(form) {
            if self.instance(node).and_then(|i| i.form_owner) == Some(form) {
                self.reactions.push_back(Reaction::FormReset(node));
            }
        }
        self.drain();
    }

    pub fn set_form_disabled(&mut self, node: NodeId, disabled: bool) -> ElementResult<()> {
        self.require_form_associated(node)?;
        self.reactions.push_back(Reaction::FormDisabled(node, disabled));
        self.drain();
        Ok(())
    }

    pub fn restore_form_state(
        &mut self,
        node: NodeId,
        state: FormValue,
        reason: RestoreReason,
    ) -> ElementResult<()> {
        self.require_form_associated(node)?;
        self.reactions
            .push_back(Reaction::FormStateRestore(node, state, reason));
        self.drain();
        Ok(())
    }

    fn require_form_associated(&self, node: NodeId) -> ElementResult<()> {
        match self.instance(node) {
            Some(instance) if instance.definition.form_associated() => Ok(()),
            _ => Err(ElementError::NotAnInstance(node)),
        }
    }

    /// Returns whether the owner changed.
    pub(crate) fn set_form_owner(&mut self, node: NodeId, form: Option<NodeId>) -> bool {
        match self.instances.get_mut(&node) {
            Some(instance) if instance.form_owner != form => {
                instance.form_owner = form;
                true
            }
            _ => false,
        }
    }

    // ---- disconnect signal ----

    /// Signal of the instance's current connected epoch. A node that is not
    /// an instance gets a signal that never aborts.
    pub fn disconnect_signal(&mut self, node: NodeId) -> DisconnectSignal {
        match self.instances.get_mut(&node) {
            Some(instance) => instance.disconnect.signal(),
            None => DisconnectSignal::default(),
        }
    }

    pub(crate) fn abort_disconnect_signal(&mut self, node: NodeId) {
        if let Some(instance) = self.instances.get_mut(&node) {
            instance.disconnect.abort();
        }
    }

    // ---- hydration ----

    pub fn hydrate(&mut self, host: NodeId) -> HydrationReport {
        let report = hydrate(self, host);
        self.drain();
        report
    }

    pub(crate) fn queue_hydration(&mut self, host: NodeId) {
        let hydrates = self
            .instances
            .get(&host)
            .is_some_and(|i| i.definition.parts().is_some());
        let reaction = Reaction::Hydrate(host);
        if hydrates && !self.reactions.contains(&reaction) {
            self.reactions.push_back(reaction);
        }
    }

    /// Settle deferred part handlers and hydrate the instances waiting on
    /// them. An instance that disconnected in the meantime is skipped, and
    /// handlers for an undeclared part key fail the settlement. Returns the
    /// number of instances hydrated.
    pub fn settle_handlers(
        &mut self,
        handlers: &DeferredHandlers,
        result: Result<PartHandlers, LoadError>,
    ) -> usize {
        let Some(waiters) = handlers.settle(result) else {
            warn!("Deferred part handlers settled twice; ignoring");
            return 0;
        };
        if let Some(err) = handlers.error() {
            error!(error = %err, waiting = waiters.len(), "Deferred part handlers failed");
            return 0;
        }

        let mut hydrated = 0;
        for (node, signal) in waiters {
            if signal.aborted() || !self.document.is_connected(node) {
                warn!(?node, "Instance disconnected before its data resolved; skipping");
                continue;
            }
            hydrate(self, node);
            hydrated += 1;
        }
        self.drain();
        hydrated
    }

    // ---- modules ----

    /// Ask the loader for `path` unless it was requested before.
    pub(crate) fn request_module(&mut self, path: &str) -> ElementResult<()> {
        if self.modules.contains_key(path) {
            debug!(path, "Module already requested");
            return Ok(());
        }
        let loader = self.loader.clone().ok_or(LoadError::NoLoader)?;
        self.modules.insert(path.to_string(), ModuleState::Requested);
        debug!(path, "Requesting module");
        loader.request(path);
        Ok(())
    }

    pub fn requested_modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Complete a module request. A loaded module is evaluated against this
    /// runtime; a failure is logged and never retried.
    pub fn settle_module(&mut self, path: &str, result: Result<ComponentModule, LoadError>) {
        match self.modules.get(path) {
            Some(ModuleState::Requested) => {}
            Some(_) => {
                warn!(path, "Module settled twice; ignoring");
                return;
            }
            None => {
                warn!(path, "Module was never requested; ignoring");
                return;
            }
        }
        let outcome = result
            .map_err(ElementError::from)
            .and_then(|module| module(self));
        let state = match outcome {
            Ok(()) => ModuleState::Loaded,
            Err(err) => {
                error!(path, error = %err, "Error loading module");
                ModuleState::Failed(match err {
                    ElementError::Load(load) => load,
                    other => LoadError::Module {
                        path: path.to_string(),
                        message: other.to_string(),
                    },
                })
            }
        };
        self.modules.insert(path.to_string(), state);
        self.drain();
    }

    pub fn module_error(&self, path: &str) -> Option<&LoadError> {
        match self.modules.get(path) {
            Some(ModuleState::Failed(err)) => Some(err),
            _ => None,
        }
    }

    // ---- registration ----

    /// Define a component and upgrade the connected elements that use its
    /// tag, in tree order.
    pub(crate) fn define(&mut self, definition: ComponentDefinition) -> ElementResult<()> {
        let definition = self.registry.define(definition)?;
        let tag = definition.tag().to_string();
        debug!(tag = %tag, "Defined");

        let root = self.document.root();
        for node in self.document.shadow_including_descendants(root) {
            if self.document.is_element_named(node, &tag) && self.try_upgrade(node) {
                self.reactions.push_back(Reaction::Connected(node));
            }
        }
        self.drain();
        Ok(())
    }

    /// Construct an instance for a defined element that has none, queueing
    /// `attributeChanged` for each observed attribute it already carries.
    fn try_upgrade(&mut self, node: NodeId) -> bool {
        if self.instances.contains_key(&node) {
            return false;
        }
        let Some(definition) = self
            .document
            .local_name(node)
            .and_then(|name| self.registry.get(name))
            .cloned()
        else {
            return false;
        };
        debug!(tag = %definition.tag(), ?node, "Upgrading");
        for attribute in self.document.attributes(node) {
            if definition.is_observed(&attribute.name) {
                self.reactions.push_back(Reaction::AttributeChanged(
                    node,
                    AttributeChange {
                        name: attribute.name.clone(),
                        old_value: None,
                        new_value: Some(attribute.value.clone()),
                    },
                ));
            }
        }
        self.instances.insert(node, ElementInstance::new(definition));
        true
    }

    // ---- reaction queue ----

    fn queue_connected(&mut self, node: NodeId) {
        for id in self.document.shadow_including_descendants(node) {
            if self.instances.contains_key(&id) || self.try_upgrade(id) {
                self.reactions.push_back(Reaction::Connected(id));
            }
        }
    }

    fn queue_disconnected(&mut self, node: NodeId) {
        for id in self.document.shadow_including_descendants(node) {
            if self.instances.contains_key(&id) {
                self.reactions.push_back(Reaction::Disconnected(id));
            }
        }
    }

    fn queue_attribute_changed(
        &mut self,
        node: NodeId,
        name: &str,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        let observed = self
            .instances
            .get(&node)
            .is_some_and(|i| i.definition.is_observed(name));
        if observed {
            self.reactions.push_back(Reaction::AttributeChanged(
                node,
                AttributeChange {
                    name: name.to_ascii_lowercase(),
                    old_value,
                    new_value,
                },
            ));
        }
    }

    /// Listened slots that `nodes` are currently assigned to.
    fn listened_slots(&self, nodes: &[NodeId]) -> Vec<NodeId> {
        let mut slots = Vec::new();
        for &node in nodes {
            if let Some(slot) = self.document.assigned_slot(node) {
                if self.slot_listeners.contains_key(&slot) && !slots.contains(&slot) {
                    slots.push(slot);
                }
            }
        }
        slots
    }

    fn slot_attribute_slots(&self, node: NodeId, name: &str) -> Vec<NodeId> {
        if name.eq_ignore_ascii_case("slot") {
            self.listened_slots(&[node])
        } else {
            Vec::new()
        }
    }

    fn queue_slot_attribute_change(&mut self, node: NodeId, name: &str, mut slots: Vec<NodeId>) {
        if !name.eq_ignore_ascii_case("slot") {
            return;
        }
        for slot in self.listened_slots(&[node]) {
            if slots.contains(&slot) {
                slots.retain(|s| *s != slot);
            } else {
                slots.push(slot);
            }
        }
        self.queue_slotchange(slots);
    }

    fn queue_slotchange(&mut self, slots: Vec<NodeId>) {
        for slot in slots {
            let reaction = Reaction::SlotChange(slot);
            if !self.reactions.contains(&reaction) {
                self.reactions.push_back(reaction);
            }
        }
    }

    pub(crate) fn drain(&mut self) {
        if self.draining.get() {
            return;
        }
        let _guard = DrainGuard::enter(&self.draining);
        while let Some(reaction) = self.reactions.pop_front() {
            dispatch(self, reaction);
        }
    }

    // ---- slotchange listeners ----

    pub(crate) fn add_slotchange_listener(
        &mut self,
        slot: NodeId,
        owner: NodeId,
        handler: SlotChangeHandler,
    ) {
        let listeners = self.slot_listeners.entry(slot).or_default();
        listeners.retain(|(o, _)| *o != owner);
        listeners.push((owner, handler));
    }

    pub(crate) fn remove_slotchange_listener(&mut self, slot: NodeId, owner: NodeId) {
        if let Some(listeners) = self.slot_listeners.get_mut(&slot) {
            listeners.retain(|(o, _)| *o != owner);
            if listeners.is_empty() {
                self.slot_listeners.remove(&slot);
            }
        }
    }

    pub(crate) fn slotchange_listeners(&self, slot: NodeId) -> Vec<(NodeId, SlotChangeHandler)> {
        self.slot_listeners.get(&slot).cloned().unwrap_or_default()
    }

    pub fn has_slotchange_listener(&self, slot: NodeId) -> bool {
        self.slot_listeners.contains_key(&slot)
    }
}
