//! Hydration Engine.
//!
//! A pass reads the host's dataset into a [`RoutingTable`], builds a fresh
//! [`PartIndex`] and runs the handler registered for each routing key once
//! per matched element. Keys run in routing order, elements in document
//! order. A failing handler is logged and the pass moves on.

use crate::context::ElementContext;
use crate::error::{CallbackResult, LoadError};
use crate::parts::{PartDeclaration, PartIndex, RoutingTable};
use crate::runtime::Runtime;
use crate::signal::DisconnectSignal;
use indexmap::IndexMap;
use shade_dom::NodeId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, error};

pub type PartHandler = Rc<dyn Fn(&mut ElementContext<'_>, NodeId) -> CallbackResult>;

/// Part key -> handler.
#[derive(Clone, Default)]
pub struct PartHandlers {
    entries: IndexMap<String, PartHandler>,
}

impl PartHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `key`, replacing any earlier one.
    pub fn on(
        mut self,
        key: impl Into<String>,
        handler: impl Fn(&mut ElementContext<'_>, NodeId) -> CallbackResult + 'static,
    ) -> Self {
        self.entries.insert(key.into(), Rc::new(handler));
        self
    }

    pub fn get(&self, key: &str) -> Option<&PartHandler> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// First key that `declaration` does not declare.
    pub fn undeclared_key<'a>(&'a self, declaration: &PartDeclaration) -> Option<&'a str> {
        self.keys().find(|key| !declaration.contains(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for PartHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

/// Outcome of one hydration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HydrationReport {
    /// Handler invocations, failed ones included.
    pub invoked: usize,
    pub failed: usize,
    /// The pass waits on handlers that have not settled yet.
    pub deferred: bool,
}

enum DeferredState {
    Pending(Vec<(NodeId, DisconnectSignal)>),
    Ready(PartHandlers),
    Failed(LoadError),
}

pub(crate) enum DeferredPoll {
    Pending,
    Ready(PartHandlers),
    Failed,
}

/// Part handlers that become available later, e.g. once component data has
/// been fetched. Settled through [`Runtime::settle_handlers`].
#[derive(Clone)]
pub struct DeferredHandlers {
    inner: Rc<RefCell<DeferredInner>>,
}

struct DeferredInner {
    state: DeferredState,
    /// Tag and part declaration of the component that installed the handle.
    owner: Option<(String, PartDeclaration)>,
}

impl DeferredHandlers {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(DeferredInner {
                state: DeferredState::Pending(Vec::new()),
                owner: None,
            })),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.inner.borrow().state, DeferredState::Pending(_))
    }

    pub fn waiting(&self) -> usize {
        match &self.inner.borrow().state {
            DeferredState::Pending(waiters) => waiters.len(),
            _ => 0,
        }
    }

    pub fn error(&self) -> Option<LoadError> {
        match &self.inner.borrow().state {
            DeferredState::Failed(err) => Some(err.clone()),
            _ => None,
        }
    }

    /// Record the component whose declaration settled handlers are
    /// checked against.
    pub(crate) fn bind(&self, tag: &str, declaration: &PartDeclaration) {
        self.inner.borrow_mut().owner = Some((tag.to_string(), declaration.clone()));
    }

    pub(crate) fn poll(&self) -> DeferredPoll {
        match &self.inner.borrow().state {
            DeferredState::Pending(_) => DeferredPoll::Pending,
            DeferredState::Ready(handlers) => DeferredPoll::Ready(handlers.clone()),
            DeferredState::Failed(_) => DeferredPoll::Failed,
        }
    }

    /// Queue `node` for hydration on settlement. Waiters from aborted
    /// epochs are dropped, and a node already waiting in the same epoch is
    /// queued once.
    pub(crate) fn wait(&self, node: NodeId, signal: DisconnectSignal) {
        if let DeferredState::Pending(waiters) = &mut self.inner.borrow_mut().state {
            waiters.retain(|(_, s)| !s.aborted());
            let queued = waiters
                .iter()
                .any(|(n, s)| *n == node && s.same_epoch(&signal));
            if !queued {
                waiters.push((node, signal));
            }
        }
    }

    /// Settle once. Handlers for a key the owning component does not
    /// declare settle as a failure. Returns the waiters, or `None` if
    /// already settled.
    pub(crate) fn settle(
        &self,
        result: Result<PartHandlers, LoadError>,
    ) -> Option<Vec<(NodeId, DisconnectSignal)>> {
        let mut inner = self.inner.borrow_mut();
        if !matches!(inner.state, DeferredState::Pending(_)) {
            return None;
        }
        let next = match result {
            Ok(handlers) => {
                let unknown = inner.owner.as_ref().and_then(|(tag, declaration)| {
                    handlers.undeclared_key(declaration).map(|key| LoadError::UnknownPartKey {
                        tag: tag.clone(),
                        key: key.to_string(),
                    })
                });
                match unknown {
                    Some(err) => DeferredState::Failed(err),
                    None => DeferredState::Ready(handlers),
                }
            }
            Err(err) => DeferredState::Failed(err),
        };
        match std::mem::replace(&mut inner.state, next) {
            DeferredState::Pending(waiters) => Some(waiters),
            _ => None,
        }
    }
}

impl Default for DeferredHandlers {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DeferredHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.inner.borrow().state {
            DeferredState::Pending(waiters) => format!("pending ({} waiting)", waiters.len()),
            DeferredState::Ready(handlers) => format!("ready {handlers:?}"),
            DeferredState::Failed(err) => format!("failed: {err}"),
        };
        f.debug_tuple("DeferredHandlers").field(&state).finish()
    }
}

/// Where a component type takes its part handlers from.
#[derive(Debug, Clone, Default)]
pub(crate) enum HandlerSource {
    #[default]
    Missing,
    Ready(PartHandlers),
    Deferred(DeferredHandlers),
}

/// Run one hydration pass over `host`. Never fails; handler errors are
/// logged and counted in the report.
pub fn hydrate(runtime: &mut Runtime, host: NodeId) -> HydrationReport {
    let mut report = HydrationReport::default();
    let Some(definition) = runtime.definition_of(host) else {
        debug!(?host, "Hydration skipped: not a custom element instance");
        return report;
    };
    let Some(declaration) = definition.parts() else {
        return report;
    };

    let handlers = match definition.handler_source() {
        HandlerSource::Missing => return report,
        HandlerSource::Ready(handlers) => handlers.clone(),
        HandlerSource::Deferred(deferred) => match deferred.poll() {
            DeferredPoll::Ready(handlers) => handlers,
            DeferredPoll::Failed => return report,
            DeferredPoll::Pending => {
                let signal = runtime.disconnect_signal(host);
                deferred.wait(host, signal);
                report.deferred = true;
                return report;
            }
        },
    };

    let tag = definition.tag();
    let routing = RoutingTable::from_dataset(&runtime.document().dataset(host));
    let index = PartIndex::build(runtime.document(), host, &routing, declaration);

    for entry in routing.entries() {
        if !declaration.contains(&entry.key) {
            debug!(tag = %tag, key = %entry.key, "Routing key is not a declared part");
            continue;
        }
        let Some(handler) = handlers.get(&entry.key).cloned() else {
            continue;
        };
        for &element in index.get(&entry.key) {
            report.invoked += 1;
            let result = handler(&mut ElementContext::new(runtime, host), element);
            if let Err(err) = result {
                report.failed += 1;
                let element_name = runtime.document().local_name(element).unwrap_or("#node");
                error!(
                    tag = %tag,
                    key = %entry.key,
                    method = %entry.key,
                    element = %element_name,
                    error = %err,
                    "Hydration error in part handler"
                );
            }
        }
    }

    debug!(tag = %tag, invoked = report.invoked, failed = report.failed, "Hydrated");
    report
}
