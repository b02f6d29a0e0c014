//! Disconnect Signal: a cancellation token scoped to one connected
//! lifetime of an element instance.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type AbortListener = Box<dyn FnOnce()>;

#[derive(Default)]
struct SignalState {
    aborted: Cell<bool>,
    listeners: RefCell<Vec<AbortListener>>,
}

#[derive(Clone, Default)]
pub struct DisconnectSignal {
    state: Rc<SignalState>,
}

impl DisconnectSignal {
    pub fn aborted(&self) -> bool {
        self.state.aborted.get()
    }

    /// Run `listener` once when the signal aborts. On an already aborted
    /// signal the listener runs immediately.
    pub fn on_abort(&self, listener: impl FnOnce() + 'static) {
        if self.aborted() {
            listener();
        } else {
            self.state.listeners.borrow_mut().push(Box::new(listener));
        }
    }

    /// Whether both handles belong to the same connected epoch.
    pub fn same_epoch(&self, other: &DisconnectSignal) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    fn abort(&self) {
        if self.state.aborted.replace(true) {
            return;
        }
        let listeners = std::mem::take(&mut *self.state.listeners.borrow_mut());
        for listener in listeners {
            listener();
        }
    }
}

impl fmt::Debug for DisconnectSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisconnectSignal")
            .field("aborted", &self.aborted())
            .field("listeners", &self.state.listeners.borrow().len())
            .finish()
    }
}

/// Owns the signal of the current epoch. The signal is created on first
/// access and discarded on abort, so the next access starts a new epoch.
#[derive(Debug, Default)]
pub struct DisconnectController {
    current: Option<DisconnectSignal>,
}

impl DisconnectController {
    pub fn signal(&mut self) -> DisconnectSignal {
        self.current.get_or_insert_with(DisconnectSignal::default).clone()
    }

    pub fn abort(&mut self) {
        if let Some(signal) = self.current.take() {
            signal.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }
}
