//! Element internals: accessibility defaults, custom states and form value.

use std::collections::BTreeSet;

/// Submission value of a form-associated element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    Entries(Vec<(String, String)>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreReason {
    Restore,
    Autocomplete,
}

impl RestoreReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RestoreReason::Restore => "restore",
            RestoreReason::Autocomplete => "autocomplete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementInternals {
    aria: Vec<(String, String)>,
    states: BTreeSet<String>,
    form_value: Option<FormValue>,
}

impl ElementInternals {
    /// Internals seeded with the component's default accessibility
    /// attributes (`role`, `aria-*`).
    pub fn seeded(defaults: &[(String, String)]) -> Self {
        let mut internals = Self::default();
        for (name, value) in defaults {
            internals.set_aria(name, Some(value.clone()));
        }
        internals
    }

    pub fn role(&self) -> Option<&str> {
        self.aria("role")
    }

    pub fn aria(&self, name: &str) -> Option<&str> {
        self.aria
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_aria(&mut self, name: &str, value: Option<String>) {
        let index = self.aria.iter().position(|(n, _)| n == name);
        match (index, value) {
            (Some(i), Some(value)) => self.aria[i].1 = value,
            (Some(i), None) => {
                self.aria.remove(i);
            }
            (None, Some(value)) => self.aria.push((name.to_string(), value)),
            (None, None) => {}
        }
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.states.contains(state)
    }

    pub fn add_state(&mut self, state: impl Into<String>) {
        self.states.insert(state.into());
    }

    pub fn remove_state(&mut self, state: &str) {
        self.states.remove(state);
    }

    pub fn form_value(&self) -> Option<&FormValue> {
        self.form_value.as_ref()
    }

    pub fn set_form_value(&mut self, value: Option<FormValue>) {
        self.form_value = value;
    }
}
