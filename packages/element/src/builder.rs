//! Capability Builder.
//!
//! [`define`] starts an [`ElementBuilder`] over an empty
//! [`CapabilityDescriptor`]. Every step consumes the builder and returns a
//! new one with the capability added; [`ElementBuilder::class`] turns the
//! accumulated descriptor into a [`ComponentClass`].
//!
//! The tag name and part declaration are tracked in the builder's type, so
//! `register` only exists once a tag is attached and part handlers can only
//! be installed on a class that declares parts.

use crate::attributes::AttributeRecord;
use crate::error::{ConfigError, ElementResult};
use crate::hydration::{DeferredHandlers, HandlerSource, PartHandlers};
use crate::lifecycle::{FormCallbacks, LifecycleCallbacks};
use crate::parts::PartDeclaration;
use crate::registry::{validate_tag_name, Registration};
use crate::runtime::Runtime;
use shade_dom::ShadowRootMode;
use tracing::debug;

/// Plain record of what a component type can do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityDescriptor {
    pub attributes: AttributeRecord,
    /// Mode of the shadow root attached on first access.
    pub shadow: Option<ShadowRootMode>,
    pub form_associated: bool,
    /// Default accessibility attributes seeded into element internals.
    pub internals: Option<Vec<(String, String)>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoTag;

#[derive(Debug, Clone)]
pub struct Tagged(String);

#[derive(Debug, Clone, Copy, Default)]
pub struct NoParts;

#[derive(Debug, Clone)]
pub struct WithParts(PartDeclaration);

/// Type-level state of the part declaration.
pub trait PartsState {
    fn declaration(&self) -> Option<&PartDeclaration>;
    fn into_declaration(self) -> Option<PartDeclaration>;
}

impl PartsState for NoParts {
    fn declaration(&self) -> Option<&PartDeclaration> {
        None
    }

    fn into_declaration(self) -> Option<PartDeclaration> {
        None
    }
}

impl PartsState for WithParts {
    fn declaration(&self) -> Option<&PartDeclaration> {
        Some(&self.0)
    }

    fn into_declaration(self) -> Option<PartDeclaration> {
        Some(self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ElementBuilder<T = NoTag, P = NoParts> {
    descriptor: CapabilityDescriptor,
    tag: T,
    parts: P,
}

/// Start a builder chain with no capabilities.
pub fn define() -> ElementBuilder {
    ElementBuilder {
        descriptor: CapabilityDescriptor::default(),
        tag: NoTag,
        parts: NoParts,
    }
}

impl<T, P> ElementBuilder<T, P> {
    /// Attach an attribute record. Applying the step again merges records.
    pub fn attributes(mut self, record: AttributeRecord) -> Self {
        self.descriptor.attributes.merge(record);
        self
    }

    pub fn shadow(mut self, mode: ShadowRootMode) -> Self {
        self.descriptor.shadow = Some(mode);
        self
    }

    pub fn form_associated(mut self) -> Self {
        self.descriptor.form_associated = true;
        self
    }

    pub fn internals<I, K, V>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let seeded = self.descriptor.internals.get_or_insert_with(Vec::new);
        for (name, value) in defaults {
            let name = name.into();
            let value = value.into();
            match seeded.iter_mut().find(|(n, _)| *n == name) {
                Some(entry) => entry.1 = value,
                None => seeded.push((name, value)),
            }
        }
        self
    }

    pub fn tag(self, name: impl Into<String>) -> ElementBuilder<Tagged, P> {
        ElementBuilder {
            descriptor: self.descriptor,
            tag: Tagged(name.into()),
            parts: self.parts,
        }
    }

    pub fn parts(self, declaration: PartDeclaration) -> ElementBuilder<T, WithParts> {
        ElementBuilder {
            descriptor: self.descriptor,
            tag: self.tag,
            parts: WithParts(declaration),
        }
    }

    pub fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    pub fn class(self) -> ComponentClass<T, P> {
        ComponentClass {
            descriptor: self.descriptor,
            tag: self.tag,
            parts: self.parts,
            lifecycle: LifecycleCallbacks::default(),
            form: FormCallbacks::default(),
            handlers: HandlerSource::Missing,
        }
    }
}

/// A finished component type, ready for callback installation and
/// registration.
#[derive(Debug, Clone)]
pub struct ComponentClass<T = NoTag, P = NoParts> {
    descriptor: CapabilityDescriptor,
    tag: T,
    parts: P,
    lifecycle: LifecycleCallbacks,
    form: FormCallbacks,
    handlers: HandlerSource,
}

impl<T, P> ComponentClass<T, P> {
    /// Install lifecycle callbacks. Hooks set in `callbacks` replace the
    /// ones installed earlier; others are kept.
    pub fn lifecycle_callbacks(mut self, callbacks: LifecycleCallbacks) -> Self {
        self.lifecycle.install(callbacks);
        self
    }

    /// Install form callbacks and mark the type form-associated.
    pub fn form_callbacks(mut self, callbacks: FormCallbacks) -> Self {
        self.descriptor.form_associated = true;
        self.form.install(callbacks);
        self
    }

    pub fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    pub fn attributes(&self) -> &AttributeRecord {
        &self.descriptor.attributes
    }

    pub fn observed_attributes(&self) -> Vec<&str> {
        self.descriptor.attributes.observed_attributes()
    }
}

impl<T> ComponentClass<T, WithParts> {
    pub fn parts(&self) -> &PartDeclaration {
        &self.parts.0
    }

    pub fn part_callbacks(mut self, handlers: PartHandlers) -> Self {
        self.handlers = HandlerSource::Ready(handlers);
        self
    }

    /// Take part handlers from a handle settled later by the host.
    pub fn deferred_part_callbacks(mut self, handlers: DeferredHandlers) -> Self {
        self.handlers = HandlerSource::Deferred(handlers);
        self
    }
}

impl<P: PartsState> ComponentClass<Tagged, P> {
    pub fn tag(&self) -> &str {
        &self.tag.0
    }

    /// Define the tag unless it is already defined.
    pub fn register(self, runtime: &mut Runtime) -> ElementResult<Registration> {
        let ComponentClass {
            descriptor,
            tag: Tagged(tag),
            parts,
            lifecycle,
            form,
            handlers,
        } = self;
        let class = ComponentClass {
            descriptor,
            tag: NoTag,
            parts,
            lifecycle,
            form,
            handlers,
        };
        class.register_as(tag, runtime)
    }
}

impl<P: PartsState> ComponentClass<NoTag, P> {
    /// Define this type under `name` unless the name is already defined.
    pub fn register_as(
        self,
        name: impl Into<String>,
        runtime: &mut Runtime,
    ) -> ElementResult<Registration> {
        let tag = name.into();
        validate_tag_name(&tag)?;
        if runtime.registry().is_defined(&tag) {
            debug!(tag = %tag, "Already defined; registration skipped");
            return Ok(Registration::AlreadyDefined);
        }
        let parts = self.parts.into_declaration();
        match (&parts, &self.handlers) {
            (Some(declaration), HandlerSource::Ready(handlers)) => {
                if let Some(key) = handlers.undeclared_key(declaration) {
                    return Err(ConfigError::UnknownPartKey {
                        tag,
                        key: key.to_string(),
                    }
                    .into());
                }
            }
            (Some(declaration), HandlerSource::Deferred(deferred)) => {
                deferred.bind(&tag, declaration)
            }
            _ => {}
        }
        runtime.define(ComponentDefinition {
            tag,
            descriptor: self.descriptor,
            parts,
            lifecycle: self.lifecycle,
            form: self.form,
            handlers: self.handlers,
        })?;
        Ok(Registration::Defined)
    }
}

/// A registered component type, shared by all of its instances.
#[derive(Debug)]
pub struct ComponentDefinition {
    tag: String,
    descriptor: CapabilityDescriptor,
    parts: Option<PartDeclaration>,
    lifecycle: LifecycleCallbacks,
    form: FormCallbacks,
    handlers: HandlerSource,
}

impl ComponentDefinition {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &AttributeRecord {
        &self.descriptor.attributes
    }

    pub fn is_observed(&self, name: &str) -> bool {
        self.descriptor.attributes.is_observed(name)
    }

    pub fn shadow_mode(&self) -> Option<ShadowRootMode> {
        self.descriptor.shadow
    }

    pub fn form_associated(&self) -> bool {
        self.descriptor.form_associated
    }

    pub fn internals_defaults(&self) -> Option<&[(String, String)]> {
        self.descriptor.internals.as_deref()
    }

    pub fn parts(&self) -> Option<&PartDeclaration> {
        self.parts.as_ref()
    }

    pub fn lifecycle(&self) -> &LifecycleCallbacks {
        &self.lifecycle
    }

    pub fn form(&self) -> &FormCallbacks {
        &self.form
    }

    pub(crate) fn handler_source(&self) -> &HandlerSource {
        &self.handlers
    }
}
