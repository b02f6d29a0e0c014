//! # Shade Element
//!
//! Declarative composition of custom elements over the [`shade_dom`] host.
//!
//! ## Purpose
//!
//! A component type is assembled from independent capability steps
//! (attribute schema, shadow root, form association, element internals,
//! tag registration) with [`define`], then materialized with
//! [`ElementBuilder::class`]. Lifecycle and form callbacks are installed as
//! tables on the resulting [`ComponentClass`] and dispatched by the
//! [`Runtime`], which owns the document and the custom element registry.
//!
//! ## Parts
//!
//! Light-DOM descendants carry a `part-of` attribute listing logical part
//! names. On each hydration pass the instance's `data-*` attributes route
//! part names to handler keys, matching elements are filtered by the
//! expected tags declared for the key, and each handler runs once per
//! matched element. A failing handler is logged and never stops the pass.
//!
//! ## Reprojection
//!
//! `<parts-root>` moves its children into the nearest ancestor's shadow
//! tree on connection and on every `slotchange`. Part discovery does not
//! look beneath a `<parts-root>` that has not relocated its children yet.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shade_element::{define, LifecycleCallbacks, PartDeclaration, PartHandlers, Runtime};
//!
//! let mut runtime = Runtime::new();
//! runtime.bootstrap()?;
//!
//! define()
//!     .parts(PartDeclaration::new().part("titleEl", ["h1"])?)
//!     .tag("my-root")
//!     .class()
//!     .part_callbacks(PartHandlers::new().on("titleEl", |ctx, el| {
//!         let title = ctx.attr_or("title-text", "Default Title");
//!         ctx.set_text_content(el, &title)?;
//!         Ok(())
//!     }))
//!     .register(&mut runtime)?;
//! ```

pub mod attributes;
pub mod builder;
pub mod context;
pub mod error;
pub mod hydration;
pub mod internals;
pub mod lifecycle;
pub mod loader;
pub mod parts;
pub mod registry;
pub mod reprojection;
pub mod runtime;
pub mod schema;
pub mod signal;

#[cfg(test)]
mod tests_hydration;


#[cfg(test)]
mod tests_reprojection;

#[cfg(test)]
mod tests_loader;

pub use attributes::{attribute_record, AttributeRecord, AttributeSpec};
pub use builder::{
    define, CapabilityDescriptor, ComponentClass, ComponentDefinition, ElementBuilder, NoParts,
    NoTag, Tagged, WithParts,
};
pub use context::ElementContext;
pub use error::{CallbackResult, ConfigError, ElementError, ElementResult, LoadError};
pub use hydration::{hydrate, DeferredHandlers, HydrationReport, PartHandlers};
pub use internals::{ElementInternals, FormValue, RestoreReason};
pub use lifecycle::{AttributeChange, FormCallbacks, LifecycleCallbacks};
pub use loader::{ComponentModule, ModuleLoader, DEFINITION_LOADER_TAG};
pub use parts::{
    kebab_to_camel, parts_record, PartDeclaration, PartIndex, RoutingTable, PART_ATTRIBUTE,
};
pub use registry::{CustomElementRegistry, Registration};
pub use reprojection::{connect_root, ReprojectionState, PARTS_ROOT_TAG};
pub use runtime::{ElementInstance, Runtime};
pub use schema::{AttributeConfig, AttributeDefinition, DeclaredMap, ElementDefinition, PartDataAttribute};
pub use signal::{DisconnectController, DisconnectSignal};

pub use shade_dom::{Document, NodeId, ShadowRootMode};
