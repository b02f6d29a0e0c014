//! Definition loader element (`<sh-def>`).
//!
//! `<sh-def names="x-card x-list" base="/components/" suffix=".js">` asks
//! the installed [`ModuleLoader`] for `base + name + suffix` for every
//! listed name that is neither defined nor requested already. The host
//! answers through [`Runtime::settle_module`].

use crate::attributes::{AttributeRecord, AttributeSpec};
use crate::builder::{define, ComponentClass, Tagged};
use crate::context::ElementContext;
use crate::error::{CallbackResult, ElementResult};
use crate::lifecycle::{AttributeChange, LifecycleCallbacks};
use crate::runtime::Runtime;

pub const DEFINITION_LOADER_TAG: &str = "sh-def";

const DEFAULT_BASE: &str = "/";
const DEFAULT_SUFFIX: &str = ".js";

/// A loaded component module. Evaluating it normally registers a tag.
pub type ComponentModule = Box<dyn FnOnce(&mut Runtime) -> ElementResult<()>>;

/// Host hook that starts fetching a component module.
pub trait ModuleLoader {
    fn request(&self, path: &str);
}

pub(crate) fn definition_loader_class() -> ElementResult<ComponentClass<Tagged>> {
    let attributes = AttributeRecord::new()
        .with("names", AttributeSpec::observed(Vec::<String>::new()))?
        .with("base", AttributeSpec::observed(Vec::<String>::new()))?
        .with("suffix", AttributeSpec::observed(Vec::<String>::new()))?;
    Ok(define()
        .attributes(attributes)
        .tag(DEFINITION_LOADER_TAG)
        .class()
        .lifecycle_callbacks(LifecycleCallbacks::new().attribute_changed(on_attribute_changed)))
}

fn on_attribute_changed(ctx: &mut ElementContext<'_>, change: &AttributeChange) -> CallbackResult {
    if change.name != "names" {
        return Ok(());
    }
    let Some(names) = change.new_value.as_deref() else {
        return Ok(());
    };
    let base = ctx.attr_value("base").filter(|b| !b.is_empty());
    let base = base.as_deref().unwrap_or(DEFAULT_BASE);
    let suffix = ctx.attr_value("suffix").filter(|s| !s.is_empty());
    let suffix = suffix.as_deref().unwrap_or(DEFAULT_SUFFIX);

    for name in names.split_ascii_whitespace() {
        if ctx.runtime().registry().is_defined(name) {
            continue;
        }
        let path = format!("{base}{name}{suffix}");
        ctx.runtime().request_module(&path)?;
    }
    Ok(())
}
