/// Tests for the `<sh-def>` definition loader element
use crate::builder::define;
use crate::error::{ElementResult, LoadError};
use crate::lifecycle::LifecycleCallbacks;
use crate::loader::{ComponentModule, ModuleLoader, DEFINITION_LOADER_TAG};
use crate::runtime::Runtime;
use shade_dom::NodeId;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Default)]
struct RecordingLoader {
    requests: Rc<RefCell<Vec<String>>>,
}

impl ModuleLoader for RecordingLoader {
    fn request(&self, path: &str) {
        self.requests.borrow_mut().push(path.to_string());
    }
}

fn runtime_with_loader() -> (Runtime, RecordingLoader, NodeId) {
    let mut rt = Runtime::new();
    let loader = RecordingLoader::default();
    rt.set_module_loader(loader.clone());
    rt.bootstrap().unwrap();
    let body = rt.create_element("body");
    let root = rt.document().root();
    rt.append_child(root, body).unwrap();
    (rt, loader, body)
}

fn card_module(connected: Rc<RefCell<usize>>) -> ComponentModule {
    Box::new(move |rt: &mut Runtime| -> ElementResult<()> {
        define()
            .tag("x-card")
            .class()
            .lifecycle_callbacks(LifecycleCallbacks::new().connected(move |_| {
                *connected.borrow_mut() += 1;
                Ok(())
            }))
            .register(rt)?;
        Ok(())
    })
}

#[test]
fn test_requests_default_paths() {
    let (mut rt, loader, body) = runtime_with_loader();
    let def = rt.create_element(DEFINITION_LOADER_TAG);
    rt.append_child(body, def).unwrap();
    rt.set_attribute(def, "names", "x-card  x-list").unwrap();

    assert_eq!(*loader.requests.borrow(), vec!["/x-card.js", "/x-list.js"]);
}

#[test]
fn test_base_and_suffix_are_applied() {
    let (mut rt, loader, _) = runtime_with_loader();
    let def = rt.create_element(DEFINITION_LOADER_TAG);
    rt.set_attribute(def, "base", "/components/").unwrap();
    rt.set_attribute(def, "suffix", ".mjs").unwrap();
    assert!(loader.requests.borrow().is_empty());

    rt.set_attribute(def, "names", "x-card").unwrap();
    assert_eq!(*loader.requests.borrow(), vec!["/components/x-card.mjs"]);
}

#[test]
fn test_defined_and_requested_names_are_skipped() {
    let (mut rt, loader, _) = runtime_with_loader();
    define().tag("x-list").class().register(&mut rt).unwrap();

    let def = rt.create_element(DEFINITION_LOADER_TAG);
    rt.set_attribute(def, "names", "x-card x-list").unwrap();
    rt.set_attribute(def, "names", "x-card").unwrap();

    let other = rt.create_element(DEFINITION_LOADER_TAG);
    rt.set_attribute(other, "names", "x-card").unwrap();

    assert_eq!(*loader.requests.borrow(), vec!["/x-card.js"]);
}

#[test]
fn test_loaded_module_defines_and_upgrades() {
    let (mut rt, _, body) = runtime_with_loader();
    let card = rt.create_element("x-card");
    rt.append_child(body, card).unwrap();
    let def = rt.create_element(DEFINITION_LOADER_TAG);
    rt.set_attribute(def, "names", "x-card").unwrap();

    let connected = Rc::new(RefCell::new(0));
    rt.settle_module("/x-card.js", Ok(card_module(connected.clone())));

    assert!(rt.registry().is_defined("x-card"));
    assert!(rt.instance(card).is_some());
    assert_eq!(*connected.borrow(), 1);
    assert!(rt.module_error("/x-card.js").is_none());
}

#[test]
fn test_module_evaluated_twice_registers_once() {
    let (mut rt, _, _) = runtime_with_loader();
    let connected = Rc::new(RefCell::new(0));
    card_module(connected.clone())(&mut rt).unwrap();

    let def = rt.create_element(DEFINITION_LOADER_TAG);
    rt.set_attribute(def, "names", "x-card x-other").unwrap();
    rt.settle_module("/x-other.js", Ok(card_module(connected)));

    assert!(rt.module_error("/x-other.js").is_none());
    assert_eq!(rt.registry().names().filter(|n| *n == "x-card").count(), 1);
}

#[test]
fn test_failed_module_is_not_retried() {
    let (mut rt, loader, _) = runtime_with_loader();
    let def = rt.create_element(DEFINITION_LOADER_TAG);
    rt.set_attribute(def, "names", "x-card").unwrap();

    let err = LoadError::Module {
        path: "/x-card.js".to_string(),
        message: "404".to_string(),
    };
    rt.settle_module("/x-card.js", Err(err.clone()));
    assert_eq!(rt.module_error("/x-card.js"), Some(&err));
    assert!(!rt.registry().is_defined("x-card"));

    rt.set_attribute(def, "names", "x-card").unwrap();
    assert_eq!(loader.requests.borrow().len(), 1);

    // A late success for the failed path is ignored.
    rt.settle_module("/x-card.js", Ok(card_module(Rc::default())));
    assert!(!rt.registry().is_defined("x-card"));
}

#[test]
fn test_unrequested_settlement_is_ignored() {
    let (mut rt, _, _) = runtime_with_loader();
    rt.settle_module("/x-card.js", Ok(card_module(Rc::default())));
    assert!(!rt.registry().is_defined("x-card"));
}

#[test]
fn test_missing_loader_is_logged_not_raised() {
    let mut rt = Runtime::new();
    rt.bootstrap().unwrap();
    let def = rt.create_element(DEFINITION_LOADER_TAG);
    assert!(rt.set_attribute(def, "names", "x-card").is_ok());
    assert_eq!(rt.requested_modules().count(), 0);
}
