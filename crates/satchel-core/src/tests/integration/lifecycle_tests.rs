#![cfg(test)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::bundle_system::{
    provider_fn, Application, Bundle, BundleSystemError, Installable, SharedBundleManager,
};
use crate::kernel::error::{Error, Result};
use crate::storage::config::ConfigData;

/// A service bundle recording its lifecycle calls into a shared journal
struct ServiceBundle {
    name: String,
    deps: Vec<String>,
    overrides: Vec<String>,
    booted: AtomicBool,
    installed: AtomicBool,
    journal: Arc<Mutex<Vec<String>>>,
}

impl ServiceBundle {
    fn new(name: &str, journal: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            deps: Vec::new(),
            overrides: Vec::new(),
            booted: AtomicBool::new(false),
            installed: AtomicBool::new(false),
            journal,
        }
    }

    fn note(&self, what: &str) {
        self.journal.lock().unwrap().push(format!("{} {}", what, self.identifier()));
    }
}

impl Bundle for ServiceBundle {
    fn bundle_type(&self) -> &str {
        "service"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> Vec<String> {
        self.deps.clone()
    }

    fn overrides(&self) -> Vec<String> {
        self.overrides.clone()
    }

    fn is_booted(&self) -> bool {
        self.booted.load(Ordering::SeqCst)
    }

    fn boot(&self) -> Result<()> {
        self.note("boot");
        self.booted.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        self.note("shutdown");
        Ok(())
    }

    fn as_installable(&self) -> Option<&dyn Installable> {
        Some(self as &dyn Installable)
    }
}

impl Installable for ServiceBundle {
    fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    fn install(&self) -> Result<()> {
        self.note("install");
        self.installed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn uninstall(&self) -> Result<()> {
        self.note("uninstall");
        self.installed.store(false, Ordering::SeqCst);
        Ok(())
    }
}

fn app(settings: serde_json::Value) -> Arc<Application> {
    Arc::new(Application::new(ConfigData::from_value(settings).unwrap()).unwrap())
}

#[tokio::test]
async fn test_service_logger_scenario() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let manager = SharedBundleManager::new();

    let provider_journal = journal.clone();
    let provider_calls = calls.clone();
    manager
        .provide_type(
            "service",
            provider_fn(move |_bundle_type: Option<&str>, name: &str| {
                provider_calls.fetch_add(1, Ordering::SeqCst);
                Some(Arc::new(ServiceBundle::new(name, provider_journal.clone())) as Arc<dyn Bundle>)
            }),
        )
        .await
        .unwrap();

    assert!(!manager.is_booted("service.logger").await);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert!(manager.boot("service.logger").await.unwrap());
    assert!(manager.is_booted("service.logger").await);
    assert!(manager.boot("service.logger").await.unwrap());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        *journal.lock().unwrap(),
        vec!["install service.logger", "boot service.logger", "boot service.logger"]
    );
}

#[tokio::test]
async fn test_application_stack_with_override() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let manager = SharedBundleManager::new();

    let provider_journal = journal.clone();
    manager
        .provide_multiple(
            &["service.mailer", "service.smtp"],
            provider_fn(move |_bundle_type: Option<&str>, name: &str| {
                let mut bundle = ServiceBundle::new(name, provider_journal.clone());
                if name == "smtp" {
                    bundle.overrides = vec!["service.mailer".to_string()];
                }
                Some(Arc::new(bundle) as Arc<dyn Bundle>)
            }),
        )
        .await
        .unwrap();

    let legacy = app(json!({ "name": "legacy", "dependencies": ["service.mailer"] }));
    let shop = app(json!({
        "name": "shop",
        "dependencies": ["service.smtp"],
        "overrides": ["app.legacy"],
    }));
    manager.set_bundle(legacy.clone()).await;
    manager.set_bundle(shop.clone()).await;

    assert!(manager.boot("app.legacy").await.unwrap());
    assert!(manager.is_booted("service.mailer").await);

    assert!(manager.boot("app.shop").await.unwrap());
    assert!(shop.is_booted());
    assert_eq!(manager.bundle_ids().await, vec!["app.shop", "service.smtp"]);
    assert!(!manager.exists("app.legacy").await);

    // The mailer's provider is still registered, so it can come back fresh
    assert!(manager.exists("service.mailer").await);
    let fresh = manager.get_bundle("service.mailer").await.unwrap().unwrap();
    assert!(!fresh.is_booted());

    assert_eq!(
        *journal.lock().unwrap(),
        vec![
            "install service.mailer",
            "boot service.mailer",
            "shutdown service.mailer",
            "install service.smtp",
            "boot service.smtp",
        ]
    );
}

#[tokio::test]
async fn test_missing_dependencies_reported_in_one_pass() {
    let manager = SharedBundleManager::new();
    manager
        .set_bundle(app(json!({
            "name": "shop",
            "dependencies": ["app.catalog", "library.payments", "library.tax"],
        })))
        .await;
    manager
        .set_bundle(app(json!({ "name": "catalog", "dependencies": ["library.search", "library.tax"] })))
        .await;

    let err = manager.boot("app.shop").await.unwrap_err();
    match &err {
        Error::BundleSystem(BundleSystemError::Dependency(failure)) => {
            assert_eq!(failure.bundle, "shop");
            assert_eq!(failure.missing(), ["library.search", "library.tax", "library.payments"]);
        }
        other => panic!("Expected dependency failure, got {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "Bundle system error: Could not boot bundle \"shop\" - failed to load dependencies: \
         \"library.search, library.tax, library.payments\""
    );
    assert!(!manager.is_booted("app.shop").await);
    assert!(!manager.is_booted("app.catalog").await);
}

#[tokio::test]
async fn test_shutdown_all_after_boot() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let manager = SharedBundleManager::new();

    let mut cache = ServiceBundle::new("cache", journal.clone());
    cache.deps = vec!["service.db".to_string()];
    manager.set_bundle(Arc::new(ServiceBundle::new("db", journal.clone()))).await;
    manager.set_bundle(Arc::new(cache)).await;

    manager.boot("service.cache").await.unwrap();
    journal.lock().unwrap().clear();

    manager.shutdown_all().await.unwrap();
    assert_eq!(
        *journal.lock().unwrap(),
        vec!["shutdown service.cache", "shutdown service.db"]
    );

    assert!(manager.uninstall("service.db").await.unwrap());
    assert!(!manager.uninstall("service.db").await.unwrap());
}
