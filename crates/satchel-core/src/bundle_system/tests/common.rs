#![cfg(test)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use crate::bundle_system::error::BundleSystemError;
use crate::bundle_system::provider::{provider_fn, BundleProvider};
use crate::bundle_system::traits::{Bundle, Installable};
use crate::kernel::error::Result;

pub type EventLog = Arc<StdMutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(StdMutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

// --- Mock Bundle ---
pub struct MockBundle {
    bundle_type: String,
    name: String,
    deps: Vec<String>,
    overrides: Vec<String>,
    booted: AtomicBool,
    boot_calls: AtomicUsize,
    shutdown_calls: AtomicUsize,
    installable: bool,
    installed: AtomicBool,
    install_calls: AtomicUsize,
    uninstall_calls: AtomicUsize,
    reject_second_boot: bool,
    fail_boot: bool,
    fail_shutdown: bool,
    fail_install: bool,
    events: Option<EventLog>,
}

impl MockBundle {
    pub fn new(bundle_type: &str, name: &str) -> Self {
        Self {
            bundle_type: bundle_type.to_string(),
            name: name.to_string(),
            deps: Vec::new(),
            overrides: Vec::new(),
            booted: AtomicBool::new(false),
            boot_calls: AtomicUsize::new(0),
            shutdown_calls: AtomicUsize::new(0),
            installable: false,
            installed: AtomicBool::new(false),
            install_calls: AtomicUsize::new(0),
            uninstall_calls: AtomicUsize::new(0),
            reject_second_boot: false,
            fail_boot: false,
            fail_shutdown: false,
            fail_install: false,
            events: None,
        }
    }

    pub fn with_dependencies(mut self, deps: &[&str]) -> Self {
        self.deps = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_overrides(mut self, overrides: &[&str]) -> Self {
        self.overrides = overrides.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn installable(mut self) -> Self {
        self.installable = true;
        self
    }

    /// Reject a second boot the way Application does
    pub fn strict(mut self) -> Self {
        self.reject_second_boot = true;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_boot = true;
        self
    }

    pub fn failing_shutdown(mut self) -> Self {
        self.fail_shutdown = true;
        self
    }

    pub fn failing_install(mut self) -> Self {
        self.fail_install = true;
        self
    }

    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    pub fn boot_calls(&self) -> usize {
        self.boot_calls.load(Ordering::SeqCst)
    }

    pub fn shutdown_calls(&self) -> usize {
        self.shutdown_calls.load(Ordering::SeqCst)
    }

    pub fn install_calls(&self) -> usize {
        self.install_calls.load(Ordering::SeqCst)
    }

    pub fn uninstall_calls(&self) -> usize {
        self.uninstall_calls.load(Ordering::SeqCst)
    }

    fn record(&self, event: &str) {
        if let Some(events) = &self.events {
            events.lock().unwrap().push(format!("{}:{}", event, self.identifier()));
        }
    }
}

impl Bundle for MockBundle {
    fn bundle_type(&self) -> &str {
        &self.bundle_type
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
        self.boot_calls.fetch_add(1, Ordering::SeqCst);
        self.record("boot");
        if self.fail_boot {
            return Err(BundleSystemError::BootFailed {
                identifier: self.identifier(),
                message: "mock failure".to_string(),
            }
            .into());
        }
        if self.reject_second_boot && self.is_booted() {
            return Err(BundleSystemError::AlreadyBooted {
                identifier: self.identifier(),
            }
            .into());
        }
        self.booted.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        self.record("shutdown");
        if self.fail_shutdown {
            return Err(BundleSystemError::ShutdownFailed {
                identifier: self.identifier(),
                message: "mock failure".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn as_installable(&self) -> Option<&dyn Installable> {
        if self.installable { Some(self as &dyn Installable) } else { None }
    }
}

impl Installable for MockBundle {
    fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    fn install(&self) -> Result<()> {
        self.install_calls.fetch_add(1, Ordering::SeqCst);
        self.record("install");
        if self.fail_install {
            return Err(BundleSystemError::InstallFailed {
                identifier: self.identifier(),
                message: "mock failure".to_string(),
            }
            .into());
        }
        self.installed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn uninstall(&self) -> Result<()> {
        self.uninstall_calls.fetch_add(1, Ordering::SeqCst);
        self.record("uninstall");
        self.installed.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Provider that hands out the given instance and counts its invocations.
pub fn instance_provider(bundle: Arc<MockBundle>, calls: Arc<AtomicUsize>) -> Arc<dyn BundleProvider> {
    provider_fn(move |_bundle_type: Option<&str>, _name: &str| {
        calls.fetch_add(1, Ordering::SeqCst);
        Some(bundle.clone() as Arc<dyn Bundle>)
    })
}

/// Provider building a fresh `MockBundle` of the requested type and name.
pub fn factory_provider(calls: Arc<AtomicUsize>) -> Arc<dyn BundleProvider> {
    provider_fn(move |bundle_type: Option<&str>, name: &str| {
        calls.fetch_add(1, Ordering::SeqCst);
        Some(Arc::new(MockBundle::new(bundle_type.unwrap_or("any"), name)) as Arc<dyn Bundle>)
    })
}
