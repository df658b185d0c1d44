#![cfg(test)]

use std::fs;

use tempfile::tempdir;

use crate::bundle_system::Bundle;
use crate::kernel::bootstrap::{HostConfig, Kernel};

#[tokio::test]
async fn test_host_config_file_to_booted_tree() {
    let dir = tempdir().unwrap();
    let libs = dir.path().join("libs");
    fs::create_dir_all(libs.join("payments")).unwrap();
    fs::create_dir_all(libs.join("reports")).unwrap();
    fs::write(libs.join("payments").join("bootstrap.yml"), "gateway: sandbox\n").unwrap();
    fs::write(
        libs.join("reports").join("bundle.yaml"),
        "dependencies:\n  - library.payments\n",
    )
    .unwrap();

    let config_path = dir.path().join("satchel.yaml");
    fs::write(
        &config_path,
        "library_dirs:\n  - libs\nboot:\n  - app.shop\napps:\n  - name: shop\n    namespace: Shop\n    dependencies:\n      - library.reports\n",
    )
    .unwrap();

    let config = HostConfig::load(&config_path).unwrap();
    let kernel = Kernel::from_config(&config).await.unwrap();
    let outcomes = kernel.start().await.unwrap();
    assert!(outcomes.iter().all(|outcome| outcome.found));

    let manager = kernel.manager();
    assert_eq!(
        manager.bundle_ids().await,
        vec!["app.shop", "library.payments", "library.reports"]
    );
    for id in ["app.shop", "library.payments", "library.reports"] {
        assert!(manager.is_booted(id).await, "{} should be booted", id);
    }

    let shop = manager.get_bundle("app.shop").await.unwrap().unwrap();
    assert_eq!(shop.dependencies(), vec!["library.reports"]);

    let inner = manager.manager().lock().await;
    assert_eq!(inner.boot_order(), ["library.payments", "library.reports", "app.shop"]);
    drop(inner);

    kernel.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_kernel_clones_share_state() {
    let config = HostConfig {
        apps: vec![serde_json::json!({ "name": "shop" })],
        boot: vec!["app.shop".to_string()],
        ..HostConfig::default()
    };
    let kernel = Kernel::from_config(&config).await.unwrap();
    let clone = kernel.clone();

    clone.start().await.unwrap();
    assert!(kernel.manager().is_booted("app.shop").await);

    // Applications reject a second boot, which surfaces from start()
    assert!(kernel.start().await.is_err());
}
