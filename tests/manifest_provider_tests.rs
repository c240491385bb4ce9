use bcms_settings::Registry;
use bcms_settings::config::ModulesConfig;
use bcms_settings::providers::{CompositeModules, InstalledModules, ManifestModules};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(tag: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "bcms-settings-{tag}-{}-{nanos}.{ext}",
        std::process::id()
    ));
    path
}

const MANIFEST: &str = r#"
[package]
name = "my-site"

[dependencies]
browsercms = "3.1"
bcms_settings = "0.4"
bcms_s3 = "1.0"
bcms-seo-sitemap = { version = "0.2", features = ["gzip"] }
serde = "1"

[dev-dependencies]
bcms_test_helpers = "0.1"
"#;

#[tokio::test]
async fn manifest_lists_prefixed_dependencies_except_the_settings_module() {
    let manifest = temp_path("manifest", "toml");
    tokio::fs::write(&manifest, MANIFEST).await.unwrap();

    let provider = ManifestModules::new(
        manifest.clone(),
        "bcms_".to_string(),
        vec!["bcms_settings".to_string()],
    );
    assert_eq!(
        provider.installed_modules().unwrap(),
        vec!["bcms_s3", "bcms_seo_sitemap"]
    );

    let _ = tokio::fs::remove_file(&manifest).await;
}

#[tokio::test]
async fn synchronize_from_config_merges_manifest_and_installed_list() {
    let manifest = temp_path("manifest-sync", "toml");
    tokio::fs::write(&manifest, MANIFEST).await.unwrap();
    let db_path = temp_path("manifest-sync", "sqlite");
    let database_url = format!("sqlite:{}", db_path.display());

    let cfg = ModulesConfig {
        installed: vec!["bcms_blog".to_string(), "bcms_s3".to_string()],
        manifest: Some(manifest.clone()),
        ..ModulesConfig::default()
    };
    let registry = Registry::new(
        bcms_settings::db::spawn(&database_url).await.unwrap(),
        CompositeModules::from_config(&cfg),
    );

    let report = registry.synchronize().await.unwrap();
    assert_eq!(report.added, vec!["bcms_blog", "bcms_s3", "bcms_seo_sitemap"]);
    assert_eq!(
        registry.managed_modules().await.unwrap(),
        vec!["bcms_blog", "bcms_s3", "bcms_seo_sitemap"]
    );

    // Dropping a dependency from the manifest removes its managed row.
    tokio::fs::write(&manifest, MANIFEST.replace("bcms_s3 = \"1.0\"\n", ""))
        .await
        .unwrap();
    let cfg = ModulesConfig {
        installed: vec!["bcms_blog".to_string()],
        ..cfg
    };
    let registry = Registry::new(registry.store().clone(), CompositeModules::from_config(&cfg));
    let report = registry.synchronize().await.unwrap();
    assert_eq!(report.removed, vec!["bcms_s3"]);

    let _ = tokio::fs::remove_file(&manifest).await;
    let _ = tokio::fs::remove_file(&db_path).await;
}
