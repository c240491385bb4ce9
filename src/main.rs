use bcms_settings::config::Config;
use bcms_settings::db::{self, DbOptions};
use bcms_settings::providers::CompositeModules;
use bcms_settings::registry::Registry;
use bcms_settings::utils::logging::init_tracing;
use mimalloc::MiMalloc;
use tracing::{info, warn};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;
    init_tracing(&cfg.basic.loglevel);

    info!(
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        init_schema = cfg.basic.init_schema,
        module_prefix = %cfg.modules.prefix,
        manifest = %cfg.modules.manifest.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<none>".to_string()),
        synchronize_on_start = cfg.modules.synchronize_on_start
    );

    let mut options = DbOptions::new(cfg.basic.database_url.clone());
    if !cfg.basic.init_schema {
        options = options.without_schema();
    }
    let store = db::spawn_with(options).await?;
    let registry = Registry::new(store, CompositeModules::from_config(&cfg.modules));

    if cfg.modules.synchronize_on_start {
        let report = registry.synchronize().await?;
        if report.is_noop() {
            info!("registered modules already match installed modules");
        }
    }

    let modules = match registry.modules().await {
        Ok(modules) => modules,
        Err(e) => {
            warn!(error = %e, code = e.code(), "could not list registered modules");
            return Ok(());
        }
    };
    info!(count = modules.len(), "registered modules");
    for name in modules {
        let accessor = registry.module(&name).await?;
        info!("{}", accessor.inspect().await?);
    }
    Ok(())
}
