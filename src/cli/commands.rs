//! CLI command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;

use crate::http_server::{HttpServer, ServerConfig};
use crate::loader::Loader;
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::store::{LoadMode, LoadSummary, RecordStore, StoreConfig};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve {
            config,
            database,
            listen,
            port,
            writable,
            log_level,
        } => {
            let overrides = ServeOverrides {
                database,
                listen,
                port,
                writable,
                log_level,
            };
            serve(config.as_deref(), overrides)
        }
        Command::Init { database, reset } => init(&database, reset),
        Command::Load {
            database,
            initdb,
            update,
            classified,
            quiet,
            files,
        } => {
            let options = LoadOptions {
                initdb,
                mode: if update {
                    LoadMode::Replace
                } else {
                    LoadMode::InsertOnly
                },
                classified,
                quiet,
            };
            load(&database, &files, options)
        }
    }
}

/// Flags that take precedence over the configuration file
#[derive(Debug, Default)]
pub struct ServeOverrides {
    pub database: Option<PathBuf>,
    pub listen: Option<String>,
    pub port: Option<u16>,
    pub writable: bool,
    pub log_level: Option<String>,
}

/// Builds the effective server configuration
pub fn resolve_config(path: Option<&Path>, overrides: ServeOverrides) -> CliResult<ServerConfig> {
    let mut config = match path {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };

    if let Some(database) = overrides.database {
        config.database = database;
    }
    if let Some(listen) = overrides.listen {
        config.host = listen;
    }
    if let Some(port) = overrides.port {
        config.port = port;
    }
    if overrides.writable {
        config.writable = true;
    }
    if let Some(level) = overrides.log_level {
        config.log_level = level;
    }

    if config.port == 0 {
        return Err(CliError::config_error("port must be > 0"));
    }
    if config.read_pool_size == 0 {
        return Err(CliError::config_error("read_pool_size must be > 0"));
    }
    Ok(config)
}

/// Open the store and serve until interrupted
pub fn serve(config_path: Option<&Path>, overrides: ServeOverrides) -> CliResult<()> {
    let config = resolve_config(config_path, overrides)?;
    Logger::set_min_severity(config.severity()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("database", &config.database.display().to_string()),
            ("writable", if config.writable { "true" } else { "false" }),
        ],
    );

    let store = Arc::new(RecordStore::open(config.store_config())?);
    let server = HttpServer::with_config(config, store);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Create the schema, optionally dropping an existing table
pub fn init(database: &Path, reset: bool) -> CliResult<()> {
    let store = RecordStore::open(StoreConfig::file(database).with_read_pool_size(0))?;
    if reset {
        store.reset()?;
    }
    let count = store.count()?;
    store.close()?;

    write_response(json!({
        "database": database.display().to_string(),
        "records": count,
    }))
}

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub initdb: bool,
    pub mode: LoadMode,
    pub classified: bool,
    pub quiet: bool,
}

/// Load TLE text files, one transaction per file
pub fn load(database: &Path, files: &[PathBuf], options: LoadOptions) -> CliResult<()> {
    if options.quiet {
        Logger::set_min_severity(Severity::Error);
    }

    let store = RecordStore::open(StoreConfig::file(database).with_read_pool_size(0))?;
    if options.initdb {
        store.reset()?;
    }

    let loader = Loader::new(&store)
        .classified(options.classified)
        .mode(options.mode);

    let mut write_failure = None;
    let total = loader.load_files(files, |path, summary| {
        if options.quiet || write_failure.is_some() {
            return;
        }
        if let Err(err) = write_response(file_report(path, summary)) {
            write_failure = Some(err);
        }
    })?;
    if let Some(err) = write_failure {
        return Err(err);
    }

    let count = store.count()?;
    store.close()?;

    if !options.quiet {
        write_response(json!({
            "database": database.display().to_string(),
            "inserted": total.inserted,
            "rejected": total.rejected.len(),
            "records": count,
        }))?;
    }
    Ok(())
}

fn file_report(path: &Path, summary: &LoadSummary) -> serde_json::Value {
    json!({
        "file": path.display().to_string(),
        "inserted": summary.inserted,
        "rejected": summary.rejected,
    })
}
