use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info, warn};

use uptree::tree::{scan_dir, scan_files};
use uptree::{Config, Dashboard, LocalBackend, Node};

#[tokio::main]
async fn main() -> ExitCode {
    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("usage: uptree <directory> | <file>...");
        return ExitCode::from(2);
    }

    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = uptree::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        uptree::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    let backend = match LocalBackend::from_config(&config.files) {
        Ok(backend) => backend,
        Err(e) => {
            error!("Failed to open storage: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut dashboard = Dashboard::from_config(backend, &config);

    match dashboard.load().await {
        Ok(count) => info!("Loaded {count} existing resource(s)"),
        Err(e) => warn!("Continuing without existing resources: {e}"),
    }

    let folder_upload = paths.len() == 1 && paths[0].is_dir();
    let scanned = tokio::task::spawn_blocking(move || {
        if folder_upload {
            scan_dir(&paths[0])
        } else {
            scan_files(&paths)
        }
    })
    .await;
    let entries = match scanned {
        Ok(Ok(entries)) => entries,
        Ok(Err(e)) => {
            error!("Nothing to upload: {e}");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            error!("Selection scan aborted: {e}");
            return ExitCode::FAILURE;
        }
    };

    let staged = if folder_upload {
        dashboard.select_folder(&entries)
    } else {
        dashboard.select_files(&entries)
    };
    let summary = match staged {
        Ok(summary) => summary,
        Err(e) => {
            error!("Nothing to upload: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "{} ({} file(s), {} bytes)",
        summary.message, summary.file_count, summary.total_size
    );

    if let Err(e) = dashboard.submit().await {
        error!("Upload failed: {e}");
        return ExitCode::FAILURE;
    }

    info!("{}:", dashboard.navigation().root_label());
    for node in dashboard.displayed() {
        match node {
            Node::File(file) => info!("  {} ({} bytes)", file.name, file.file_size),
            Node::Folder(folder) => info!(
                "  {}/ ({} items, {} bytes)",
                folder.name,
                folder.children.len(),
                folder.total_size
            ),
        }
    }

    dashboard.teardown();
    ExitCode::SUCCESS
}
