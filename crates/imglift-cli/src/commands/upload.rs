use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use imglift_core::{
    CaseSensitivity, FsDocumentStore, ImgbbConfig, ImgbbHost, UploadPipeline, VaultIndex,
    VaultResolver,
};

use crate::config::CliConfig;

/// Execute the upload command over one or more notes.
pub async fn execute(
    config: CliConfig,
    notes: Vec<PathBuf>,
    dry_run: bool,
    max_concurrent: Option<usize>,
) -> Result<()> {
    if !dry_run && config.has_placeholder_key() {
        println!(
            "{} No API key configured; uploads will be rejected.",
            "Warning:".yellow().bold()
        );
        println!(
            "Set one with {} or the {} environment variable.",
            "ilf config set-key <KEY>".cyan(),
            "IMGLIFT_API_KEY".cyan()
        );
    }

    let vault_root = &config.vault.path;
    anyhow::ensure!(
        vault_root.is_dir(),
        "Vault root is not a directory: {}",
        vault_root.display()
    );

    let case = if config.vault.case_sensitive {
        CaseSensitivity::Sensitive
    } else {
        CaseSensitivity::Insensitive
    };
    let index = VaultIndex::scan(vault_root, case);
    debug!(files = index.len(), "vault index ready");

    let resolver = Arc::new(VaultResolver::new(index));
    let host = Arc::new(ImgbbHost::new(
        reqwest::Client::new(),
        ImgbbConfig {
            api_key: config.uploader.api_key.clone(),
            endpoint: config.uploader.endpoint.clone(),
            timeout: Duration::from_secs(config.uploader.timeout_secs),
        },
    ));
    let pipeline = UploadPipeline::new(resolver, host)
        .with_max_concurrent(max_concurrent.unwrap_or(config.uploader.max_concurrent_uploads));

    let mut total_uploaded = 0usize;
    let mut total_failed = 0usize;

    for note in &notes {
        anyhow::ensure!(note.is_file(), "Note does not exist: {}", note.display());
        let store = FsDocumentStore::new(note);

        if dry_run {
            let planned = pipeline
                .plan(&store)
                .await
                .with_context(|| format!("Failed to scan {}", note.display()))?;
            if planned.is_empty() {
                println!("{}: no images found", note.display());
            } else {
                println!("{}: would upload {} image(s)", note.display(), planned.len());
                for image in planned {
                    println!("  {} <- {}", image.name.cyan(), image.handle.path().display());
                }
            }
            continue;
        }

        let report = pipeline
            .run(&store)
            .await
            .with_context(|| format!("Failed to process {}", note.display()))?;

        if report.is_noop() {
            println!("{}: no images found", note.display());
            continue;
        }

        println!(
            "{}: found {} image(s), uploaded {}",
            note.display(),
            report.found,
            report.uploaded
        );
        for failure in &report.failures {
            println!(
                "  {} {} ({}): {}",
                "failed".red().bold(),
                failure.name,
                failure.source.dimmed(),
                failure.error
            );
        }
        total_uploaded += report.uploaded;
        total_failed += report.failures.len();
    }

    if !dry_run {
        let summary = format!("{total_uploaded} uploaded, {total_failed} failed");
        if total_failed == 0 {
            println!("{} {}", "Done:".green().bold(), summary);
        } else {
            println!("{} {}", "Done with failures:".yellow().bold(), summary);
        }
    }

    Ok(())
}
