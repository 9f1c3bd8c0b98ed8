//! CLI Tooling
//!
//! Command-line surface over the explorer: listing, folder tree, upload,
//! download, delete, move, copy, reload. Commands return their output as a
//! string; the binary prints it.

use crate::auth::CredentialStore;
use crate::config::ExplorerConfig;
use crate::error::ExplorerError;
use crate::explorer::Explorer;
use crate::index::path;
use crate::output::{format_directory_listing_text, format_folder_tree_text, format_file_size};
use crate::remote::HttpObjectStore;
use crate::types::FileUpload;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Keytree CLI - file explorer for flat-key object stores
#[derive(Parser)]
#[command(name = "keytree")]
#[command(about = "Browse and manage a remote object store as a file system")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List a directory
    Ls {
        /// Directory path
        #[arg(default_value = "/")]
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the folder tree
    Tree {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Upload local files into a directory
    Upload {
        /// Local files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Target directory in the store
        #[arg(long, default_value = "/")]
        dest: String,
    },
    /// Download an object
    Download {
        /// Object path in the store
        path: String,
        /// Output file (defaults to the object's base name)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete an object
    Rm {
        /// Object path in the store
        path: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Move an object into another directory
    Mv {
        /// Object path in the store
        path: String,
        /// Destination directory
        dest: String,
    },
    /// Copy an object into another directory
    Cp {
        /// Object path in the store
        path: String,
        /// Destination directory
        dest: String,
    },
    /// Discard the cached index and rebuild it from the store
    Reload,
}

/// Holds the explorer instance commands execute against.
pub struct CliContext {
    explorer: Explorer,
}

impl CliContext {
    pub fn new(config: &ExplorerConfig) -> Result<Self, ExplorerError> {
        let credentials = Arc::new(match &config.token {
            Some(token) => CredentialStore::with_token(token.clone()),
            None => CredentialStore::new(),
        });
        let store = HttpObjectStore::new(
            &config.endpoint,
            credentials,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let explorer =
            Explorer::new(Arc::new(store)).with_relist_after_mutation(config.relist_after_mutation);
        Ok(Self { explorer })
    }

    pub async fn execute(&self, command: &Commands) -> Result<String, ExplorerError> {
        match command {
            Commands::Ls { path, format } => self.handle_ls(path, format).await,
            Commands::Tree { format } => self.handle_tree(format).await,
            Commands::Upload { files, dest } => self.handle_upload(files, dest).await,
            Commands::Download { path, out } => self.handle_download(path, out.as_deref()).await,
            Commands::Rm { path, force } => self.handle_rm(path, *force).await,
            Commands::Mv { path, dest } => self.handle_mv(path, dest).await,
            Commands::Cp { path, dest } => self.handle_cp(path, dest).await,
            Commands::Reload => self.handle_reload().await,
        }
    }

    async fn handle_ls(&self, dir_path: &str, format: &str) -> Result<String, ExplorerError> {
        let contents = self.explorer.list_directory(dir_path).await?;
        match format {
            "json" => to_json(&contents),
            "text" => Ok(format_directory_listing_text(dir_path, &contents)),
            other => Err(unknown_format(other)),
        }
    }

    async fn handle_tree(&self, format: &str) -> Result<String, ExplorerError> {
        // folder_structure is cache-only; navigate once so the index exists.
        self.explorer.list_directory("/").await?;
        let tree = self.explorer.folder_structure();
        match format {
            "json" => to_json(&tree),
            "text" => Ok(format_folder_tree_text(&tree)),
            other => Err(unknown_format(other)),
        }
    }

    async fn handle_upload(&self, files: &[PathBuf], dest: &str) -> Result<String, ExplorerError> {
        let mut uploads = Vec::with_capacity(files.len());
        for file in files {
            uploads.push(read_upload(file)?);
        }
        let uploaded = self.explorer.upload_files(uploads, dest).await?;

        let mut out = format!(
            "Uploaded {} file(s) to {}\n",
            uploaded.len(),
            path::to_absolute(&path::normalize(dest))
        );
        for entry in &uploaded {
            out.push_str(&format!(
                "  {} ({}, tag {})\n",
                entry.path,
                format_file_size(entry.size),
                entry.entity_tag
            ));
        }
        Ok(out)
    }

    async fn handle_download(
        &self,
        obj_path: &str,
        out: Option<&Path>,
    ) -> Result<String, ExplorerError> {
        let entry = self.explorer.resolve_entry(obj_path).await?;
        let bytes = self.explorer.download_entry(&entry).await?;

        let target = match out {
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(path::basename(&entry.path).unwrap_or("download")),
        };
        std::fs::write(&target, &bytes).map_err(|e| {
            ExplorerError::Config(format!("failed to write {}: {}", target.display(), e))
        })?;
        Ok(format!(
            "Downloaded {} ({}) to {}",
            entry.path,
            format_file_size(bytes.len() as u64),
            target.display()
        ))
    }

    async fn handle_rm(&self, obj_path: &str, force: bool) -> Result<String, ExplorerError> {
        let entry = self.explorer.resolve_entry(obj_path).await?;

        if !force {
            use dialoguer::Confirm;
            let confirmed = Confirm::new()
                .with_prompt(format!("Delete '{}' from the store?", entry.path))
                .interact()
                .map_err(|e| ExplorerError::Config(format!("Failed to get user input: {}", e)))?;
            if !confirmed {
                return Ok("Deletion cancelled".to_string());
            }
        }

        self.explorer.delete_entry(&entry).await?;
        Ok(format!("Deleted {}", entry.path))
    }

    async fn handle_mv(&self, obj_path: &str, dest: &str) -> Result<String, ExplorerError> {
        let entry = self.explorer.resolve_entry(obj_path).await?;
        let moved = self.explorer.move_entry(&entry, dest).await?;
        Ok(format!("Moved {} to {}", entry.path, moved.path))
    }

    async fn handle_cp(&self, obj_path: &str, dest: &str) -> Result<String, ExplorerError> {
        let entry = self.explorer.resolve_entry(obj_path).await?;
        let copied = self.explorer.copy_entry(&entry, dest).await?;
        Ok(format!("Copied {} to {}", entry.path, copied.path))
    }

    async fn handle_reload(&self) -> Result<String, ExplorerError> {
        self.explorer.reload().await?;
        Ok(format!(
            "Reloaded index: {} objects",
            self.explorer.object_count()
        ))
    }
}

fn read_upload(file: &Path) -> Result<FileUpload, ExplorerError> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            ExplorerError::Config(format!("invalid file name: {}", file.display()))
        })?
        .to_string();
    let bytes = std::fs::read(file)
        .map_err(|e| ExplorerError::Config(format!("failed to read {}: {}", file.display(), e)))?;
    let content_type = mime_guess::from_path(file)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(FileUpload {
        name,
        bytes,
        content_type,
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ExplorerError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ExplorerError::Config(format!("failed to serialize output: {}", e)))
}

fn unknown_format(format: &str) -> ExplorerError {
    ExplorerError::Config(format!(
        "unknown output format '{}' (expected text or json)",
        format
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_upload_guesses_content_type() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("report.pdf");
        std::fs::write(&file, b"%PDF-").unwrap();

        let upload = read_upload(&file).unwrap();
        assert_eq!(upload.name, "report.pdf");
        assert_eq!(upload.content_type, "application/pdf");
        assert_eq!(upload.bytes, b"%PDF-");
    }

    #[test]
    fn test_read_upload_missing_file_fails() {
        assert!(read_upload(Path::new("/no/such/file.bin")).is_err());
    }
}
