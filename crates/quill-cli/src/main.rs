//! quill-images: upload images to, or delete them from, the configured image store.
//!
//! Reads the same environment as the server (`IMAGE_STORE_BACKEND`,
//! `CLOUDINARY_*` or `LOCAL_STORAGE_*`, upload limits), optionally from `.env`.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use quill_cli::{content_type_for_path, init_tracing};
use quill_core::Config;
use quill_storage::create_image_store;
use quill_upload::{ImageUploadService, IncomingFile};

#[derive(Parser)]
#[command(name = "quill-images", about = "Upload and delete images in the image store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload one or more image files; all of them are stored or none are
    Upload {
        /// Paths of the files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Delete images by public id
    Delete {
        /// Public ids as returned by `upload`
        #[arg(required = true)]
        public_ids: Vec<String>,
    },
}

async fn open_file(path: PathBuf) -> anyhow::Result<IncomingFile> {
    let file = tokio::fs::File::open(&path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let size = file
        .metadata()
        .await
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(IncomingFile::new(file_name, content_type_for_path(&path), file).with_size_hint(size))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    let store = create_image_store(&config)
        .await
        .context("Failed to create image store")?;
    tracing::debug!(backend = %store.backend_type(), "Image store ready");

    let service = ImageUploadService::new(store, config.upload());

    match cli.command {
        Commands::Upload { files } => {
            let mut incoming = Vec::with_capacity(files.len());
            for path in files {
                incoming.push(open_file(path).await?);
            }

            let descriptors = service.upload_batch(incoming).await?;
            println!("{}", serde_json::to_string_pretty(&descriptors)?);
        }
        Commands::Delete { public_ids } => {
            let total = public_ids.len();
            let deleted = service.delete_batch(public_ids).await;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "deleted": deleted, "total": total }))?
            );
            if !deleted {
                anyhow::bail!("Not every image could be deleted");
            }
        }
    }

    Ok(())
}
