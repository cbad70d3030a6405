use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::app_config::LogLevel;
use crate::domain::entities::ProductDraft;

#[derive(Debug, Parser)]
#[command(
    name = "qskipper-media",
    version,
    about = "Image cache and product upload tool for the QSkipper admin API",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Root URL of the admin API.
    #[arg(long, value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Disk cache directory.
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Maximum decoded images kept in memory.
    #[arg(long)]
    pub memory_capacity: Option<usize>,

    /// Bearer token for the admin API.
    #[arg(long, env = "QSKIPPER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch images through the cache and report where each came from.
    Fetch {
        /// Image URLs.
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Compress an image file for upload.
    Compress {
        /// Source image.
        input: PathBuf,
        /// Destination JPEG.
        output: PathBuf,
        /// Byte budget, overriding the configured one.
        #[arg(long)]
        target_bytes: Option<usize>,
        /// Longest side in pixels, overriding the configured one.
        #[arg(long)]
        max_dimension: Option<u32>,
    },
    /// Drop one cached image by key (usually its URL).
    Invalidate {
        /// Cache key.
        key: String,
    },
    /// Drop every cached image.
    Clear,
    /// Create a product.
    CreateProduct(ProductArgs),
    /// Update a product and refresh its cached photo.
    UpdateProduct {
        /// Product identifier.
        id: String,
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Delete a product and drop its cached photo.
    DeleteProduct {
        /// Product identifier.
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct ProductArgs {
    /// Product name.
    #[arg(long)]
    pub name: String,

    /// Owning restaurant.
    #[arg(long)]
    pub restaurant_id: String,

    /// Food category.
    #[arg(long)]
    pub category: String,

    /// Price.
    #[arg(long)]
    pub price: u64,

    /// Extra preparation time in minutes.
    #[arg(long, default_value_t = 0)]
    pub extra_time: u32,

    /// Description.
    #[arg(long, default_value = "")]
    pub description: String,

    /// Mark as featured (sent on update only).
    #[arg(long)]
    pub featured: bool,

    /// Photo to upload.
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,
}

impl ProductArgs {
    /// Builds the upload record.
    #[must_use]
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft::new(&self.name, &self.restaurant_id, &self.category, self.price)
            .with_description(&self.description)
            .with_extra_time(self.extra_time)
            .with_featured(self.featured)
    }
}
