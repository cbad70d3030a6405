use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use futures_util::future::join_all;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use qskipper_media::application::SaveProductUseCase;
use qskipper_media::domain::entities::AuthToken;
use qskipper_media::infrastructure::config::ProductArgs;
use qskipper_media::infrastructure::{
    AppConfig, CliArgs, Command, DiskImageCache, HttpImageFetcher, ImageLoader,
    InMemoryTokenStore, ProductApiClient, StorageManager,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

fn open_image(product: &ProductArgs) -> Result<Option<image::DynamicImage>> {
    product
        .image
        .as_ref()
        .map(|path| {
            image::open(path).wrap_err_with(|| format!("failed to open {}", path.display()))
        })
        .transpose()
}

async fn fetch(loader: &ImageLoader, urls: Vec<String>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handles: Vec<_> = urls
        .into_iter()
        .map(|url| loader.spawn_load(url, tx.clone()))
        .collect();
    drop(tx);

    join_all(handles).await;

    while let Some(event) = rx.recv().await {
        match event.result {
            Ok(loaded) => {
                let (width, height) = loaded.dimensions();
                println!(
                    "{}\t{}\t{width}x{height}\t{}",
                    event.url, loaded.source, loaded.fingerprint
                );
            }
            Err(e) => {
                warn!(url = %event.url, error = %e, "Image load failed");
                println!("{}\terror\t{e}", event.url);
            }
        }
    }

    info!(stats = %loader.memory_cache_stats(), "Memory cache");
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    init_logging(&config)?;

    info!(version = qskipper_media::VERSION, "Starting {}", qskipper_media::NAME);

    let tokens = Arc::new(InMemoryTokenStore::default());
    match args.token.clone().map(AuthToken::new) {
        Some(Some(token)) => tokens.set(token),
        Some(None) => warn!("Ignoring blank or malformed bearer token"),
        None => {}
    }
    let fetcher = Arc::new(HttpImageFetcher::new()?.with_tokens(tokens.clone()));
    let disk_cache = Arc::new(DiskImageCache::new(config.effective_cache_dir()));
    let loader = ImageLoader::new(config.loader_config(), disk_cache, fetcher);

    match args.command {
        Command::Fetch { urls } => fetch(&loader, urls).await,
        Command::Compress {
            input,
            output,
            target_bytes,
            max_dimension,
        } => {
            let mut target = config.compression;
            if let Some(bytes) = target_bytes {
                target.target_bytes = bytes;
            }
            if let Some(dimension) = max_dimension {
                target.max_dimension = dimension;
            }

            let source = image::open(&input)
                .wrap_err_with(|| format!("failed to open {}", input.display()))?;
            let compressed =
                tokio::task::spawn_blocking(move || target.compress(&source)).await??;
            tokio::fs::write(&output, &compressed.bytes).await?;

            println!(
                "{}\t{} bytes\t{}x{}\tquality {:.3}\t{} attempts",
                output.display(),
                compressed.bytes.len(),
                compressed.width,
                compressed.height,
                compressed.quality,
                compressed.attempts
            );
        }
        Command::Invalidate { key } => loader.clear_one(&key).await,
        Command::Clear => loader.clear_all().await,
        Command::CreateProduct(product) => {
            let api = ProductApiClient::new(&config.api_base_url)?.with_tokens(tokens);
            let use_case = SaveProductUseCase::new(Arc::new(api), Arc::new(loader))
                .with_target(config.compression);

            let image = open_image(&product)?;
            let id = use_case.create(&product.to_draft(), image).await?;
            println!("{id}");
        }
        Command::UpdateProduct { id, product } => {
            let api = ProductApiClient::new(&config.api_base_url)?.with_tokens(tokens);
            let use_case = SaveProductUseCase::new(Arc::new(api), Arc::new(loader))
                .with_target(config.compression);

            let image = open_image(&product)?;
            let id = use_case.update(&id, &product.to_draft(), image).await?;
            println!("{id}");
        }
        Command::DeleteProduct { id } => {
            let api = ProductApiClient::new(&config.api_base_url)?.with_tokens(tokens);
            let use_case = SaveProductUseCase::new(Arc::new(api), Arc::new(loader));

            let deleted = use_case.delete(&id).await?;
            println!("{id}\t{}", if deleted { "deleted" } else { "not deleted" });
        }
    }

    Ok(())
}
