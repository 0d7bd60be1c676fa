use anyhow::{Context, Result};
use clap::Parser;
use drive_squeeze::auth::AuthGate;
use drive_squeeze::cli::{Args, Commands};
use drive_squeeze::config::AppConfig;
use drive_squeeze::constants::{BYTES_PER_KB, INFO_PREFIX, WARNING_PREFIX};
use drive_squeeze::drive::{open_store, FileStore};
use drive_squeeze::logger::init_logging;
use drive_squeeze::notify::ConsoleNotifier;
use drive_squeeze::session::{
    list_folder_images, login, run_interactive, select_by_name, submit_batch, BatchSettings,
};
use drive_squeeze::utils::format_file_size;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.quiet, args.verbose);

    let mut config =
        AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(spec) = &args.store {
        config = config.with_store_override(spec)?;
    }
    let store = open_store(&config).context("Failed to open file store")?;
    let mut notifier = ConsoleNotifier;

    match args.command.unwrap_or(Commands::Session) {
        Commands::Session => {
            run_interactive(store.as_ref(), &config, &mut notifier)?;
        }
        Commands::List { user, password } => {
            show_images(store.as_ref(), &config, &user, &password)?;
        }
        Commands::Compress {
            user,
            password,
            budget_kb,
            enhance,
            no_enhance,
            files,
        } => {
            let settings = BatchSettings {
                budget_kb: budget_kb.unwrap_or(config.default_budget_kb),
                enhance: if enhance {
                    true
                } else if no_enhance {
                    false
                } else {
                    config.enhance_by_default
                },
            };
            compress_images(store.as_ref(), &config, &user, &password, &files, &settings)?;
        }
    }

    Ok(())
}

fn show_images(store: &dyn FileStore, config: &AppConfig, user: &str, password: &str) -> Result<()> {
    let mut auth = AuthGate::new(config);
    let session = login(store, &mut auth, user, password)?;

    let images = list_folder_images(store, &session.folder_id)
        .with_context(|| format!("Failed to list folder {}", session.folder_id))?;
    if images.is_empty() {
        eprintln!("{}  No images found in {}", WARNING_PREFIX, session.folder_id);
        return Ok(());
    }

    println!("{} {} images in {}", INFO_PREFIX, images.len(), session.folder_id);
    for image in &images {
        println!("  {}  ({})", image.name, image.mime_type);
    }
    Ok(())
}

fn compress_images(
    store: &dyn FileStore,
    config: &AppConfig,
    user: &str,
    password: &str,
    names: &[String],
    settings: &BatchSettings,
) -> Result<()> {
    let mut auth = AuthGate::new(config);
    let session = login(store, &mut auth, user, password)?;

    let images = list_folder_images(store, &session.folder_id)
        .with_context(|| format!("Failed to list folder {}", session.folder_id))?;
    let (selected, unknown) = select_by_name(&images, names);
    for name in &unknown {
        eprintln!("{}  Not an image in {}: {}", WARNING_PREFIX, session.folder_id, name);
    }
    if selected.is_empty() {
        eprintln!("{}  Nothing to compress", WARNING_PREFIX);
        return Ok(());
    }

    println!(
        "{} Compressing {} images to at most {} each",
        INFO_PREFIX,
        selected.len(),
        format_file_size(settings.budget_kb as u64 * BYTES_PER_KB)
    );
    let mut notifier = ConsoleNotifier;
    submit_batch(store, &session, &selected, settings, &mut notifier)?;
    Ok(())
}
