use crate::auth::{AuthGate, SessionContext};
use crate::batch::{run_batch, BatchReport};
use crate::config::AppConfig;
use crate::constants::{
    ERROR_PREFIX, FOLDER_PREFIX, INFO_PREFIX, MAX_BUDGET_KB, MIN_BUDGET_KB, SIZE_PREFIX, SUCCESS_PREFIX,
    WARNING_PREFIX,
};
use crate::drive::{DriveFile, FileStore};
use crate::error::{Result, SqueezeError};
use crate::logger::is_quiet;
use crate::notify::Notifier;
use crate::utils::{calculate_compression_ratio, create_progress_spinner, format_file_size};
use crate::validation::budget_bytes;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Password};

/// Settings for one submitted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    pub budget_kb: u32,
    pub enhance: bool,
}

/// Logs in once with the given credentials.
pub fn login(
    store: &dyn FileStore,
    auth: &mut AuthGate,
    username: &str,
    password: &str,
) -> Result<SessionContext> {
    let pb = create_progress_spinner("Checking credentials...");
    let result = auth.login(store, username, password);
    pb.finish_and_clear();
    result
}

/// One interactive login attempt.
///
/// `Ok(None)` means the user should be asked again: wrong credentials, or a
/// credential table that could not be read this time. In the latter case the
/// memoized table is dropped so the next attempt reads it afresh. Only a
/// missing credential table is returned as an error.
pub fn attempt_login(
    store: &dyn FileStore,
    auth: &mut AuthGate,
    username: &str,
    password: &str,
) -> Result<Option<SessionContext>> {
    match login(store, auth, username, password) {
        Ok(session) => Ok(Some(session)),
        Err(SqueezeError::AuthenticationMismatch) => {
            eprintln!("{}  {}", WARNING_PREFIX, SqueezeError::AuthenticationMismatch);
            Ok(None)
        }
        Err(error) if error.is_fatal() => Err(error),
        Err(error) => {
            auth.invalidate();
            eprintln!("{} {}", ERROR_PREFIX, error);
            Ok(None)
        }
    }
}

pub fn list_folder_images(store: &dyn FileStore, folder_id: &str) -> Result<Vec<DriveFile>> {
    let pb = create_progress_spinner("Listing images...");
    let result = store.list_images(folder_id);
    pb.finish_and_clear();
    result
}

/// Picks the files named in `names` out of `available`, keeping the order of
/// `names`. An empty `names` selects everything.
pub fn select_by_name(available: &[DriveFile], names: &[String]) -> (Vec<DriveFile>, Vec<String>) {
    if names.is_empty() {
        return (available.to_vec(), Vec::new());
    }

    let mut selected = Vec::new();
    let mut unknown = Vec::new();
    for name in names {
        match available.iter().find(|f| &f.name == name) {
            Some(file) => selected.push(file.clone()),
            None => unknown.push(name.clone()),
        }
    }
    (selected, unknown)
}

/// Runs one batch for an authenticated session and prints its summary.
pub fn submit_batch(
    store: &dyn FileStore,
    session: &SessionContext,
    files: &[DriveFile],
    settings: &BatchSettings,
    notifier: &mut dyn Notifier,
) -> Result<BatchReport> {
    let budget = budget_bytes(settings.budget_kb)?;
    let report = run_batch(store, session, files, budget, settings.enhance, notifier)?;
    print_summary(&report);
    Ok(report)
}

pub fn print_summary(report: &BatchReport) {
    if is_quiet() {
        return;
    }
    println!("\n{} Batch Summary:", SIZE_PREFIX);
    println!(
        "  {} Destination: {}",
        FOLDER_PREFIX, report.destination_folder_name
    );
    println!(
        "  {} Compressed: {}/{}",
        SUCCESS_PREFIX,
        report.succeeded.len(),
        report.attempted()
    );
    if !report.failed.is_empty() {
        println!("  {}  Failed: {}", WARNING_PREFIX, report.failed.len());
    }
    if report.bytes_before > 0 {
        println!(
            "  {} Total: {} → {} ({:.1}% smaller)",
            SIZE_PREFIX,
            format_file_size(report.bytes_before),
            format_file_size(report.bytes_after),
            calculate_compression_ratio(report.bytes_before, report.bytes_after)
        );
    }
}

/// Interactive session: log in, pick images, choose a budget, compress.
///
/// Wrong credentials re-prompt; a missing credential table ends the session.
pub fn run_interactive(
    store: &dyn FileStore,
    config: &AppConfig,
    notifier: &mut dyn Notifier,
) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut auth = AuthGate::new(config);

    let session = loop {
        let username: String = Input::with_theme(&theme)
            .with_prompt("Username")
            .interact_text()?;
        let password = Password::with_theme(&theme)
            .with_prompt("Password")
            .interact()?;

        if let Some(session) = attempt_login(store, &mut auth, &username, &password)? {
            break session;
        }
    };
    println!("{} Logged in as {}", SUCCESS_PREFIX, session.user);

    loop {
        let folder_id = if session.is_admin {
            Input::with_theme(&theme)
                .with_prompt("Folder ID")
                .default(session.folder_id.clone())
                .interact_text()?
        } else {
            session.folder_id.clone()
        };
        let scoped = session.with_folder(folder_id.trim());

        if let Err(error) = browse_and_compress(&theme, store, config, &scoped, notifier) {
            if error.is_fatal() {
                return Err(error);
            }
            eprintln!("{} {}", ERROR_PREFIX, error);
        }

        let again = Confirm::with_theme(&theme)
            .with_prompt("Process another batch?")
            .default(false)
            .interact()?;
        if !again {
            return Ok(());
        }
    }
}

fn browse_and_compress(
    theme: &ColorfulTheme,
    store: &dyn FileStore,
    config: &AppConfig,
    session: &SessionContext,
    notifier: &mut dyn Notifier,
) -> Result<()> {
    let images = list_folder_images(store, &session.folder_id)?;
    if images.is_empty() {
        eprintln!("{}  No images found in {}", WARNING_PREFIX, session.folder_id);
        return Ok(());
    }

    println!("{} {} images in {}", INFO_PREFIX, images.len(), session.folder_id);
    if let Some((files, settings)) = prompt_batch(theme, config, &images)? {
        submit_batch(store, session, &files, &settings, notifier)?;
    }
    Ok(())
}

fn prompt_batch(
    theme: &ColorfulTheme,
    config: &AppConfig,
    images: &[DriveFile],
) -> Result<Option<(Vec<DriveFile>, BatchSettings)>> {
    let names: Vec<&str> = images.iter().map(|f| f.name.as_str()).collect();
    let chosen = MultiSelect::with_theme(theme)
        .with_prompt("Images to compress (space toggles, enter confirms)")
        .items(&names)
        .defaults(&vec![true; names.len()])
        .interact()?;
    if chosen.is_empty() {
        eprintln!("{}  No images selected", WARNING_PREFIX);
        return Ok(None);
    }

    let budget_kb: u32 = Input::with_theme(theme)
        .with_prompt(format!(
            "Target size in KB ({}-{})",
            MIN_BUDGET_KB, MAX_BUDGET_KB
        ))
        .default(config.default_budget_kb)
        .validate_with(|value: &u32| -> std::result::Result<(), String> {
            budget_bytes(*value).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;

    let enhance = Confirm::with_theme(theme)
        .with_prompt("Enhance images (brightness, color, contrast, sharpness)?")
        .default(config.enhance_by_default)
        .interact()?;

    let submit = Confirm::with_theme(theme)
        .with_prompt(format!("Compress {} images?", chosen.len()))
        .default(true)
        .interact()?;
    if !submit {
        return Ok(None);
    }

    let files = chosen.into_iter().map(|i| images[i].clone()).collect();
    Ok(Some((files, BatchSettings { budget_kb, enhance })))
}
