use crate::auth::SessionContext;
use crate::constants::{COMPRESSED_PREFIX, DESTINATION_FOLDER_FORMAT, OUTPUT_MIME_TYPE};
use crate::drive::{DriveFile, FileStore};
use crate::enhance::enhance_image;
use crate::error::{Result, SqueezeError};
use crate::notify::{Notification, Notifier};
use crate::processing::{compress_to_budget, load_image_from_bytes, EncodedArtifact};
use crate::utils::create_progress_spinner;
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::time::Instant;
use tracing::{info, warn};

/// One selected file to compress.
#[derive(Debug, Clone)]
pub struct CompressionJob {
    pub file: DriveFile,
    pub budget: u64,
    pub enhance: bool,
}

/// What a batch run did.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub destination_folder_id: String,
    pub destination_folder_name: String,
    /// Original names of the files that were uploaded, in processing order.
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, SqueezeError)>,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

impl BatchReport {
    /// Nothing in the batch made it; reported as a warning, not an error.
    pub fn all_failed(&self) -> bool {
        self.succeeded.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Folder name for a batch started at `at`: `YYYY-MM-DD_HH-MM-SS`.
///
/// Two batches started within the same second get the same name.
pub fn destination_folder_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format(DESTINATION_FOLDER_FORMAT).to_string()
}

/// Upload name for a compressed file; the original name is kept verbatim.
pub fn output_file_name(original: &str) -> String {
    format!("{}{}", COMPRESSED_PREFIX, original)
}

/// Download, decode, optionally enhance and encode one file, then upload the
/// result into `destination_folder_id`.
///
/// Returns the source size, the artifact and the uploaded file.
pub fn process_single_file(
    store: &dyn FileStore,
    job: &CompressionJob,
    destination_folder_id: &str,
) -> Result<(u64, EncodedArtifact, DriveFile)> {
    let source = store.download(&job.file.id)?;
    let original_size = source.len() as u64;

    let img = load_image_from_bytes(&source)?;
    drop(source);

    let img = if job.enhance { enhance_image(&img) } else { img };
    let artifact = compress_to_budget(&img, job.budget)?;

    let uploaded = store.upload(
        &artifact.bytes,
        &output_file_name(&job.file.name),
        destination_folder_id,
        OUTPUT_MIME_TYPE,
        None,
    )?;

    Ok((original_size, artifact, uploaded))
}

/// Compresses each selected file under `budget` bytes and uploads the
/// results into `destination_folder_id`.
///
/// A failure on one file never stops the rest of the batch. Every file
/// produces exactly one notification; if none succeeded an extra aggregate
/// warning follows.
pub fn compress_batch(
    store: &dyn FileStore,
    files: &[DriveFile],
    budget: u64,
    destination_folder_id: &str,
    enhance: bool,
    notifier: &mut dyn Notifier,
) -> BatchReport {
    let start_time = Instant::now();
    let total_files = files.len();
    let mut report = BatchReport {
        destination_folder_id: destination_folder_id.to_string(),
        ..BatchReport::default()
    };

    for (index, file) in files.iter().enumerate() {
        let job = CompressionJob {
            file: file.clone(),
            budget,
            enhance,
        };

        let pb = create_progress_spinner(&format!(
            "Compressing {} ({}/{})...",
            file.name,
            index + 1,
            total_files
        ));
        let result = process_single_file(store, &job, destination_folder_id);
        pb.finish_and_clear();

        match result {
            Ok((original_size, artifact, uploaded)) => {
                info!(
                    file = %file.name,
                    quality = artifact.quality,
                    size = artifact.size,
                    "compressed and uploaded"
                );
                notifier.notify(Notification::Compressed {
                    file_name: &file.name,
                    uploaded_as: &uploaded.name,
                    original_size,
                    compressed_size: artifact.size,
                    quality: artifact.quality,
                });
                report.bytes_before += original_size;
                report.bytes_after += artifact.size;
                report.succeeded.push(file.name.clone());
            }
            Err(error) => {
                warn!(file = %file.name, %error, "file skipped");
                notifier.notify(Notification::Failed {
                    file_name: &file.name,
                    error: &error,
                });
                report.failed.push((file.name.clone(), error));
            }
        }
    }

    if report.all_failed() {
        notifier.notify(Notification::AllFailed {
            attempted: total_files,
        });
    }

    info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "batch finished"
    );
    report
}

/// Creates a timestamped destination folder under the session's folder and
/// compresses `files` into it.
pub fn run_batch(
    store: &dyn FileStore,
    session: &SessionContext,
    files: &[DriveFile],
    budget: u64,
    enhance: bool,
    notifier: &mut dyn Notifier,
) -> Result<BatchReport> {
    let folder_name = destination_folder_name(&Local::now());
    let folder_id = store.create_folder(&folder_name, Some(&session.folder_id))?;
    info!(user = %session.user, folder = %folder_name, files = files.len(), "starting batch");

    let mut report = compress_batch(store, files, budget, &folder_id, enhance, notifier);
    report.destination_folder_name = folder_name;
    Ok(report)
}
