use crate::constants::{ERROR_PREFIX, SIZE_PREFIX, SUCCESS_PREFIX, WARNING_PREFIX};
use crate::error::SqueezeError;
use crate::logger::{is_quiet, is_verbose};
use crate::utils::{calculate_compression_ratio, format_file_size};
use console::style;

/// Something the user should be told about during a batch.
#[derive(Debug)]
pub enum Notification<'a> {
    Compressed {
        file_name: &'a str,
        uploaded_as: &'a str,
        original_size: u64,
        compressed_size: u64,
        quality: u8,
    },
    Failed {
        file_name: &'a str,
        error: &'a SqueezeError,
    },
    /// Every file in a batch failed.
    AllFailed { attempted: usize },
}

pub trait Notifier {
    fn notify(&mut self, notification: Notification<'_>);
}

/// Prints notifications to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notification: Notification<'_>) {
        match notification {
            Notification::Compressed {
                file_name,
                uploaded_as,
                original_size,
                compressed_size,
                quality,
            } => {
                if is_quiet() {
                    return;
                }
                let ratio = calculate_compression_ratio(original_size, compressed_size);
                println!(
                    "{} {} → {} ({} → {}, {:.1}% smaller)",
                    SUCCESS_PREFIX,
                    style(file_name).bold(),
                    uploaded_as,
                    format_file_size(original_size),
                    style(format_file_size(compressed_size)).green(),
                    ratio
                );
                if is_verbose() {
                    println!("   {} JPEG quality {}", SIZE_PREFIX, quality);
                }
            }
            Notification::Failed { file_name, error } => {
                eprintln!(
                    "{} {}: {}",
                    ERROR_PREFIX,
                    style(file_name).bold(),
                    style(error).red()
                );
            }
            Notification::AllFailed { attempted } => {
                eprintln!(
                    "{}  {}",
                    WARNING_PREFIX,
                    style(SqueezeError::EmptyBatchResult(attempted)).yellow()
                );
            }
        }
    }
}
