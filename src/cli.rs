use crate::constants::{MAX_BUDGET_KB, MIN_BUDGET_KB};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "drive-squeeze",
    about = "Enhance and compress Google Drive images under a size budget",
    long_about = "drive-squeeze logs you in against a credential table stored in Google Drive, \
                  lists the images in your folder, and re-uploads the ones you pick as JPEGs \
                  that fit a size budget, optionally enhanced first. Results land in a new \
                  timestamped folder next to the originals.",
    version = "0.1.0",
    after_help = "EXAMPLES:\n  \
    drive-squeeze\n  \
    drive-squeeze list -u alice -p secret\n  \
    drive-squeeze compress -u alice -p secret -b 300 --file cat.png --file dog.jpg\n  \
    drive-squeeze --store local:./drive compress -u admin -p secret --no-enhance"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(
        short = 'c',
        long,
        global = true,
        help = "Configuration file (default: ./drive-squeeze.toml)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 's',
        long,
        global = true,
        help = "Override the file store: 'google' or 'local:<dir>'"
    )]
    pub store: Option<String>,

    #[arg(short = 'q', long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(
        short = 'v',
        long,
        global = true,
        conflicts_with = "quiet",
        help = "Print diagnostic logs and per-file quality"
    )]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Interactive session (default)",
        long_about = "Log in, tick the images to compress, choose a size budget and whether to \
                      enhance, then submit. Wrong credentials re-prompt."
    )]
    Session,

    #[command(about = "List the images in your folder")]
    List {
        #[arg(short = 'u', long, help = "Username from the credential table")]
        user: String,

        #[arg(short = 'p', long, help = "Password from the credential table")]
        password: String,
    },

    #[command(
        about = "Compress images without prompting",
        long_about = "Compress the named images (or every image in your folder) under a size \
                      budget and upload them into a new timestamped folder."
    )]
    Compress {
        #[arg(short = 'u', long, help = "Username from the credential table")]
        user: String,

        #[arg(short = 'p', long, help = "Password from the credential table")]
        password: String,

        #[arg(
            short = 'b',
            long,
            value_parser = clap::value_parser!(u32).range(MIN_BUDGET_KB as i64..=MAX_BUDGET_KB as i64),
            help = "Target size per image in KB (50-2048, default: 500)"
        )]
        budget_kb: Option<u32>,

        #[arg(long, conflicts_with = "no_enhance", help = "Enhance before compressing")]
        enhance: bool,

        #[arg(long, help = "Skip the enhancement step")]
        no_enhance: bool,

        #[arg(
            short = 'f',
            long = "file",
            help = "Image name to include; repeat for more (default: all)"
        )]
        files: Vec<String>,
    },
}
