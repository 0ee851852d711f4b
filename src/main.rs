use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use subpack::archiver::{Archiver, PackOptions, SevenZipBinary};
use subpack::backup;
use subpack::editor::EditorPaths;
use subpack::runtime::{RealRuntime, Runtime};

/// subpack - package directory archiver
///
/// Pack, unpack and back up an editor's "Packages" and "Installed Packages"
/// directories through an external 7-Zip-compatible binary.
///
/// Examples:
///   subpack pack -o settings.zip   # Archive both package directories
///   subpack unpack settings.zip    # Extract an archive back over them
#[derive(Parser, Debug)]
#[command(author, version = env!("SUBPACK_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Editor data directory (overrides discovery; also via SUBPACK_DATA_DIR)
    #[arg(
        long = "data-dir",
        short = 'd',
        env = "SUBPACK_DATA_DIR",
        value_name = "PATH",
        global = true
    )]
    pub data_dir: Option<PathBuf>,

    /// 7-Zip binary to use (defaults to searching PATH; also via SUBPACK_7Z)
    #[arg(long = "sevenzip", env = "SUBPACK_7Z", value_name = "PATH", global = true)]
    pub sevenzip: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Archive both package directories
    Pack(PackArgs),

    /// Extract an archive
    Unpack(UnpackArgs),

    /// Copy both package directories to their .bak counterparts
    Backup(BackupArgs),

    /// Move the .bak directories back over the live ones
    Restore(RestoreArgs),

    /// Remove the backup directories
    Clean(CleanArgs),

    /// Print the resolved directories
    Paths(PathsArgs),
}

#[derive(clap::Args, Debug)]
pub struct PackArgs {
    /// Write the archive here instead of a generated temp file
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Protect the archive with a password
    #[arg(long = "password", short = 'p', value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Archive everything restorable, including externally managed packages
    #[arg(long)]
    pub backup: bool,

    /// Keep externally managed packages in the archive
    #[arg(long = "keep-managed")]
    pub keep_managed: bool,

    /// Extra exclusion pattern, relative to the data directory (repeatable)
    #[arg(long = "exclude", short = 'x', value_name = "PATTERN")]
    pub exclude: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct UnpackArgs {
    /// The archive to extract
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Extract here instead of the data directory
    #[arg(long = "output-dir", short = 'o', value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Archive password
    #[arg(long = "password", short = 'p', value_name = "PASSWORD")]
    pub password: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct BackupArgs {}

#[derive(clap::Args, Debug)]
pub struct RestoreArgs {
    /// Skip the confirmation prompt
    #[arg(long = "yes", short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct CleanArgs {}

#[derive(clap::Args, Debug)]
pub struct PathsArgs {}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    let paths = EditorPaths::resolve(&runtime, cli.data_dir)?;

    match cli.command {
        Commands::Pack(args) => {
            let sevenzip = SevenZipBinary::locate(&runtime, cli.sevenzip)?;
            let archiver = Archiver::new(runtime, sevenzip, paths);
            let output = archiver.pack(PackOptions {
                password: args.password,
                backup: args.backup,
                exclude_managed: !args.keep_managed,
                exclusions: args.exclude,
                output: args.output,
            })?;
            println!("{}", output.display());
        }
        Commands::Unpack(args) => {
            let sevenzip = SevenZipBinary::locate(&runtime, cli.sevenzip)?;
            let archiver = Archiver::new(runtime, sevenzip, paths);
            archiver.unpack(args.input, args.output_dir, args.password)?;
        }
        Commands::Backup(_args) => backup::backup(&runtime, &paths)?,
        Commands::Restore(args) => {
            if args.yes || runtime.confirm("Replace the live directories with their backups?")? {
                backup::restore_backups(&runtime, &paths)?;
            } else {
                println!("Aborted.");
            }
        }
        Commands::Clean(_args) => backup::remove_backups(&runtime, &paths),
        Commands::Paths(_args) => {
            println!("data dir:           {}", paths.data_dir().display());
            println!("packages:           {}", paths.packages().display());
            println!("installed packages: {}", paths.installed_packages().display());
            println!("packages backup:    {}", paths.packages_bak().display());
            println!("installed backup:   {}", paths.installed_packages_bak().display());
        }
    }
    Ok(())
}
