use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use firmpack_core::assemble::{assemble, PackageConfig};
use firmpack_core::release::{GithubReleases, UPDATER_PROJECT};

/// Assemble a firmware update package.
///
/// With no arguments the latest updater release is fetched and packaged;
/// local binaries can be supplied instead of the remote fetch.
#[derive(Parser)]
#[command(name = "firmpack", version, about = "firmware update package assembler")]
struct Cli {
    /// Directory where the finished package is placed
    #[arg(short = 'w', long, default_value = ".")]
    workdir: PathBuf,
    /// Local updater binary to package instead of the latest release
    #[arg(short = 'u', long)]
    updater: Option<PathBuf>,
    /// Local boot image to include
    #[arg(short = 'b', long)]
    boot: Option<PathBuf>,
    /// Version recorded for the updater binary
    #[arg(long)]
    updater_version: Option<String>,
    /// Version recorded for the boot image
    #[arg(long)]
    boot_version: Option<String>,
    /// Checksum recorded for the updater binary instead of hashing it
    #[arg(long)]
    updater_checksum: Option<String>,
    /// Archive name to create
    #[arg(short = 'o', long, default_value = "update.tar")]
    output: String,
    /// Remote project the updater release is fetched from
    #[arg(long, default_value = UPDATER_PROJECT)]
    project: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = PackageConfig {
        updater: cli.updater,
        boot: cli.boot,
        updater_version: cli.updater_version,
        boot_version: cli.boot_version,
        updater_checksum: cli.updater_checksum,
        project: cli.project,
        package_name: cli.output,
        out_dir: Some(cli.workdir),
    };
    let source = GithubReleases::new()?;
    let published = assemble(&cfg, &source)?;
    println!("{}", published.display());
    Ok(())
}
