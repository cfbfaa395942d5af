//! Command line interface for `create-dmg`.

mod args;

pub use args::{Args, DEFAULT_SLA_FILE};

use crate::bundler::{DmgArtifact, DmgBuilder};
use crate::error::{CliError, Result};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    execute(Args::parse_args()).await
}

/// Runs the command for already parsed arguments.
///
/// Disk images can only be created on macOS; elsewhere this fails with
/// [`CliError::UnsupportedPlatform`] before touching any file.
pub async fn execute(args: Args) -> Result<i32> {
    if !cfg!(target_os = "macos") {
        return Err(CliError::UnsupportedPlatform.into());
    }

    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let settings = args.to_settings()?;
    let artifact = DmgBuilder::new(settings).build().await?;
    report(&artifact);

    Ok(0)
}

fn report(artifact: &DmgArtifact) {
    println!("✓ DMG created: {}", artifact.path.display());
    println!("  Size: {} bytes", artifact.size);
    println!("  SHA256: {}", artifact.checksum);
    if let Some(authority) = &artifact.signed_by {
        println!("  Signed by: {}", authority);
    }
    if !artifact.composed_icon {
        println!("  Volume icon: default");
    }
}
