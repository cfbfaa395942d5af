//! Code signing of the finished disk image.
//!
//! The identity is either given explicitly or discovered from the keychain
//! with `security find-identity`. After `codesign --sign`, the signature is
//! read back with `codesign --display` and its first `Authority=` line is
//! reported as the signer.

use crate::bundler::{
    error::{Error, Result},
    settings::SigningSettings,
    utils::command,
};
use regex::Regex;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::LazyLock;

/// Certificate kind used for distributing outside the App Store.
pub const DEVELOPER_ID_APPLICATION: &str = "Developer ID Application";

static IDENTITY_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"^\s*\d+\)\s+([0-9A-Fa-f]{40})\s+"(.+)"\s*$"#).ok());

static AUTHORITY_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?m)^Authority=(.*)$").ok());

/// A code signing identity in the keychain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningIdentity {
    /// SHA-1 fingerprint of the certificate.
    pub hash: String,
    /// Common name, e.g. `Developer ID Application: Jane Doe (TEAMID)`.
    pub name: String,
}

/// Parses the output of `security find-identity -v -p codesigning`.
pub fn parse_identities(stdout: &str) -> Vec<SigningIdentity> {
    let Some(re) = IDENTITY_LINE.as_ref() else {
        return Vec::new();
    };
    stdout
        .lines()
        .filter_map(|line| re.captures(line))
        .map(|caps| SigningIdentity {
            hash: caps[1].to_string(),
            name: caps[2].to_string(),
        })
        .collect()
}

/// First Developer ID Application identity.
pub fn select_identity(identities: &[SigningIdentity]) -> Option<&SigningIdentity> {
    identities
        .iter()
        .find(|identity| identity.name.starts_with(DEVELOPER_ID_APPLICATION))
}

/// Signer named by the first `Authority=` line of `codesign --display` output.
pub fn parse_authority(stderr: &str) -> Option<String> {
    AUTHORITY_LINE
        .as_ref()?
        .captures(stderr)
        .map(|caps| caps[1].trim().to_string())
}

async fn discover_identity() -> Result<String> {
    let output = command::run("security", ["find-identity", "-v", "-p", "codesigning"])
        .await
        .map_err(|e| Error::Signing(e.to_string()))?;
    let identities = parse_identities(&String::from_utf8_lossy(&output.stdout));
    log::debug!("Found {} code signing identities", identities.len());

    select_identity(&identities)
        .map(|identity| identity.name.clone())
        .ok_or_else(|| Error::Signing("No suitable code signing identity found".into()))
}

/// Signs `dmg` and returns the signing authority.
///
/// # Errors
///
/// Every failure is reported as [`Error::Signing`]: the image itself has
/// already been written and stays usable.
pub async fn sign_dmg(dmg: &Path, settings: &SigningSettings) -> Result<String> {
    log::info!("Code signing DMG...");

    let identity = match &settings.identity {
        Some(identity) => identity.clone(),
        None => discover_identity().await?,
    };
    log::debug!("Signing with identity: {}", identity);

    command::run(
        "codesign",
        [OsStr::new("--sign"), OsStr::new(&identity), dmg.as_os_str()],
    )
    .await
    .map_err(|e| match e {
        Error::CommandFailed { stderr, .. } => Error::Signing(stderr),
        other => Error::Signing(other.to_string()),
    })?;

    let display = command::output(
        "codesign",
        [dmg.as_os_str(), OsStr::new("--display"), OsStr::new("--verbose=2")],
    )
    .await
    .map_err(|e| Error::Signing(e.to_string()))?;

    let authority = parse_authority(&String::from_utf8_lossy(&display.stderr))
        .ok_or_else(|| Error::Signing("Not code signed".into()))?;

    log::info!("✓ Code signing identity: {}", authority);
    Ok(authority)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIND_IDENTITY: &str = r#"
  1) 0123456789ABCDEF0123456789ABCDEF01234567 "Apple Development: Jane Doe (ABCDE12345)"
  2) 89ABCDEF0123456789ABCDEF0123456789ABCDEF "Developer ID Application: Jane Doe (ABCDE12345)"
  3) FEDCBA9876543210FEDCBA9876543210FEDCBA98 "Developer ID Installer: Jane Doe (ABCDE12345)"
     3 valid identities found
"#;

    #[test]
    fn line_patterns_compile() {
        assert!(IDENTITY_LINE.is_some());
        assert!(AUTHORITY_LINE.is_some());
    }

    #[test]
    fn parses_all_identities() {
        let identities = parse_identities(FIND_IDENTITY);
        assert_eq!(identities.len(), 3);
        assert_eq!(identities[0].hash, "0123456789ABCDEF0123456789ABCDEF01234567");
        assert_eq!(identities[2].name, "Developer ID Installer: Jane Doe (ABCDE12345)");
    }

    #[test]
    fn selects_developer_id_application() {
        let identities = parse_identities(FIND_IDENTITY);
        let selected = select_identity(&identities).unwrap();
        assert_eq!(selected.name, "Developer ID Application: Jane Doe (ABCDE12345)");
    }

    #[test]
    fn no_identities_found() {
        let identities = parse_identities("     0 valid identities found\n");
        assert!(identities.is_empty());
        assert!(select_identity(&identities).is_none());
    }

    #[test]
    fn authority_is_first_match() {
        let stderr = "Executable=/tmp/Lungo 1.0.dmg\n\
                      Identifier=Lungo 1.0\n\
                      Authority=Developer ID Application: Jane Doe (ABCDE12345)\n\
                      Authority=Developer ID Certification Authority\n\
                      Authority=Apple Root CA\n";
        assert_eq!(
            parse_authority(stderr).unwrap(),
            "Developer ID Application: Jane Doe (ABCDE12345)"
        );
    }

    #[test]
    fn unsigned_has_no_authority() {
        assert!(parse_authority("/tmp/Lungo.dmg: code object is not signed at all\n").is_none());
    }
}
