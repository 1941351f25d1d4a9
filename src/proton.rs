//! Proton version discovery
//!
//! Lists the compatibility tools installed in the user's
//! `compatibilitytools.d` and resolves a version name to its directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::log_info;

/// Offered when no compatibility tools are installed, so the selector is never empty.
pub const FALLBACK_PROTON_VERSIONS: [&str; 2] = ["Proton Experimental", "Proton 9.0-3"];

/// `<home>/.steam/steam/compatibilitytools.d`
pub fn compat_tools_dir(home: &Path) -> PathBuf {
    home.join(".steam/steam/compatibilitytools.d")
}

/// Resolve a version name to its directory. The path is not checked for
/// existence; a bad version only surfaces when the runner fails.
pub fn resolve_proton_path(home: &Path, proton_ver: &str) -> PathBuf {
    compat_tools_dir(home).join(proton_ver)
}

/// Names of installed compatibility tools, sorted by name.
///
/// Falls back to `FALLBACK_PROTON_VERSIONS` when the directory is missing or
/// contains no tool directories.
pub fn list_proton_versions(home: &Path) -> Vec<String> {
    let compat_dir = compat_tools_dir(home);
    let mut versions = find_installed(&compat_dir);

    if versions.is_empty() {
        log_info(&format!(
            "No compatibility tools in {}, offering defaults",
            compat_dir.display()
        ));
        return FALLBACK_PROTON_VERSIONS.iter().map(|v| v.to_string()).collect();
    }

    versions.sort();
    versions
}

fn find_installed(compat_dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(compat_dir) else {
        return Vec::new();
    };

    entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_steam_dir_gives_fallback() {
        let home = tempfile::tempdir().unwrap();
        assert_eq!(
            list_proton_versions(home.path()),
            vec!["Proton Experimental".to_string(), "Proton 9.0-3".to_string()]
        );
    }

    #[test]
    fn test_empty_compat_dir_gives_fallback() {
        let home = tempfile::tempdir().unwrap();
        let compat = compat_tools_dir(home.path());
        fs::create_dir_all(&compat).unwrap();
        // Loose files are not tools
        fs::write(compat.join("README.txt"), "not a tool").unwrap();

        assert_eq!(list_proton_versions(home.path()).len(), 2);
    }

    #[test]
    fn test_installed_versions_are_listed_sorted() {
        let home = tempfile::tempdir().unwrap();
        let compat = compat_tools_dir(home.path());
        fs::create_dir_all(compat.join("GE-Proton9-20")).unwrap();
        fs::create_dir_all(compat.join("GE-Proton10-4")).unwrap();
        fs::create_dir_all(compat.join("Proton-CachyOS")).unwrap();

        assert_eq!(
            list_proton_versions(home.path()),
            vec!["GE-Proton10-4", "GE-Proton9-20", "Proton-CachyOS"]
        );
    }

    #[test]
    fn test_resolve_does_not_require_existence() {
        let path = resolve_proton_path(Path::new("/home/u"), "Proton 9.0-3");
        assert_eq!(
            path,
            PathBuf::from("/home/u/.steam/steam/compatibilitytools.d/Proton 9.0-3")
        );
        assert!(!path.exists());
    }
}
