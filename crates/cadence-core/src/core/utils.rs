use std::path::Path;

/// Creates a directory and its parents, tolerating existing directories.
pub fn mkdir(dir: &Path) -> std::io::Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)
}

/// Appends a suffix to a path without replacing its extension.
///
/// `data/run.xyz` with suffix `.thermo` becomes `data/run.xyz.thermo`.
pub fn path_with_suffix(path: &Path, suffix: &str) -> std::path::PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    std::path::PathBuf::from(name)
}

/// Formats a time interval in seconds as `d:hh:mm:ss`.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let secs = total % 60;
    format!("{}d:{:02}h:{:02}m:{:02}s", days, hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn mkdir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        mkdir(&nested).unwrap();
        mkdir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn suffix_keeps_original_extension() {
        let path = PathBuf::from("data/run.xyz");
        assert_eq!(
            path_with_suffix(&path, ".thermo"),
            PathBuf::from("data/run.xyz.thermo")
        );
    }

    #[test]
    fn duration_rendering() {
        assert_eq!(format_duration(0.0), "0d:00h:00m:00s");
        assert_eq!(format_duration(90.0), "0d:00h:01m:30s");
        assert_eq!(format_duration(90_061.0), "1d:01h:01m:01s");
    }
}
