//! Path expansion and well-known tool directories

use std::path::{Path, PathBuf};

/// Expand `~` and `$VAR` in `raw` and anchor relative results at `base`.
///
/// Unknown variables leave the text as written (only `~` is expanded in that
/// case), so a bad value surfaces later as a missing file instead of an error.
pub fn expand_path(raw: &str, base: &Path) -> PathBuf {
    let expanded = shellexpand::full(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| shellexpand::tilde(raw).into_owned());

    let path = PathBuf::from(expanded);
    if path.is_relative() {
        base.join(path)
    } else {
        path
    }
}

/// Gradle user home: `GRADLE_USER_HOME` if set, else `~/.gradle`
pub fn gradle_user_home(override_dir: Option<&str>) -> Option<PathBuf> {
    match override_dir.filter(|s| !s.is_empty()) {
        Some(dir) => Some(PathBuf::from(shellexpand::tilde(dir).into_owned())),
        None => dirs::home_dir().map(|h| h.join(".gradle")),
    }
}

/// Android user home: `ANDROID_USER_HOME` if set, else `~/.android`
pub fn android_user_home(override_dir: Option<&str>) -> Option<PathBuf> {
    match override_dir.filter(|s| !s.is_empty()) {
        Some(dir) => Some(PathBuf::from(shellexpand::tilde(dir).into_owned())),
        None => dirs::home_dir().map(|h| h.join(".android")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_anchored_at_base() {
        let p = expand_path("keys/release.jks", Path::new("/work/android"));
        assert_eq!(p, PathBuf::from("/work/android/keys/release.jks"));
    }

    #[test]
    fn test_absolute_path_untouched() {
        let p = expand_path("/etc/release.jks", Path::new("/work"));
        assert_eq!(p, PathBuf::from("/etc/release.jks"));
    }

    #[test]
    fn test_tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            let p = expand_path("~/release.jks", Path::new("/work"));
            assert_eq!(p, home.join("release.jks"));
        }
    }

    #[test]
    fn test_unknown_variable_kept_verbatim() {
        let p = expand_path("$SIGNKIT_SURELY_UNSET_VAR_42/k.jks", Path::new("/base"));
        assert_eq!(p, PathBuf::from("/base/$SIGNKIT_SURELY_UNSET_VAR_42/k.jks"));
    }

    #[test]
    fn test_gradle_user_home_override() {
        assert_eq!(
            gradle_user_home(Some("/opt/gradle-home")),
            Some(PathBuf::from("/opt/gradle-home"))
        );
    }

    #[test]
    fn test_empty_override_falls_back_to_home() {
        assert_eq!(
            android_user_home(Some("")),
            dirs::home_dir().map(|h| h.join(".android"))
        );
    }
}
