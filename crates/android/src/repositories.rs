//! Maven repository mirrors

use serde::Serialize;
use signkit_core::config::RepositoriesConfig;

/// URL behind Gradle's `google()`
pub const GOOGLE_MAVEN: &str = "https://dl.google.com/dl/android/maven2/";
/// URL behind Gradle's `mavenCentral()`
pub const MAVEN_CENTRAL: &str = "https://repo.maven.apache.org/maven2/";

/// One repository, in lookup order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub name: String,
    pub url: String,
}

impl Repository {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Kotlin DSL declaration for this repository
    pub fn to_kotlin_dsl(&self) -> String {
        match self.url.as_str() {
            GOOGLE_MAVEN => "google()".to_string(),
            MAVEN_CENTRAL => "mavenCentral()".to_string(),
            url => format!("maven {{ url = uri(\"{url}\") }}"),
        }
    }
}

/// Ordered repository list: mirrors first, then the defaults
///
/// Duplicates are dropped keeping the first occurrence; URLs that differ
/// only by a trailing `/` are the same repository.
pub fn repositories(config: &RepositoriesConfig) -> Vec<Repository> {
    let mut candidates: Vec<Repository> = config
        .mirrors
        .iter()
        .enumerate()
        .map(|(i, url)| Repository::new(format!("mirror{}", i + 1), url.clone()))
        .collect();

    if config.include_defaults {
        candidates.push(Repository::new("google", GOOGLE_MAVEN));
        candidates.push(Repository::new("mavenCentral", MAVEN_CENTRAL));
    }

    let mut seen = Vec::new();
    candidates.retain(|repo| {
        let key = repo.url.trim_end_matches('/').to_string();
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
    candidates
}

/// Render a `repositories { ... }` block for `allprojects`
pub fn render_kotlin_dsl(repos: &[Repository]) -> String {
    let mut out = String::from("repositories {\n");
    for repo in repos {
        out.push_str("    ");
        out.push_str(&repo.to_kotlin_dsl());
        out.push('\n');
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mirrors: &[&str], include_defaults: bool) -> RepositoriesConfig {
        RepositoriesConfig {
            mirrors: mirrors.iter().map(ToString::to_string).collect(),
            include_defaults,
        }
    }

    #[test]
    fn test_defaults_only() {
        let repos = repositories(&RepositoriesConfig::default());
        let urls: Vec<_> = repos.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, [GOOGLE_MAVEN, MAVEN_CENTRAL]);
    }

    #[test]
    fn test_mirrors_come_first() {
        let repos = repositories(&config(
            &["https://maven.aliyun.com/repository/google", "https://maven.aliyun.com/repository/public"],
            true,
        ));
        assert_eq!(repos.len(), 4);
        assert_eq!(repos[0].name, "mirror1");
        assert_eq!(repos[1].url, "https://maven.aliyun.com/repository/public");
        assert_eq!(repos[2].name, "google");
    }

    #[test]
    fn test_duplicates_dropped_ignoring_trailing_slash() {
        let repos = repositories(&config(
            &[
                "https://repo.maven.apache.org/maven2",
                "https://mirror.example/m2/",
                "https://mirror.example/m2",
            ],
            true,
        ));
        let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["mirror1", "mirror2", "google"]);
    }

    #[test]
    fn test_defaults_can_be_disabled() {
        let repos = repositories(&config(&["https://mirror.example/m2/"], false));
        assert_eq!(repos.len(), 1);
    }

    #[test]
    fn test_kotlin_dsl_rendering() {
        let repos = repositories(&config(&["https://mirror.example/m2/"], true));
        let dsl = render_kotlin_dsl(&repos);
        assert_eq!(
            dsl,
            "repositories {\n    maven { url = uri(\"https://mirror.example/m2/\") }\n    google()\n    mavenCentral()\n}\n"
        );
    }
}
