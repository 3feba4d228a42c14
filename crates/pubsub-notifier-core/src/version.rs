//! Version string assembly.
//!
//! The crate version is optionally suffixed with the commit hash and build
//! date injected at compile time through `PUBSUB_NOTIFIER_COMMIT` and
//! `PUBSUB_NOTIFIER_BUILD_DATE`.

/// Full version string reported at startup.
pub fn version_string() -> String {
    build_version(
        env!("CARGO_PKG_VERSION"),
        option_env!("PUBSUB_NOTIFIER_COMMIT"),
        option_env!("PUBSUB_NOTIFIER_BUILD_DATE"),
    )
}

fn build_version(version: &str, commit: Option<&str>, date: Option<&str>) -> String {
    let mut out = version.to_string();
    for part in [commit, date].into_iter().flatten() {
        if !part.is_empty() {
            out.push('-');
            out.push_str(part);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_version_without_build_info() {
        assert_eq!(build_version("1.0.8", None, None), "1.0.8");
    }

    #[test]
    fn commit_and_date_are_dash_joined() {
        assert_eq!(
            build_version("1.0.8", Some("abc1234"), Some("20231114")),
            "1.0.8-abc1234-20231114"
        );
    }

    #[test]
    fn empty_parts_are_skipped() {
        assert_eq!(build_version("1.0.8", Some(""), Some("20231114")), "1.0.8-20231114");
    }

    #[test]
    fn version_string_starts_with_crate_version() {
        assert!(version_string().starts_with(env!("CARGO_PKG_VERSION")));
    }
}
