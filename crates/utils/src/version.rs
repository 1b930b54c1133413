use std::sync::LazyLock;

use crate::build_info::BuildInfo;

/// Defines the application version.
pub static VERSION: LazyLock<String> = LazyLock::new(|| {
    let build_info = BuildInfo::current();
    format!(
        "{}-{}{}",
        env!("IMAGE_VERSION"),
        short_sha(build_info.commit_sha1.unwrap_or("unknown")),
        if build_info.git_dirty { "-dirty" } else { "" }
    )
});

fn short_sha(sha: &str) -> &str {
    sha.get(..8).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn version_starts_with_image_version() {
        assert!(VERSION.starts_with(env!("IMAGE_VERSION")));
    }

    #[test]
    fn short_sha_truncates_long_hashes_only() {
        assert_eq!(short_sha("0123456789abcdef"), "01234567");
        assert_eq!(short_sha("abc"), "abc");
        assert_eq!(short_sha("unknown"), "unknown");
    }
}
