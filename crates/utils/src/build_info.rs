/// Git facts captured by the build script. Missing when building outside a checkout.
pub(crate) struct BuildInfo {
    pub(crate) commit_sha1: Option<&'static str>,
    pub(crate) git_dirty: bool,
}

impl BuildInfo {
    pub(crate) fn current() -> Self {
        Self {
            commit_sha1: option_env!("VERGEN_GIT_SHA"),
            git_dirty: is_dirty(option_env!("VERGEN_GIT_DIRTY")),
        }
    }
}

fn is_dirty(flag: Option<&str>) -> bool {
    flag == Some("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirty_flag_is_only_set_by_true() {
        assert!(is_dirty(Some("true")));
        assert!(!is_dirty(Some("false")));
        assert!(!is_dirty(None));
    }
}
