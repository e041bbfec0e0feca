//! Semantic version bumping for rebuilt procedures

const FALLBACK: &str = "1.0.1";

/// Increment the patch component of `major.minor.patch`
///
/// Anything that is not three dot-separated integers yields `1.0.1`.
#[must_use]
pub fn bump_patch(version: &str) -> String {
    let parts: Vec<&str> = version.trim().split('.').collect();
    let [major, minor, patch] = parts.as_slice() else {
        return FALLBACK.to_string();
    };

    match (major.parse::<u64>(), minor.parse::<u64>(), patch.parse::<u64>()) {
        (Ok(major), Ok(minor), Ok(patch)) => match patch.checked_add(1) {
            Some(next) => format!("{major}.{minor}.{next}"),
            None => FALLBACK.to_string(),
        },
        _ => FALLBACK.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bumps_patch() {
        assert_eq!(bump_patch("1.0.0"), "1.0.1");
        assert_eq!(bump_patch("2.3.9"), "2.3.10");
    }

    #[test]
    fn malformed_falls_back() {
        assert_eq!(bump_patch(""), "1.0.1");
        assert_eq!(bump_patch("1.0"), "1.0.1");
        assert_eq!(bump_patch("v1.0.0"), "1.0.1");
        assert_eq!(bump_patch("1.0.0.0"), "1.0.1");
    }

    proptest! {
        #[test]
        fn keeps_major_and_minor(major in 0u32..1000, minor in 0u32..1000, patch in 0u32..100_000) {
            let bumped = bump_patch(&format!("{major}.{minor}.{patch}"));
            prop_assert_eq!(bumped, format!("{major}.{minor}.{}", patch + 1));
        }
    }
}
