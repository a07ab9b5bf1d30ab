//! Deterministic remediation branch naming.

/// Prefix carried by every remediation branch, and the salt folded into the
/// branch hash.
pub const BRANCH_PREFIX: &str = "frogbot";

/// Derives the branch name for one fix target.
///
/// The name is `frogbot-<package>-<hash>` where the package name has every
/// `:` (illegal in a ref and common in Maven coordinates) replaced with `_`,
/// and the hash is the MD5 of the prefix, base branch, *original* package
/// name and fix version concatenated. Identical inputs always produce the
/// identical name; fixes for the same package/version on two different base
/// branches never collide on one branch.
pub fn generate_fix_branch_name(
    base_branch: &str,
    impacted_package: &str,
    fix_version: &str,
) -> String {
    let digest = md5::compute(format!(
        "{BRANCH_PREFIX}{base_branch}{impacted_package}{fix_version}"
    ));
    let sanitized = impacted_package.replace(':', "_");
    format!("{BRANCH_PREFIX}-{sanitized}-{digest:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_name_is_reproducible() {
        let first = generate_fix_branch_name("dev", "gopkg.in/yaml.v3", "3.0.0");
        let second = generate_fix_branch_name("dev", "gopkg.in/yaml.v3", "3.0.0");
        assert_eq!(first, second);
        assert_eq!(
            first,
            "frogbot-gopkg.in/yaml.v3-d61bde82dc594e5ccc5a042fe224bf7c"
        );
    }

    #[test]
    fn test_branch_name_depends_on_base_branch() {
        let dev = generate_fix_branch_name("dev", "gopkg.in/yaml.v3", "3.0.0");
        let master = generate_fix_branch_name("master", "gopkg.in/yaml.v3", "3.0.0");
        assert_ne!(dev, master);
        assert_eq!(
            master,
            "frogbot-gopkg.in/yaml.v3-41405528994061bd108e3bbd4c039a03"
        );
    }

    #[test]
    fn test_branch_name_sanitizes_colons_but_hashes_the_original() {
        let name = generate_fix_branch_name("dev", "replace:colons:colons", "3.0.0");
        assert_eq!(
            name,
            "frogbot-replace_colons_colons-89e555131b4a70a32fe9d9c44d6ff0fc"
        );
    }
}
