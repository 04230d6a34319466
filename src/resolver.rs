//! PSR-4 resolution between files and namespaces
//!
//! The two directions deliberately use different match policies:
//!
//! - path -> namespace: the first mapping (primary before dev) whose directory
//!   is a string prefix of the file path wins.
//! - namespace -> path: every matching primary mapping overwrites the result,
//!   so the last one wins. A matching dev mapping then takes over when no
//!   primary mapping matched, or when the winning primary prefix occurs inside
//!   the dev prefix (e.g. `App\` inside `App\Tests\`).
//!
//! Because of this, resolving a namespace back to a path does not always
//! return the directory the namespace came from.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use tracing::debug;

use crate::config::NAMESPACE_SEPARATOR;
use crate::error::{ResolveError, Result};
use crate::mapping::{MappingTables, NamespaceMapping};

// ============================================================================
// PART 1: Path -> Namespace
// ============================================================================

/// Generate the namespace for a file or directory
///
/// For a file, the source extension is dropped so the result is the
/// fully qualified class name: `src/Models/User.php` -> `App\Models\User`.
pub fn namespace_from_path(path: &Path, tables: &MappingTables, source_extension: &str) -> Result<String> {
    let not_found = || ResolveError::NamespaceNotFound {
        path: path.to_path_buf(),
    };

    let canonical = path.canonicalize().map_err(|_| not_found())?;
    let is_file = canonical.is_file();
    let canonical = canonical.to_string_lossy();

    let (mapping, suffix) = first_owner(&tables.primary, &canonical)
        .or_else(|| first_owner(&tables.dev, &canonical))
        .ok_or_else(not_found)?;

    let suffix = if is_file {
        strip_source_extension(suffix, source_extension)
    } else {
        suffix
    };

    let namespace = format!("{}{}", mapping.prefix(), suffix.replace(['/', MAIN_SEPARATOR], "\\"));
    let namespace = namespace.replace("\\\\", "\\");
    let namespace = namespace.trim_end_matches(NAMESPACE_SEPARATOR).to_string();

    debug!("{} belongs to '{}' via '{}'", canonical, namespace, mapping.prefix());
    Ok(namespace)
}

/// First mapping whose directory is a literal prefix of `path`, plus the rest of the path
fn first_owner<'a, 'p>(mappings: &'a [NamespaceMapping], path: &'p str) -> Option<(&'a NamespaceMapping, &'p str)> {
    mappings.iter().find_map(|mapping| {
        let directory = mapping.directory().to_string_lossy();
        path.strip_prefix(&*directory).map(|rest| (mapping, rest))
    })
}

fn strip_source_extension<'a>(suffix: &'a str, extension: &str) -> &'a str {
    if extension.is_empty() {
        return suffix;
    }
    suffix
        .strip_suffix(extension)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(suffix)
}

// ============================================================================
// PART 2: Namespace -> Path
// ============================================================================

/// Generate the directory a namespace lives in
///
/// Returns None when no mapping matches. To get a class file path instead,
/// use [`path_from_fqn`].
pub fn path_from_namespace(namespace: &str, tables: &MappingTables) -> Option<PathBuf> {
    let mut result = None;
    let mut last_primary = "";

    for mapping in &tables.primary {
        if let Some(rest) = namespace.strip_prefix(mapping.prefix()) {
            result = Some(join_namespace(mapping.directory(), rest));
            last_primary = mapping.prefix();
        }
    }

    for mapping in &tables.dev {
        if let Some(rest) = namespace.strip_prefix(mapping.prefix()) {
            // Dev wins outright when primary had nothing, otherwise only
            // when the primary prefix is contained in the dev prefix
            if last_primary.is_empty() || mapping.prefix().contains(last_primary) {
                result = Some(join_namespace(mapping.directory(), rest));
            } else {
                debug!(
                    "Keeping primary '{}' over dev '{}' for {}",
                    last_primary,
                    mapping.prefix(),
                    namespace
                );
            }
        }
    }

    result
}

fn join_namespace(directory: &Path, relative_namespace: &str) -> PathBuf {
    relative_namespace
        .split(NAMESPACE_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .fold(directory.to_path_buf(), |path, segment| path.join(segment))
}

/// Generate the file path for a fully qualified class, interface or trait name
pub fn path_from_fqn(fqn: &str, tables: &MappingTables, source_extension: &str) -> Option<PathBuf> {
    path_from_namespace(fqn, tables).map(|directory| {
        let mut file = directory.into_os_string();
        file.push(".");
        file.push(source_extension);
        PathBuf::from(file)
    })
}

/// Check whether the file for a fully qualified name exists
pub fn file_with_fqn_exists(fqn: &str, tables: &MappingTables, source_extension: &str) -> bool {
    path_from_fqn(fqn, tables, source_extension).is_some_and(|file| file.is_file())
}

// ============================================================================
// PART 3: Base and test namespaces
// ============================================================================

/// Longest declared prefix of `namespace_or_fqn`, or an empty string
pub fn base_namespace<'a>(namespace_or_fqn: &str, mappings: impl IntoIterator<Item = &'a NamespaceMapping>) -> String {
    let mut result = "";

    for mapping in mappings {
        let prefix = mapping.prefix();
        if namespace_or_fqn.starts_with(prefix) && prefix.len() >= result.len() {
            result = prefix;
        }
    }

    result.to_string()
}

/// Generate the test namespace for a component
///
/// `App\Domain\User` with base `App\` and marker `Tests` becomes
/// `App\Tests\Domain\User`. Without a base namespace the input is returned as is.
pub fn test_namespace(component_fqn: &str, tables: &MappingTables, marker: &str) -> String {
    let base = base_namespace(component_fqn, tables.combined());
    if base.is_empty() {
        return component_fqn.to_string();
    }

    let test_base = format!("{}{}{}", base, marker, NAMESPACE_SEPARATOR);
    component_fqn.replacen(&base, &test_base, 1)
}

// ============================================================================
// PART 4: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Project with src/, tests/ and lib/ on disk
    fn fixture() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        for dir in ["src/Models", "src/Tests", "tests/Unit", "lib"] {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
        }
        let root = temp.path().canonicalize().unwrap();
        (temp, root)
    }

    fn mapping(prefix: &str, dir: &Path) -> NamespaceMapping {
        NamespaceMapping::new(prefix, dir)
    }

    #[test]
    fn test_namespace_from_file() {
        let (_temp, root) = fixture();
        fs::write(root.join("src/Models/User.php"), "<?php").unwrap();
        let tables = MappingTables::new(vec![mapping("App\\", &root.join("src"))], vec![]);

        let ns = namespace_from_path(&root.join("src/Models/User.php"), &tables, "php").unwrap();
        assert_eq!(ns, "App\\Models\\User");
    }

    #[test]
    fn test_namespace_from_directory() {
        let (_temp, root) = fixture();
        let tables = MappingTables::new(vec![mapping("App\\", &root.join("src"))], vec![]);

        assert_eq!(namespace_from_path(&root.join("src/Models"), &tables, "php").unwrap(), "App\\Models");
        // The mapped directory itself is the prefix without its trailing separator
        assert_eq!(namespace_from_path(&root.join("src"), &tables, "php").unwrap(), "App");
    }

    #[test]
    fn test_namespace_primary_before_dev() {
        let (_temp, root) = fixture();
        let tables = MappingTables::new(
            vec![mapping("App\\", &root.join("src"))],
            vec![mapping("Dev\\", &root.join("src"))],
        );

        assert_eq!(namespace_from_path(&root.join("src/Models"), &tables, "php").unwrap(), "App\\Models");
    }

    #[test]
    fn test_namespace_first_match_not_most_specific() {
        let (_temp, root) = fixture();
        let tables = MappingTables::new(
            vec![
                mapping("App\\", &root.join("src")),
                mapping("Models\\", &root.join("src/Models")),
            ],
            vec![],
        );

        assert_eq!(namespace_from_path(&root.join("src/Models"), &tables, "php").unwrap(), "App\\Models");
    }

    #[test]
    fn test_namespace_falls_back_to_dev() {
        let (_temp, root) = fixture();
        let tables = MappingTables::new(
            vec![mapping("App\\", &root.join("src"))],
            vec![mapping("App\\Tests\\", &root.join("tests"))],
        );

        assert_eq!(
            namespace_from_path(&root.join("tests/Unit"), &tables, "php").unwrap(),
            "App\\Tests\\Unit"
        );
    }

    #[test]
    fn test_namespace_not_found() {
        let (_temp, root) = fixture();
        let tables = MappingTables::new(vec![mapping("App\\", &root.join("src"))], vec![]);

        let err = namespace_from_path(&root.join("lib"), &tables, "php").unwrap_err();
        assert!(err.to_string().contains("lib"));

        // Paths that don't exist can't be canonicalized and belong nowhere
        assert!(namespace_from_path(&root.join("src/Nope.php"), &tables, "php").is_err());
    }

    #[test]
    fn test_namespace_prefix_without_trailing_separator() {
        let (_temp, root) = fixture();
        let tables = MappingTables::new(vec![mapping("App", &root.join("src"))], vec![]);

        assert_eq!(namespace_from_path(&root.join("src/Models"), &tables, "php").unwrap(), "App\\Models");
    }

    #[test]
    fn test_path_last_primary_match_wins() {
        let (_temp, root) = fixture();
        let tables = MappingTables::new(
            vec![
                mapping("App\\Models\\", &root.join("lib")),
                mapping("App\\", &root.join("src")),
            ],
            vec![],
        );

        // Declared later, shorter, still wins
        assert_eq!(
            path_from_namespace("App\\Models\\User", &tables),
            Some(root.join("src/Models/User"))
        );
    }

    #[test]
    fn test_path_dev_only_match() {
        let (_temp, root) = fixture();
        let tables = MappingTables::new(
            vec![mapping("App\\", &root.join("src"))],
            vec![mapping("Tests\\", &root.join("tests"))],
        );

        assert_eq!(path_from_namespace("Tests\\Unit", &tables), Some(root.join("tests/Unit")));
    }

    #[test]
    fn test_path_dev_overrides_when_primary_prefix_is_contained() {
        let (_temp, root) = fixture();
        let tables = MappingTables::new(
            vec![mapping("App\\", &root.join("src"))],
            vec![mapping("App\\Tests\\", &root.join("tests"))],
        );

        assert_eq!(path_from_namespace("App\\Tests\\Unit", &tables), Some(root.join("tests/Unit")));
    }

    #[test]
    fn test_path_dev_ignored_when_unrelated() {
        let (_temp, root) = fixture();
        // Dev prefix "Acme\\" is also a prefix of "Acme\\Billing\\X" but doesn't contain "Acme\\Billing\\"
        let tables = MappingTables::new(
            vec![mapping("Acme\\Billing\\", &root.join("src"))],
            vec![mapping("Acme\\", &root.join("tests"))],
        );

        assert_eq!(path_from_namespace("Acme\\Billing\\Invoice", &tables), Some(root.join("src/Invoice")));
    }

    #[test]
    fn test_path_dev_substring_not_hierarchy() {
        let (_temp, root) = fixture();
        // "App" is a substring of "Application\" without being its parent namespace
        let tables = MappingTables::new(
            vec![mapping("App", &root.join("src"))],
            vec![mapping("Application\\", &root.join("tests"))],
        );

        assert_eq!(path_from_namespace("Application\\Thing", &tables), Some(root.join("tests/Thing")));
    }

    #[test]
    fn test_path_same_prefix_in_both_groups_prefers_dev() {
        let (_temp, root) = fixture();
        let tables = MappingTables::new(
            vec![mapping("App\\", &root.join("src"))],
            vec![mapping("App\\", &root.join("tests"))],
        );

        assert_eq!(path_from_namespace("App\\Unit", &tables), Some(root.join("tests/Unit")));
    }

    #[test]
    fn test_path_no_match() {
        let (_temp, root) = fixture();
        let tables = MappingTables::new(vec![mapping("App\\", &root.join("src"))], vec![]);

        assert_eq!(path_from_namespace("Other\\Thing", &tables), None);
        assert_eq!(path_from_fqn("Other\\Thing", &tables, "php"), None);
    }

    #[test]
    fn test_path_from_fqn_and_existence() {
        let (_temp, root) = fixture();
        fs::write(root.join("src/Models/User.php"), "<?php").unwrap();
        let tables = MappingTables::new(vec![mapping("App\\", &root.join("src"))], vec![]);

        assert_eq!(
            path_from_fqn("App\\Models\\User", &tables, "php"),
            Some(root.join("src/Models/User.php"))
        );
        assert!(file_with_fqn_exists("App\\Models\\User", &tables, "php"));
        assert!(!file_with_fqn_exists("App\\Models\\Post", &tables, "php"));
        // A directory is not a class file
        fs::create_dir_all(root.join("src/Models/Dir.php")).unwrap();
        assert!(!file_with_fqn_exists("App\\Models\\Dir", &tables, "php"));
    }

    #[test]
    fn test_base_namespace_longest_regardless_of_order() {
        let (_temp, root) = fixture();
        let long_first = vec![
            mapping("App\\Domain\\", &root.join("lib")),
            mapping("App\\", &root.join("src")),
        ];
        let short_first = vec![
            mapping("App\\", &root.join("src")),
            mapping("App\\Domain\\", &root.join("lib")),
        ];

        assert_eq!(base_namespace("App\\Domain\\User", &long_first), "App\\Domain\\");
        assert_eq!(base_namespace("App\\Domain\\User", &short_first), "App\\Domain\\");
        assert_eq!(base_namespace("Other\\User", &short_first), "");
    }

    #[test]
    fn test_base_namespace_spans_both_groups() {
        let (_temp, root) = fixture();
        let tables = MappingTables::new(
            vec![mapping("App\\", &root.join("src"))],
            vec![mapping("App\\Tests\\", &root.join("tests"))],
        );

        assert_eq!(base_namespace("App\\Tests\\Unit\\X", tables.combined()), "App\\Tests\\");
    }

    #[test]
    fn test_test_namespace() {
        let (_temp, root) = fixture();
        let tables = MappingTables::new(vec![mapping("App\\", &root.join("src"))], vec![]);

        assert_eq!(test_namespace("App\\Domain\\User", &tables, "Tests"), "App\\Tests\\Domain\\User");
        assert_eq!(test_namespace("App\\Domain\\User", &tables, "Unit"), "App\\Unit\\Domain\\User");
        assert_eq!(test_namespace("Other\\User", &tables, "Tests"), "Other\\User");
    }

    #[test]
    fn test_test_namespace_replaces_first_occurrence_only() {
        let (_temp, root) = fixture();
        let tables = MappingTables::new(vec![mapping("App\\", &root.join("src"))], vec![]);

        assert_eq!(
            test_namespace("App\\Legacy\\App\\User", &tables, "Tests"),
            "App\\Tests\\Legacy\\App\\User"
        );

        let once = test_namespace("App\\Domain\\User", &tables, "Tests");
        let twice = test_namespace(&once, &tables, "Tests");
        assert_eq!(twice, "App\\Tests\\Tests\\Domain\\User");
        assert_eq!(twice.matches("Tests").count(), 2);
    }
}
