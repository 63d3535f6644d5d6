use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Discover markdown files under `dir` whose file name matches `pattern`
/// (default `*.md`), sorted by path.
pub fn discover_files(dir: impl AsRef<Path>, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Err(Error::FileNotFound(dir.to_path_buf()));
    }
    let pattern = glob::Pattern::new(pattern.unwrap_or("*.md"))
        .map_err(|e| Error::InvalidPattern(e.to_string()))?;

    let mut results: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .flatten()
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| pattern.matches(name))
        })
        .map(|entry| entry.into_path())
        .collect();

    results.sort();
    Ok(results)
}

/// Page slug for an exported file: the file stem, slugified.
pub fn page_slug(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let slug = crate::slug::slugify(&stem);
    if slug.is_empty() {
        "page".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("projects")).unwrap();
        std::fs::write(dir.path().join("b.md"), "# B").unwrap();
        std::fs::write(dir.path().join("projects/a.md"), "# A").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip").unwrap();

        let files = discover_files(dir.path(), None).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.extension().unwrap() == "md"));

        let only_b = discover_files(dir.path(), Some("b*.md")).unwrap();
        assert_eq!(only_b.len(), 1);
    }

    #[test]
    fn test_missing_dir() {
        assert!(discover_files("/no/such/dir", None).is_err());
    }

    #[test]
    fn test_page_slug() {
        assert_eq!(page_slug(Path::new("docs/My Project.md")), "my-project");
        assert_eq!(page_slug(Path::new("docs/___.md")), "page");
    }
}
