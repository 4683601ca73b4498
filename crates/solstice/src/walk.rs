//! Source file discovery.
//!
//! Walks directories gitignore-aware, keeps `.sol` files, and applies the
//! resolved config's `files`/`excludedFiles` predicates. Explicitly named
//! files are taken as-is (still subject to the config predicates).

use solstice_engine::ResolvedConfig;
use std::path::{Path, PathBuf};

/// Collect the Solidity files to analyze from a mix of files and
/// directories. Output is sorted for reproducible runs.
pub fn collect_sources(paths: &[PathBuf], config: &ResolvedConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_solidity(path) && config.selects(path) {
                files.push(path.clone());
            }
            continue;
        }

        let walker = ignore::WalkBuilder::new(path)
            .hidden(false)
            .git_ignore(true)
            .build();
        for entry in walker.flatten() {
            let candidate = entry.path();
            if candidate.is_file() && is_solidity(candidate) && config.selects(candidate) {
                files.push(candidate.to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

fn is_solidity(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "sol")
}

#[cfg(test)]
mod tests {
    use super::*;
    use solstice_engine::{Config, PresetCatalog, RuleRegistry, resolve};

    fn empty_config(base: &Path) -> ResolvedConfig {
        resolve(
            &Config::default(),
            &PresetCatalog::new(),
            &RuleRegistry::new(),
            base,
        )
        .unwrap()
        .config
    }

    #[test]
    fn finds_sol_files_and_skips_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("contracts")).unwrap();
        std::fs::write(dir.path().join("contracts/A.sol"), "contract A {}").unwrap();
        std::fs::write(dir.path().join("contracts/notes.md"), "# notes").unwrap();
        std::fs::write(dir.path().join("B.sol"), "contract B {}").unwrap();

        let config = empty_config(dir.path());
        let files = collect_sources(&[dir.path().to_path_buf()], &config);

        let mut names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["A.sol", "B.sol"]);
    }

    #[test]
    fn excluded_files_globs_apply() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("mock")).unwrap();
        std::fs::write(dir.path().join("Token.sol"), "contract T {}").unwrap();
        std::fs::write(dir.path().join("mock/Fake.sol"), "contract F {}").unwrap();

        let mut user = Config::default();
        user.excluded_files = Some(vec!["mock/**".to_string()]);
        let config = resolve(
            &user,
            &PresetCatalog::new(),
            &RuleRegistry::new(),
            dir.path(),
        )
        .unwrap()
        .config;

        let files = collect_sources(&[dir.path().to_path_buf()], &config);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("Token.sol"));
    }
}
