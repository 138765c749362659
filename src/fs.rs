use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

pub struct IgnoreRules {
    rules: Vec<Rule>,
}

enum Rule {
    Literal(String),
    Wildcard(Pattern),
}

impl IgnoreRules {
    pub fn new(patterns: &[String]) -> Self {
        let rules = patterns
            .iter()
            .map(|raw| {
                if raw.chars().any(|c| matches!(c, '*' | '?' | '[')) {
                    // a malformed glob still has to exclude something, so it
                    // degrades to a literal instead of failing the run
                    match Pattern::new(raw) {
                        Ok(pattern) => Rule::Wildcard(pattern),
                        Err(_) => Rule::Literal(raw.clone()),
                    }
                } else {
                    Rule::Literal(raw.clone())
                }
            })
            .collect();

        Self { rules }
    }

    pub fn is_ignored(&self, rel_path: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(rel_path))
    }
}

impl Rule {
    fn matches(&self, rel_path: &str) -> bool {
        match self {
            Rule::Wildcard(pattern) => {
                let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
                pattern.matches(rel_path) || pattern.matches(name)
            }
            Rule::Literal(rule) => {
                rel_path == rule
                    || rel_path.split('/').any(|segment| segment == rule)
                    || rel_path
                        .strip_prefix(rule.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Entry {
    pub local_source: PathBuf,
    pub remote_path: String,
}

pub struct TransferSet {
    pub entries: Vec<Entry>,
    pub dirs: Vec<String>,
}

pub struct TransferList {
    local_root: PathBuf,
    rules: IgnoreRules,
}

impl TransferList {
    pub fn new(local_root: &Path, rules: IgnoreRules) -> Self {
        Self {
            local_root: local_root.to_path_buf(),
            rules,
        }
    }

    pub fn collect(&self) -> TransferSet {
        let mut entries = Vec::new();
        let mut dirs = BTreeSet::new();

        let walker = WalkDir::new(&self.local_root)
            .follow_links(true)
            .sort_by_file_name();

        for item in walker.into_iter().filter_map(|item| item.ok()) {
            if !item.file_type().is_file() {
                continue;
            }

            let Ok(rel) = item.path().strip_prefix(&self.local_root) else {
                continue;
            };
            let rel = forward_slashes(rel);
            if rel.is_empty() || self.rules.is_ignored(&rel) {
                continue;
            }

            for ancestor in Path::new(&rel).ancestors().skip(1) {
                if !ancestor.as_os_str().is_empty() {
                    dirs.insert(forward_slashes(ancestor));
                }
            }

            entries.push(Entry {
                local_source: item.path().to_path_buf(),
                remote_path: rel,
            });
        }

        // parents strictly before children: depth first, then name
        let mut dirs: Vec<String> = dirs.into_iter().collect();
        dirs.sort_by(|a, b| depth(a).cmp(&depth(b)).then_with(|| a.cmp(b)));

        TransferSet { entries, dirs }
    }
}

fn forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn depth(dir: &str) -> usize {
    dir.matches('/').count()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn rules(patterns: &[&str]) -> IgnoreRules {
        IgnoreRules::new(&patterns.iter().map(|p| p.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn literal_rule_matches_path_segment_anywhere() {
        let rules = rules(&[".git"]);

        assert!(rules.is_ignored(".git"));
        assert!(rules.is_ignored(".git/config"));
        assert!(rules.is_ignored("vendor/.git/HEAD"));
        assert!(!rules.is_ignored(".gitignore"));
        assert!(!rules.is_ignored("docs/git.md"));
    }

    #[test]
    fn literal_rule_with_separator_matches_exact_and_prefix() {
        let rules = rules(&["php/config.php"]);

        assert!(rules.is_ignored("php/config.php"));
        assert!(!rules.is_ignored("php/config.php.bak"));
        assert!(!rules.is_ignored("php/other.php"));
    }

    #[test]
    fn literal_directory_rule_covers_everything_below_it() {
        let rules = rules(&["src"]);

        assert!(rules.is_ignored("src"));
        assert!(rules.is_ignored("src/a/b.ts"));
        assert!(!rules.is_ignored("srcs/a.ts"));
    }

    #[test]
    fn wildcard_rule_matches_full_path_or_basename() {
        let rules = rules(&["*.tsbuildinfo", "package*.json"]);

        assert!(rules.is_ignored("x.tsbuildinfo"));
        assert!(rules.is_ignored("a/b/x.tsbuildinfo"));
        assert!(rules.is_ignored("package.json"));
        assert!(rules.is_ignored("package-lock.json"));
        assert!(rules.is_ignored("web/package.json"));
        assert!(!rules.is_ignored("package.js"));
    }

    #[test]
    fn unmatched_paths_are_included_by_default() {
        let rules = rules(&[".git", "*.log"]);

        assert!(!rules.is_ignored("index.html"));
        assert!(!rules.is_ignored("a/b/c.txt"));
    }

    #[test]
    fn malformed_glob_degrades_to_literal() {
        let rules = rules(&["["]);

        assert!(rules.is_ignored("["));
        assert!(rules.is_ignored("[/nested.txt"));
        assert!(!rules.is_ignored("a.txt"));
    }

    #[test]
    fn collect_filters_files_and_gathers_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("b/c.txt"), "c").unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/config"), "x").unwrap();

        let list = TransferList::new(dir.path(), rules(&[".git"]));
        let set = list.collect();

        let paths: Vec<_> = set.entries.iter().map(|e| e.remote_path.as_str()).collect();
        assert_eq!(paths, vec!["a.txt", "b/c.txt"]);
        assert_eq!(set.dirs, vec!["b".to_string()]);
    }

    #[test]
    fn dirs_are_ordered_parents_before_children() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("x/y/z")).unwrap();
        fs::write(dir.path().join("x/y/z/deep.txt"), "d").unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a/top.txt"), "t").unwrap();

        let list = TransferList::new(dir.path(), rules(&[]));
        let set = list.collect();

        assert_eq!(
            set.dirs,
            vec![
                "a".to_string(),
                "x".to_string(),
                "x/y".to_string(),
                "x/y/z".to_string(),
            ]
        );
    }

    #[test]
    fn fully_ignored_tree_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "x").unwrap();

        let list = TransferList::new(dir.path(), rules(&["node_modules"]));
        let set = list.collect();

        assert!(set.entries.is_empty());
        assert!(set.dirs.is_empty());
    }
}
