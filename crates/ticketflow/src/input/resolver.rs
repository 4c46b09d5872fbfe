//! Mapping raw file names to logical table names.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// File extensions treated as delimited tables.
pub const TABLE_EXTENSIONS: &[&str] = &["csv", "tsv"];

/// A way of naming the file that holds a logical table.
pub trait NamingStrategy: fmt::Debug + Send + Sync {
    /// Short label used in reports.
    fn label(&self) -> String;

    /// File stem this strategy expects for `table`.
    fn file_stem(&self, table: &str) -> String;

    /// Logical table a file stem refers to, if this strategy applies.
    fn table_name(&self, stem: &str) -> Option<String>;
}

/// `orders.csv` holds table `orders`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalName;

impl NamingStrategy for CanonicalName {
    fn label(&self) -> String {
        "canonical".to_string()
    }

    fn file_stem(&self, table: &str) -> String {
        table.to_string()
    }

    fn table_name(&self, stem: &str) -> Option<String> {
        Some(stem.to_string())
    }
}

/// `raw_orders.csv` holds table `orders`.
#[derive(Debug, Clone)]
pub struct PrefixedName {
    prefix: String,
}

impl PrefixedName {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl NamingStrategy for PrefixedName {
    fn label(&self) -> String {
        format!("prefixed:{}", self.prefix)
    }

    fn file_stem(&self, table: &str) -> String {
        format!("{}{}", self.prefix, table)
    }

    fn table_name(&self, stem: &str) -> Option<String> {
        stem.strip_prefix(&self.prefix)
            .filter(|rest| !rest.is_empty())
            .map(str::to_string)
    }
}

/// A logical table and the file chosen for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSource {
    /// Logical table name.
    pub table: String,
    /// Selected file.
    pub path: PathBuf,
    /// Label of the strategy that matched the selected file.
    pub strategy: String,
    /// Other files naming the same table, in priority order.
    pub shadowed: Vec<PathBuf>,
}

/// Resolves raw files to logical tables using strategies in priority order.
///
/// When several files name the same table, the file matched by the
/// earliest strategy wins; the rest are reported as shadowed.
#[derive(Debug)]
pub struct SourceResolver {
    strategies: Vec<Box<dyn NamingStrategy>>,
}

impl SourceResolver {
    /// Create a resolver from explicit strategies.
    pub fn new(strategies: Vec<Box<dyn NamingStrategy>>) -> Self {
        Self { strategies }
    }

    /// Canonical names first, then each prefix in the given order.
    pub fn with_prefixes<S: AsRef<str>>(prefixes: &[S]) -> Self {
        let mut strategies: Vec<Box<dyn NamingStrategy>> = vec![Box::new(CanonicalName)];
        for prefix in prefixes {
            strategies.push(Box::new(PrefixedName::new(prefix.as_ref())));
        }
        Self::new(strategies)
    }

    /// The logical table a file stem refers to.
    ///
    /// Every matching strategy proposes a name and the most reduced one wins,
    /// so `raw_orders` maps to `orders` rather than to itself.
    pub fn table_name(&self, stem: &str) -> Option<String> {
        self.strategies
            .iter()
            .filter_map(|s| s.table_name(stem))
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
    }

    /// Resolve a set of file paths into logical tables, sorted by table name.
    pub fn resolve(&self, files: &[PathBuf]) -> Vec<ResolvedSource> {
        // stem -> paths (several extensions may share a stem)
        let mut by_stem: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for path in files {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                by_stem.entry(stem.to_string()).or_default().push(path.clone());
            }
        }
        for paths in by_stem.values_mut() {
            paths.sort();
        }

        let mut tables: Vec<String> = by_stem
            .keys()
            .filter_map(|stem| self.table_name(stem))
            .collect();
        tables.sort();
        tables.dedup();

        let mut resolved = Vec::new();
        for table in tables {
            let mut candidates: Vec<(String, PathBuf)> = Vec::new();
            for strategy in &self.strategies {
                let stem = strategy.file_stem(&table);
                if self.table_name(&stem).as_deref() != Some(table.as_str()) {
                    continue;
                }
                if let Some(paths) = by_stem.get(&stem) {
                    for path in paths {
                        if !candidates.iter().any(|(_, p)| p == path) {
                            candidates.push((strategy.label(), path.clone()));
                        }
                    }
                }
            }

            let mut iter = candidates.into_iter();
            if let Some((strategy, path)) = iter.next() {
                resolved.push(ResolvedSource {
                    table,
                    path,
                    strategy,
                    shadowed: iter.map(|(_, p)| p).collect(),
                });
            }
        }

        resolved
    }

    /// List table files in a directory and resolve them.
    pub fn discover(&self, dir: &Path) -> Result<Vec<ResolvedSource>> {
        let entries = fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PipelineError::io(dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_table = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| TABLE_EXTENSIONS.iter().any(|t| e.eq_ignore_ascii_case(t)))
                .unwrap_or(false);
            if is_table {
                files.push(path);
            }
        }

        Ok(self.resolve(&files))
    }
}

impl Default for SourceResolver {
    fn default() -> Self {
        Self::with_prefixes(&["raw_"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from("raw").join(n)).collect()
    }

    #[test]
    fn test_table_name() {
        let resolver = SourceResolver::default();
        assert_eq!(resolver.table_name("orders").as_deref(), Some("orders"));
        assert_eq!(resolver.table_name("raw_orders").as_deref(), Some("orders"));
        assert_eq!(resolver.table_name("raw_").as_deref(), Some("raw_"));
    }

    #[test]
    fn test_prefers_canonical_name() {
        let resolver = SourceResolver::default();
        let resolved = resolver.resolve(&paths(&["raw_orders.csv", "orders.csv"]));

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].table, "orders");
        assert_eq!(resolved[0].path, PathBuf::from("raw/orders.csv"));
        assert_eq!(resolved[0].strategy, "canonical");
        assert_eq!(resolved[0].shadowed, vec![PathBuf::from("raw/raw_orders.csv")]);
    }

    #[test]
    fn test_prefixed_only() {
        let resolver = SourceResolver::default();
        let resolved = resolver.resolve(&paths(&["raw_customers.csv", "stores.csv"]));

        let tables: Vec<_> = resolved.iter().map(|r| r.table.as_str()).collect();
        assert_eq!(tables, vec!["customers", "stores"]);
        assert_eq!(resolved[0].strategy, "prefixed:raw_");
        assert!(resolved[0].shadowed.is_empty());
    }

    #[test]
    fn test_prefix_priority_order() {
        let resolver = SourceResolver::with_prefixes(&["raw_", "src_"]);
        let resolved = resolver.resolve(&paths(&["src_items.csv", "raw_items.csv"]));

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].path, PathBuf::from("raw/raw_items.csv"));
        assert_eq!(resolved[0].shadowed, vec![PathBuf::from("raw/src_items.csv")]);
    }

    #[test]
    fn test_discover_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("orders.csv"), "id\n1\n").unwrap();
        fs::write(dir.path().join("raw_orders.csv"), "id\n1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::write(dir.path().join("supplies.TSV"), "id\n1\n").unwrap();

        let resolved = SourceResolver::default().discover(dir.path()).unwrap();
        let tables: Vec<_> = resolved.iter().map(|r| r.table.as_str()).collect();
        assert_eq!(tables, vec!["orders", "supplies"]);
    }

    #[test]
    fn test_discover_missing_dir_is_io_error() {
        let err = SourceResolver::default()
            .discover(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
