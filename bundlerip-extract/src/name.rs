//! Asset name resolution
//!
//! Derives a filesystem-safe output name for every asset. The resolver
//! is total: whatever the field tree looks like (including all-empty),
//! it terminates with a non-empty sanitized name, de-duplicated
//! against names already assigned in the same output subdirectory.

use bundlerip_core::{Asset, AssetKind, Bundle, FieldValue};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Characters illegal in file names, plus control characters
static ILLEGAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).expect("valid pattern"));

/// Keeps resolved names well under common path-length limits
const MAX_NAME_LEN: usize = 120;

/// Resolves and de-duplicates asset names for one session
#[derive(Debug, Default)]
pub struct NameResolver {
    // directory name -> lowercased assigned name -> highest suffix used
    assigned: HashMap<String, HashMap<String, usize>>,
}

impl NameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the output name for an asset
    ///
    /// Candidate order: the asset's own name fields, its class/script
    /// name field, the header name hint, the owning GameObject's name,
    /// then a synthetic `<Kind>_<path_id>`.
    pub fn resolve(&mut self, asset: &Asset, bundle: &Bundle) -> String {
        let raw = candidate(asset, bundle);
        let mut name = sanitize(&raw);
        if name.is_empty() {
            name = format!("Unnamed_{}", asset.path_id);
        }
        self.dedup(asset.kind.name(), name)
    }

    fn dedup(&mut self, dir: &str, name: String) -> String {
        let used = self.assigned.entry(dir.to_string()).or_default();
        let key = name.to_ascii_lowercase();
        if !used.contains_key(&key) {
            used.insert(key, 0);
            return name;
        }
        let mut n = used.get(&key).copied().unwrap_or(0);
        loop {
            n += 1;
            let candidate = format!("{}_{}", name, n);
            let candidate_key = candidate.to_ascii_lowercase();
            if !used.contains_key(&candidate_key) {
                used.insert(candidate_key, 0);
                used.insert(key, n);
                return candidate;
            }
        }
    }
}

fn candidate(asset: &Asset, bundle: &Bundle) -> String {
    for field in ["m_Name", "name"] {
        if let Some(name) = string_field(asset, field) {
            return name;
        }
    }
    if asset.kind == AssetKind::MonoScript {
        if let Some(name) = string_field(asset, "m_ClassName") {
            return name;
        }
    }
    if let Some(hint) = asset.name_hint() {
        let hint = hint.trim();
        if !hint.is_empty() {
            return hint.to_string();
        }
    }
    if let Some(owner_id) = asset.owner() {
        if let Some(owner) = bundle.find(owner_id) {
            if let Some(name) = string_field(owner, "m_Name") {
                return name;
            }
            if let Some(hint) = owner.name_hint() {
                let hint = hint.trim();
                if !hint.is_empty() {
                    return hint.to_string();
                }
            }
        }
    }
    format!("{}_{}", asset.kind.name(), asset.path_id)
}

fn string_field(asset: &Asset, field: &str) -> Option<String> {
    match asset.field(field)? {
        FieldValue::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        // Name fields occasionally arrive as raw bytes; decode with
        // substitution rather than failing.
        FieldValue::Bytes(b) => {
            let s = String::from_utf8_lossy(b);
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        _ => None,
    }
}

/// Strip illegal characters, collapse whitespace, bound the length
pub fn sanitize(raw: &str) -> String {
    let replaced = ILLEGAL.replace_all(raw, "_");
    let collapsed: String = replaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let trimmed = collapsed.trim_matches(['_', '.']);
    trimmed.chars().take(MAX_NAME_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundlerip_core::FieldTree;

    fn named_asset(path_id: i64, kind: AssetKind, name: &str) -> Asset {
        let mut tree = FieldTree::new();
        tree.insert("m_Name".to_string(), name.into());
        Asset::new(path_id, kind).with_fields(tree)
    }

    #[test]
    fn test_sanitize_illegal_chars() {
        assert_eq!(sanitize("ui/icons:main*"), "ui_icons_main");
        assert_eq!(sanitize("  spaced   name  "), "spaced_name");
        assert_eq!(sanitize("<||>"), "");
    }

    #[test]
    fn test_sanitize_bounds_length() {
        let long = "x".repeat(500);
        assert_eq!(sanitize(&long).len(), 120);
    }

    #[test]
    fn test_resolver_is_total() {
        let bundle = Bundle::new("2021.3.0f1", "Android");
        let mut resolver = NameResolver::new();

        // no fields at all
        let name = resolver.resolve(&Asset::new(42, AssetKind::Mesh), &bundle);
        assert_eq!(name, "Mesh_42");

        // name sanitizes to nothing
        let asset = named_asset(43, AssetKind::Mesh, "<*>");
        let name = resolver.resolve(&asset, &bundle);
        assert_eq!(name, "Unnamed_43");
    }

    #[test]
    fn test_dedup_suffixing() {
        let bundle = Bundle::new("2021.3.0f1", "Android");
        let mut resolver = NameResolver::new();

        let a = resolver.resolve(&named_asset(1, AssetKind::TextAsset, "hello"), &bundle);
        let b = resolver.resolve(&named_asset(2, AssetKind::TextAsset, "hello"), &bundle);
        let c = resolver.resolve(&named_asset(3, AssetKind::TextAsset, "HELLO"), &bundle);
        assert_eq!(a, "hello");
        assert_eq!(b, "hello_1");
        assert_eq!(c, "HELLO_2");

        // same name, different type directory: no suffix needed
        let d = resolver.resolve(&named_asset(4, AssetKind::Shader, "hello"), &bundle);
        assert_eq!(d, "hello");
    }

    #[test]
    fn test_owner_name_fallback() {
        let mut bundle = Bundle::new("2021.3.0f1", "Android");
        bundle.push(named_asset(10, AssetKind::GameObject, "Player"));
        bundle.push(Asset::new(11, AssetKind::Transform).with_owner(10));

        let mut resolver = NameResolver::new();
        let name = resolver.resolve(bundle.find(11).unwrap(), &bundle);
        assert_eq!(name, "Player");
    }

    #[test]
    fn test_monoscript_class_name() {
        let bundle = Bundle::new("2021.3.0f1", "Android");
        let mut tree = FieldTree::new();
        tree.insert("m_ClassName".to_string(), "EnemyAI".into());
        let asset = Asset::new(5, AssetKind::MonoScript).with_fields(tree);

        let mut resolver = NameResolver::new();
        assert_eq!(resolver.resolve(&asset, &bundle), "EnemyAI");
    }
}
