//! The category → route lookup table.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, trace};

use crate::NavigationConfig;

/// Why a catalog was refused at load time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog category with an empty name")]
    EmptyName,

    #[error("category '{0}' is declared more than once")]
    DuplicateCategory(String),

    #[error("route '{route}' for '{category}' must start with '/'")]
    BadRoute { category: String, route: String },

    #[error("sub-item '{code}' is declared more than once in '{category}'")]
    DuplicateSubItem { category: String, code: String },
}

// ---------------------------------------------------------------------------
// CategoryEntry
// ---------------------------------------------------------------------------

/// One selectable category of the dashboard.
///
/// A category with at least one sub-item is *expandable*: selecting it
/// navigates to its selected sub-items, never to the category itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    name: String,
    route: Option<String>,
    sub_items: Vec<(String, String)>,
}

impl CategoryEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            route: None,
            sub_items: Vec::new(),
        }
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn with_sub_item(mut self, code: impl Into<String>, route: impl Into<String>) -> Self {
        self.sub_items.push((code.into(), route.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The route for the category itself: the declared one, or
    /// `/<lowercased name>`.
    pub fn route(&self) -> String {
        self.route
            .clone()
            .unwrap_or_else(|| fallback_route(&self.name))
    }

    pub fn is_expandable(&self) -> bool {
        !self.sub_items.is_empty()
    }

    /// Route for a sub-item code. Exact, case-sensitive match.
    pub fn sub_item_route(&self, code: &str) -> Option<&str> {
        self.sub_items
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, route)| route.as_str())
    }

    /// Declared sub-items as `(code, route)` pairs, in declaration order.
    pub fn sub_items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sub_items.iter().map(|(c, r)| (c.as_str(), r.as_str()))
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if let Some(route) = &self.route {
            check_route(&self.name, route)?;
        }
        let mut codes = HashSet::new();
        for (code, route) in &self.sub_items {
            if !codes.insert(code.as_str()) {
                return Err(CatalogError::DuplicateSubItem {
                    category: self.name.clone(),
                    code: code.clone(),
                });
            }
            check_route(&self.name, route)?;
        }
        Ok(())
    }
}

fn check_route(category: &str, route: &str) -> Result<(), CatalogError> {
    if route.starts_with('/') {
        Ok(())
    } else {
        Err(CatalogError::BadRoute {
            category: category.to_string(),
            route: route.to_string(),
        })
    }
}

fn fallback_route(category: &str) -> String {
    format!("/{}", category.to_lowercase())
}

// ---------------------------------------------------------------------------
// RouteCatalog
// ---------------------------------------------------------------------------

/// Validated lookup from category names to routes.
///
/// Built once when configuration loads and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCatalog {
    entries: Vec<CategoryEntry>,
}

impl RouteCatalog {
    /// Builds a catalog, rejecting empty or duplicate names, routes that
    /// don't start with `/`, and repeated sub-item codes.
    pub fn new(entries: Vec<CategoryEntry>) -> Result<Self, CatalogError> {
        let mut names = HashSet::new();
        for entry in &entries {
            entry.validate()?;
            if !names.insert(entry.name.as_str()) {
                return Err(CatalogError::DuplicateCategory(entry.name.clone()));
            }
        }
        debug!(categories = entries.len(), "route catalog loaded");
        Ok(Self { entries })
    }

    /// The dashboard's built-in catalog.
    pub fn dashboard_default() -> Self {
        Self {
            entries: vec![
                CategoryEntry::new("Carteira").with_route("/carteira"),
                CategoryEntry::new("Polos")
                    .with_sub_item("955", "/itaim")
                    .with_sub_item("921", "/penha")
                    .with_sub_item("920", "/sm"),
                CategoryEntry::new("Ptrac").with_route("/ptrac"),
                CategoryEntry::new("rastreador").with_route("/rastreador"),
                CategoryEntry::new("materiais").with_route("/materiais"),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Option<&CategoryEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn categories(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Derives the ordered route list for a navigation config.
    ///
    /// Categories keep selection order. An expandable category yields one
    /// route per selected sub-item, in sub-item selection order; unknown
    /// codes are skipped, and no selected sub-items means no routes at
    /// all. Any other category yields its own route. Categories missing
    /// from the catalog fall back to `/<lowercased name>`.
    pub fn expand(&self, config: &NavigationConfig) -> Vec<String> {
        let mut routes = Vec::new();
        for category in &config.selected_categories {
            match self.get(category) {
                Some(entry) if entry.is_expandable() => {
                    let selected = config.sub_items_of(category);
                    if selected.is_empty() {
                        trace!(%category, "expandable category without sub-items, skipped");
                    }
                    for code in selected {
                        match entry.sub_item_route(code) {
                            Some(route) => routes.push(route.to_string()),
                            None => trace!(%category, %code, "unknown sub-item, skipped"),
                        }
                    }
                }
                Some(entry) => routes.push(entry.route()),
                None => routes.push(fallback_route(category)),
            }
        }
        routes
    }
}

impl Default for RouteCatalog {
    fn default() -> Self {
        Self::dashboard_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav(categories: &[&str]) -> NavigationConfig {
        categories
            .iter()
            .fold(NavigationConfig::default(), |cfg, c| cfg.with_category(*c))
    }

    #[test]
    fn test_dashboard_default_passes_validation() {
        let entries = RouteCatalog::dashboard_default().entries;
        assert!(RouteCatalog::new(entries).is_ok());
    }

    #[test]
    fn test_expand_preserves_category_and_sub_item_order() {
        let config = nav(&["Polos", "Ptrac"])
            .with_sub_item("Polos", "921")
            .with_sub_item("Polos", "955");

        let routes = RouteCatalog::default().expand(&config);

        assert_eq!(routes, ["/penha", "/itaim", "/ptrac"]);
    }

    #[test]
    fn test_expand_expandable_without_sub_items_yields_nothing() {
        let routes = RouteCatalog::default().expand(&nav(&["Polos"]));
        assert!(routes.is_empty());
    }

    #[test]
    fn test_expand_unknown_sub_item_skipped() {
        let config = nav(&["Polos"])
            .with_sub_item("Polos", "999")
            .with_sub_item("Polos", "920");

        assert_eq!(RouteCatalog::default().expand(&config), ["/sm"]);
    }

    #[test]
    fn test_expand_unknown_category_falls_back_to_lowercase() {
        let routes = RouteCatalog::default().expand(&nav(&["Estoque"]));
        assert_eq!(routes, ["/estoque"]);
    }

    #[test]
    fn test_expand_keys_are_case_sensitive() {
        // "polos" is not "Polos": it is an unknown category, not an
        // expandable one.
        let config = nav(&["polos"]).with_sub_item("polos", "955");
        assert_eq!(RouteCatalog::default().expand(&config), ["/polos"]);
    }

    #[test]
    fn test_new_rejects_duplicate_category() {
        let err = RouteCatalog::new(vec![
            CategoryEntry::new("Ptrac"),
            CategoryEntry::new("Ptrac").with_route("/other"),
        ])
        .unwrap_err();

        assert_eq!(err, CatalogError::DuplicateCategory("Ptrac".into()));
    }

    #[test]
    fn test_new_rejects_relative_route() {
        let err = RouteCatalog::new(vec![CategoryEntry::new("Polos").with_sub_item("955", "itaim")])
            .unwrap_err();

        assert!(matches!(err, CatalogError::BadRoute { ref route, .. } if route == "itaim"));
    }

    #[test]
    fn test_new_rejects_duplicate_sub_item() {
        let err = RouteCatalog::new(vec![
            CategoryEntry::new("Polos")
                .with_sub_item("955", "/itaim")
                .with_sub_item("955", "/sm"),
        ])
        .unwrap_err();

        assert!(matches!(err, CatalogError::DuplicateSubItem { .. }));
    }

    #[test]
    fn test_new_rejects_blank_name() {
        assert_eq!(
            RouteCatalog::new(vec![CategoryEntry::new("  ")]).unwrap_err(),
            CatalogError::EmptyName
        );
    }

    #[test]
    fn test_category_route_defaults_to_lowercase_name() {
        assert_eq!(CategoryEntry::new("Materiais").route(), "/materiais");
        assert_eq!(CategoryEntry::new("Carteira").with_route("/cart").route(), "/cart");
    }
}
