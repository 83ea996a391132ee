//! What to navigate (user selection) and how the sequencer paces it.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// NavigationConfig
// ---------------------------------------------------------------------------

/// The user's selection from the configuration modal.
///
/// `selected_categories` and each sub-item list behave as ordered sets:
/// selection order is kept and duplicates are ignored by the editing
/// helpers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub selected_categories: Vec<String>,
    pub selected_sub_items: BTreeMap<String, Vec<String>>,
    /// Seconds between navigations. Values below 1 are treated as 1.
    pub interval_secs: u64,
    /// Restart from the first route when the sequence is exhausted.
    #[serde(rename = "loop")]
    pub looping: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            selected_categories: Vec::new(),
            selected_sub_items: BTreeMap::new(),
            interval_secs: Self::DEFAULT_INTERVAL_SECS,
            looping: false,
        }
    }
}

impl NavigationConfig {
    pub const DEFAULT_INTERVAL_SECS: u64 = 5;
    pub const MIN_INTERVAL_SECS: u64 = 1;

    /// Adds a category to the selection if it isn't already there.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        if !self.selected_categories.contains(&category) {
            self.selected_categories.push(category);
        }
        self
    }

    /// Adds a sub-item under `category` if it isn't already there.
    pub fn with_sub_item(mut self, category: impl Into<String>, code: impl Into<String>) -> Self {
        let code = code.into();
        let items = self.selected_sub_items.entry(category.into()).or_default();
        if !items.contains(&code) {
            items.push(code);
        }
        self
    }

    pub fn with_interval_secs(mut self, secs: u64) -> Self {
        self.interval_secs = secs;
        self
    }

    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Selects or deselects a category. Deselecting also drops the
    /// category's selected sub-items. Returns whether it is selected now.
    pub fn toggle_category(&mut self, category: &str) -> bool {
        if let Some(pos) = self.selected_categories.iter().position(|c| c == category) {
            self.selected_categories.remove(pos);
            self.selected_sub_items.remove(category);
            false
        } else {
            self.selected_categories.push(category.to_string());
            true
        }
    }

    /// Selects or deselects a sub-item of `category`. Returns whether it is
    /// selected now.
    pub fn toggle_sub_item(&mut self, category: &str, code: &str) -> bool {
        let items = self.selected_sub_items.entry(category.to_string()).or_default();
        let selected = if let Some(pos) = items.iter().position(|c| c == code) {
            items.remove(pos);
            false
        } else {
            items.push(code.to_string());
            true
        };
        if items.is_empty() {
            self.selected_sub_items.remove(category);
        }
        selected
    }

    /// Selected sub-items of `category`, in selection order.
    pub fn sub_items_of(&self, category: &str) -> &[String] {
        self.selected_sub_items
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Time between navigations, with the 1-second floor applied.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(Self::MIN_INTERVAL_SECS))
    }
}

// ---------------------------------------------------------------------------
// SequencerConfig
// ---------------------------------------------------------------------------

/// Pacing and routing settings that don't come from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Delay before the first navigation of a run. Default: 300 ms.
    pub debounce: Duration,
    /// Where to send the user when a run ends on an expired session.
    /// Default: `/login`.
    pub login_route: String,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            login_route: "/login".to_string(),
        }
    }
}

impl SequencerConfig {
    /// Longest debounce accepted before clamping.
    pub const MAX_DEBOUNCE: Duration = Duration::from_secs(5);

    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`Sequencer::new`](crate::Sequencer::new).
    /// Rules:
    /// - `debounce` capped to [`Self::MAX_DEBOUNCE`] (zero is allowed);
    /// - a `login_route` not starting with `/` falls back to the default.
    pub fn validated(mut self) -> Self {
        if self.debounce > Self::MAX_DEBOUNCE {
            warn!(
                debounce_ms = self.debounce.as_millis() as u64,
                max_ms = Self::MAX_DEBOUNCE.as_millis() as u64,
                "debounce exceeds maximum, clamping"
            );
            self.debounce = Self::MAX_DEBOUNCE;
        }
        if !self.login_route.starts_with('/') {
            warn!(route = %self.login_route, "login_route must start with '/', using default");
            self.login_route = Self::default().login_route;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_config_defaults() {
        let cfg = NavigationConfig::default();
        assert!(cfg.selected_categories.is_empty());
        assert_eq!(cfg.interval(), Duration::from_secs(5));
        assert!(!cfg.looping);
    }

    #[test]
    fn test_interval_below_one_is_clamped() {
        let cfg = NavigationConfig::default().with_interval_secs(0);
        assert_eq!(cfg.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_with_category_ignores_duplicates() {
        let cfg = NavigationConfig::default()
            .with_category("Ptrac")
            .with_category("Carteira")
            .with_category("Ptrac");
        assert_eq!(cfg.selected_categories, ["Ptrac", "Carteira"]);
    }

    #[test]
    fn test_toggle_category_deselect_drops_sub_items() {
        let mut cfg = NavigationConfig::default()
            .with_category("Polos")
            .with_sub_item("Polos", "955");

        assert!(!cfg.toggle_category("Polos"));

        assert!(cfg.selected_categories.is_empty());
        assert!(cfg.sub_items_of("Polos").is_empty());
        assert!(cfg.toggle_category("Polos"));
    }

    #[test]
    fn test_toggle_sub_item_round_trip_removes_empty_entry() {
        let mut cfg = NavigationConfig::default();

        assert!(cfg.toggle_sub_item("Polos", "921"));
        assert_eq!(cfg.sub_items_of("Polos"), ["921"]);
        assert!(!cfg.toggle_sub_item("Polos", "921"));

        assert!(!cfg.selected_sub_items.contains_key("Polos"));
    }

    #[test]
    fn test_navigation_config_deserializes_loop_key() {
        let cfg: NavigationConfig = serde_json::from_str(
            r#"{"selected_categories":["Ptrac"],"interval_secs":2,"loop":true}"#,
        )
        .unwrap();

        assert_eq!(cfg.selected_categories, ["Ptrac"]);
        assert!(cfg.looping);
        assert!(cfg.selected_sub_items.is_empty());
    }

    #[test]
    fn test_sequencer_config_validated_fixes_values() {
        let cfg = SequencerConfig {
            debounce: Duration::from_secs(60),
            login_route: "login".into(),
        }
        .validated();

        assert_eq!(cfg.debounce, SequencerConfig::MAX_DEBOUNCE);
        assert_eq!(cfg.login_route, "/login");
    }
}
