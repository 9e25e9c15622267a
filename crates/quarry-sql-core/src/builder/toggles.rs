//! Render toggles propagated from parent to child expressions.

use std::collections::BTreeMap;

/// A named render option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Toggle {
    /// Qualify columns with their table name (`t.col`).
    MultiTable,
    /// Alias qualified projection columns back to their bare name.
    NeedAutoAlias,
    /// Render assignments as a `(cols) VALUES (...)` list.
    UseValues,
}

/// An immutable set of toggles.
///
/// A child set is layered on top of its parent with [`Toggles::merge`]: keys
/// switched on in the child are added, keys switched off are removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toggles(BTreeMap<Toggle, bool>);

impl Toggles {
    /// Creates an empty toggle set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `toggle` set to `on`.
    ///
    /// A `false` entry is kept so that merging this set into a parent
    /// removes the key there.
    #[must_use]
    pub fn with(mut self, toggle: Toggle, on: bool) -> Self {
        self.0.insert(toggle, on);
        self
    }

    /// Reports whether `toggle` is switched on.
    #[must_use]
    pub fn is(&self, toggle: Toggle) -> bool {
        self.0.get(&toggle).copied().unwrap_or(false)
    }

    /// Layers `next` over `self`, returning the merged set.
    #[must_use]
    pub fn merge(&self, next: &Self) -> Self {
        let mut merged = self.0.clone();
        for (&toggle, &on) in &next.0 {
            if on {
                merged.insert(toggle, true);
            } else {
                merged.remove(&toggle);
            }
        }
        Self(merged)
    }
}
