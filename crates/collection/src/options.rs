//! Coordinator options.

use serde::{Deserialize, Serialize};

/// Behaviour switches of a [`CollectionManager`](crate::CollectionManager).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionOptions {
    /// Recompute as soon as the store reports a change. When off, changes
    /// only mark the view dirty until the next explicit update.
    #[serde(default = "default_auto_reload")]
    pub auto_reload: bool,
}

fn default_auto_reload() -> bool {
    true
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            auto_reload: default_auto_reload(),
        }
    }
}
