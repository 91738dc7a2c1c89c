use crate::gesture::GestureKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a recognized gesture should trigger downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    None,
    KeyboardShortcut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub action: ActionKind,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub description: String,
}

impl ActionDescriptor {
    pub fn none() -> Self {
        Self {
            action: ActionKind::None,
            params: BTreeMap::new(),
            description: "No action".to_string(),
        }
    }

    pub fn shortcut(shortcut: &str, description: &str) -> Self {
        let mut params = BTreeMap::new();
        params.insert("shortcut".to_string(), shortcut.to_string());
        Self {
            action: ActionKind::KeyboardShortcut,
            params,
            description: description.to_string(),
        }
    }
}

/// Gesture to action table resolved by the pipeline when publishing a tick.
/// Gestures missing from the table resolve to [`ActionDescriptor::none`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GestureActionMap {
    entries: BTreeMap<GestureKind, ActionDescriptor>,
}

impl GestureActionMap {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn resolve(&self, kind: GestureKind) -> ActionDescriptor {
        self.entries
            .get(&kind)
            .cloned()
            .unwrap_or_else(ActionDescriptor::none)
    }

    pub fn set(&mut self, kind: GestureKind, descriptor: ActionDescriptor) {
        self.entries.insert(kind, descriptor);
    }

    /// Descriptors for gestures that trigger something, in gesture order
    pub fn actionable(&self, gestures: &[GestureKind]) -> Vec<(GestureKind, ActionDescriptor)> {
        gestures
            .iter()
            .map(|kind| (*kind, self.resolve(*kind)))
            .filter(|(_, descriptor)| descriptor.action != ActionKind::None)
            .collect()
    }
}

impl Default for GestureActionMap {
    fn default() -> Self {
        let mut map = Self::empty();
        for kind in GestureKind::ALL {
            map.set(kind, ActionDescriptor::none());
        }
        map.set(
            GestureKind::ZoomIn,
            ActionDescriptor::shortcut("zoom_in", "Zoom in"),
        );
        map.set(
            GestureKind::ZoomOut,
            ActionDescriptor::shortcut("zoom_out", "Zoom out"),
        );
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map_only_binds_zoom() {
        let map = GestureActionMap::default();

        for kind in GestureKind::ALL {
            let descriptor = map.resolve(kind);
            if kind.is_zoom() {
                assert_eq!(descriptor.action, ActionKind::KeyboardShortcut);
                assert_eq!(descriptor.params.get("shortcut").map(String::as_str), Some(kind.as_str()));
            } else {
                assert_eq!(descriptor.action, ActionKind::None);
            }
        }
    }

    #[test]
    fn test_missing_entry_resolves_to_none() {
        let map = GestureActionMap::empty();
        assert_eq!(map.resolve(GestureKind::Fist), ActionDescriptor::none());
    }

    #[test]
    fn test_actionable_filters_unbound_gestures() {
        let map = GestureActionMap::default();
        let actions = map.actionable(&[GestureKind::ZoomOut, GestureKind::Palm]);

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].0, GestureKind::ZoomOut);
    }

    #[test]
    fn test_json_shape() {
        let map = GestureActionMap::default();
        let json = serde_json::to_value(&map).unwrap();

        assert_eq!(json["zoom_in"]["action"], "keyboard_shortcut");
        assert_eq!(json["fist"]["action"], "none");
    }
}
