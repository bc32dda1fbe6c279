use serde::{Deserialize, Serialize};

use crate::domain::ItemId;

/// A menu entry as the server stores and returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub available: bool,
    pub image: String,
}

impl MenuItem {
    /// Merges `patch` over this item, producing the full object sent in a
    /// `PUT /foods/{id}` body. Fields present in the patch win; everything
    /// else keeps its current value, including the id.
    pub fn merged_with(&self, patch: &ItemPatch) -> MenuItem {
        MenuItem {
            id: self.id,
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            description: patch
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            price: patch.price.unwrap_or(self.price),
            available: patch.available.unwrap_or(self.available),
            image: patch.image.clone().unwrap_or_else(|| self.image.clone()),
        }
    }
}

/// Candidate item for creation. The server assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub available: bool,
    pub image: String,
}

impl ItemDraft {
    /// Returns the draft as actually posted: `available` is forced true on
    /// creation regardless of what the caller supplied.
    pub fn for_create(&self) -> ItemDraft {
        ItemDraft {
            available: true,
            ..self.clone()
        }
    }
}

/// Partial update applied over the item currently selected for editing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.available.is_none()
            && self.image.is_none()
    }
}
