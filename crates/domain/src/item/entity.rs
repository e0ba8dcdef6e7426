use serde::{Deserialize, Serialize};

use super::{ImageRef, ItemId, parse_tags};

/// Title used when a client submits none, or only whitespace.
pub const UNTITLED: &str = "Untitled";

/// A collection entry as persisted in the item document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image_ref: ImageRef,
}

impl Item {
    /// Builds a fresh item from submitted fields.
    ///
    /// Absent fields fall back to their defaults: `"Untitled"` (also for a
    /// blank title), an empty description and no tags. `fields.image_ref` is
    /// ignored in favour of the stored upload.
    pub fn create(id: ItemId, fields: ItemUpdate, image_ref: ImageRef) -> Self {
        let title = fields
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        Self {
            id,
            title,
            description: fields.description.unwrap_or_default(),
            tags: fields.tags.unwrap_or_default(),
            image_ref,
        }
    }
}

/// Partial update of an [`Item`].
///
/// Each field is either present (`Some`, replaces the stored value) or
/// absent (`None`, keeps it). A client omitting a field never clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_ref: Option<ImageRef>,
}

impl ItemUpdate {
    /// Normalizes raw form values.
    ///
    /// A present title is kept as sent. A present tag string is parsed with
    /// [`parse_tags`], so an empty string clears the tags.
    pub fn from_form(
        title: Option<String>,
        description: Option<String>,
        tags: Option<String>,
    ) -> Self {
        Self {
            title,
            description,
            tags: tags.as_deref().map(parse_tags),
            image_ref: None,
        }
    }

    pub fn with_image(mut self, image_ref: ImageRef) -> Self {
        self.image_ref = Some(image_ref);
        self
    }

    /// Merges the present fields over `item`. The id never changes.
    pub fn apply_to(self, item: &mut Item) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(tags) = self.tags {
            item.tags = tags;
        }
        if let Some(image_ref) = self.image_ref {
            item.image_ref = image_ref;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Item {
        Item {
            id: ItemId::new(1),
            title: "Sunset".to_string(),
            description: String::new(),
            tags: vec!["nature".to_string(), "red".to_string()],
            image_ref: ImageRef::new("1-a-img1.jpg"),
        }
    }

    #[test]
    fn test_create_applies_defaults() {
        let item = Item::create(
            ItemId::new(7),
            ItemUpdate::default(),
            ImageRef::new("x.png"),
        );
        assert_eq!(item.title, UNTITLED);
        assert_eq!(item.description, "");
        assert!(item.tags.is_empty());
        assert_eq!(item.image_ref.as_str(), "x.png");
    }

    #[test]
    fn test_create_blank_title_becomes_untitled() {
        let fields = ItemUpdate::from_form(Some("   ".into()), None, None);
        let item = Item::create(ItemId::new(8), fields, ImageRef::new("x.png"));
        assert_eq!(item.title, UNTITLED);
    }

    #[test]
    fn test_update_keeps_blank_title_as_sent() {
        let mut item = sample();
        ItemUpdate::from_form(Some("  ".into()), None, None).apply_to(&mut item);
        assert_eq!(item.title, "  ");
    }

    #[test]
    fn test_absent_fields_are_kept() {
        let mut item = sample();
        let update = ItemUpdate::from_form(None, Some("Evening view".into()), None);
        update.apply_to(&mut item);

        assert_eq!(item.title, "Sunset");
        assert_eq!(item.description, "Evening view");
        assert_eq!(item.tags, vec!["nature", "red"]);
        assert_eq!(item.image_ref.as_str(), "1-a-img1.jpg");
    }

    #[test]
    fn test_present_empty_tags_clear() {
        let mut item = sample();
        ItemUpdate::from_form(None, None, Some(String::new())).apply_to(&mut item);
        assert!(item.tags.is_empty());
    }

    #[test]
    fn test_image_replaced_when_present() {
        let mut item = sample();
        ItemUpdate::default()
            .with_image(ImageRef::new("2-b-img2.jpg"))
            .apply_to(&mut item);
        assert_eq!(item.image_ref.as_str(), "2-b-img2.jpg");
        assert_eq!(item.id, ItemId::new(1));
    }

    #[test]
    fn test_item_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["imageRef"], "1-a-img1.jpg");
        assert_eq!(json["tags"][1], "red");
    }

    #[test]
    fn test_item_missing_optional_fields_deserialize() {
        let item: Item =
            serde_json::from_str(r#"{"id":3,"title":"t","imageRef":"f.jpg"}"#).unwrap();
        assert_eq!(item.description, "");
        assert!(item.tags.is_empty());
    }
}
