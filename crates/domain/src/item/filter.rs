use super::Item;

/// Free-text and tag filter over items.
///
/// `query` matches case-insensitively against title or description. Every
/// entry in `tags` must be carried by the item (case-insensitive).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilter {
    pub query: Option<String>,
    pub tags: Vec<String>,
}

impl ItemFilter {
    pub fn new(query: Option<String>, tags: Vec<String>) -> Self {
        Self { query, tags }
    }

    pub fn is_empty(&self) -> bool {
        self.needle().is_none() && self.wanted_tags().next().is_none()
    }

    fn needle(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty())
    }

    fn wanted_tags(&self) -> impl Iterator<Item = String> + '_ {
        self.tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
    }

    pub fn matches(&self, item: &Item) -> bool {
        if let Some(needle) = self.needle() {
            let in_title = item.title.to_lowercase().contains(&needle);
            let in_description = item.description.to_lowercase().contains(&needle);
            if !in_title && !in_description {
                return false;
            }
        }

        let carried: Vec<String> = item
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .collect();
        self.wanted_tags().all(|wanted| carried.contains(&wanted))
    }

    /// Keeps matching items in their original order.
    pub fn apply(&self, items: Vec<Item>) -> Vec<Item> {
        if self.is_empty() {
            return items;
        }
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}
