use feed_rs::parser;

use crate::app::{FeedhookError, Result};
use crate::domain::Item;

/// Turns raw RSS/Atom/JSON Feed bytes into [`Item`]s, in document order.
#[derive(Clone, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Entries without a GUID keep an empty `guid`, so [`Item::identifier`]
    /// falls back to the link instead of an id invented by the parser.
    pub fn normalize(&self, body: &[u8]) -> Result<Vec<Item>> {
        let parser = parser::Builder::new()
            .id_generator(|_links, _title, _uri| String::new())
            .build();
        let feed = parser
            .parse(body)
            .map_err(|e| FeedhookError::FeedParse(e.to_string()))?;

        let items = feed
            .entries
            .into_iter()
            .map(|entry| {
                let links: Vec<String> = entry.links.into_iter().map(|l| l.href).collect();

                Item {
                    guid: entry.id,
                    title: entry.title.map(|t| t.content),
                    link: links.first().cloned(),
                    links,
                    summary: entry.summary.map(|s| s.content),
                    content: entry.content.and_then(|c| c.body),
                    authors: entry.authors.into_iter().map(|a| a.name).collect(),
                    categories: entry.categories.into_iter().map(|c| c.term).collect(),
                    published: entry.published,
                    updated: entry.updated,
                }
            })
            .collect();

        Ok(items)
    }
}
