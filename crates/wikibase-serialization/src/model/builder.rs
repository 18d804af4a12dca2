//! Builder API for ergonomic entity construction.
//!
//! Provides a fluent interface for building items and statements.
//!
//! # Example
//!
//! ```rust
//! use wikibase_serialization::model::builder::ItemBuilder;
//! use wikibase_serialization::model::{ItemId, PropertyId};
//!
//! let p31 = PropertyId::new(31).unwrap();
//! let item = ItemBuilder::new(ItemId::new(1).unwrap())
//!     .label("en", "Earth")
//!     .description("en", "third planet from the Sun")
//!     .aliases("en", ["Terra", "Blue Planet"])
//!     .statement(p31, |s| s.item_value(ItemId::new(2).unwrap()))
//!     .site_link("enwiki", "Earth")
//!     .build();
//!
//! assert_eq!(item.statements.len(), 1);
//! ```

use crate::model::{
    Claim, DataValue, EntityId, Item, ItemId, MultiTerm, PropertyId, Rank, Reference,
    ReferenceList, SiteLink, Snak, SnakList, Statement, Term,
};

/// Builder for constructing an Item.
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    /// Creates a new ItemBuilder for the given item ID.
    pub fn new(id: ItemId) -> Self {
        Self { item: Item::new(id) }
    }

    /// Sets the label for a language.
    pub fn label(mut self, language: &str, text: &str) -> Self {
        self.item.fingerprint.set_label(Term::new(language, text));
        self
    }

    /// Sets the description for a language.
    pub fn description(mut self, language: &str, text: &str) -> Self {
        self.item.fingerprint.set_description(Term::new(language, text));
        self
    }

    /// Sets the aliases for a language.
    pub fn aliases<'s>(mut self, language: &str, texts: impl IntoIterator<Item = &'s str>) -> Self {
        let texts = texts.into_iter().map(str::to_string).collect();
        self.item.fingerprint.set_aliases(MultiTerm::new(language, texts));
        self
    }

    /// Adds a statement about `property` using a builder function.
    pub fn statement<F>(mut self, property: PropertyId, f: F) -> Self
    where
        F: FnOnce(StatementBuilder) -> StatementBuilder,
    {
        let statement = f(StatementBuilder::new(property)).build();
        self.item.statements.add_statement(statement);
        self
    }

    /// Adds a prebuilt statement.
    pub fn add_statement(mut self, statement: Statement) -> Self {
        self.item.statements.add_statement(statement);
        self
    }

    /// Adds a site link without badges.
    pub fn site_link(mut self, site: &str, title: &str) -> Self {
        self.item.site_links.set(SiteLink::new(site, title));
        self
    }

    /// Adds a site link with badges.
    pub fn site_link_with_badges(mut self, site: &str, title: &str, badges: Vec<ItemId>) -> Self {
        self.item
            .site_links
            .set(SiteLink::new(site, title).with_badges(badges));
        self
    }

    /// Builds the Item.
    pub fn build(self) -> Item {
        self.item
    }
}

/// Builder for a single statement.
///
/// Without a value call the main snak is a "some value" snak.
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    property: PropertyId,
    main_snak: Option<Snak>,
    qualifiers: SnakList,
    references: ReferenceList,
    rank: Rank,
    guid: Option<String>,
}

impl StatementBuilder {
    pub fn new(property: PropertyId) -> Self {
        Self {
            property,
            main_snak: None,
            qualifiers: SnakList::new(),
            references: ReferenceList::new(),
            rank: Rank::Normal,
            guid: None,
        }
    }

    /// Sets the main snak to a value snak.
    pub fn value(mut self, value: DataValue) -> Self {
        self.main_snak = Some(Snak::value(self.property, value));
        self
    }

    /// Sets the main snak to an item-valued snak.
    pub fn item_value(self, item: ItemId) -> Self {
        self.value(DataValue::EntityId(EntityId::Item(item)))
    }

    /// Sets the main snak to a string-valued snak.
    pub fn string_value(self, value: &str) -> Self {
        self.value(DataValue::String(value.to_string()))
    }

    /// Sets the main snak to a "no value" snak.
    pub fn no_value(mut self) -> Self {
        self.main_snak = Some(Snak::no_value(self.property));
        self
    }

    /// Sets the main snak to a "some value" snak.
    pub fn some_value(mut self) -> Self {
        self.main_snak = Some(Snak::some_value(self.property));
        self
    }

    /// Adds a qualifier snak.
    pub fn qualifier(mut self, snak: Snak) -> Self {
        self.qualifiers.push(snak);
        self
    }

    /// Adds a reference made of the given snaks.
    pub fn reference(mut self, snaks: impl IntoIterator<Item = Snak>) -> Self {
        self.references.push(Reference::new(snaks.into_iter().collect()));
        self
    }

    pub fn rank(mut self, rank: Rank) -> Self {
        self.rank = rank;
        self
    }

    /// Sets an externally assigned GUID.
    pub fn guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    /// Builds the Statement.
    pub fn build(self) -> Statement {
        let main_snak = self
            .main_snak
            .unwrap_or_else(|| Snak::some_value(self.property));
        let statement = Statement::new(
            Claim::new(main_snak, self.qualifiers),
            self.references,
            self.rank,
        );
        match self.guid {
            Some(guid) => statement.with_guid(guid),
            None => statement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(n: u64) -> PropertyId {
        PropertyId::new(n).unwrap()
    }

    fn q(n: u64) -> ItemId {
        ItemId::new(n).unwrap()
    }

    #[test]
    fn test_item_builder_basic() {
        let item = ItemBuilder::new(q(1))
            .label("en", "Earth")
            .label("de", "Erde")
            .aliases("en", ["Terra"])
            .statement(p(31), |s| s.item_value(q(2)).guid("Q1$abc"))
            .site_link("enwiki", "Earth")
            .build();

        assert_eq!(item.id, q(1));
        assert_eq!(item.fingerprint.labels.len(), 2);
        assert_eq!(item.fingerprint.aliases.get("en").unwrap().texts(), ["Terra"]);
        let statement = item.statements.statements().next().unwrap();
        assert_eq!(statement.guid(), Some("Q1$abc"));
        assert_eq!(statement.property(), p(31));
        assert!(item.site_links.has("enwiki"));
    }

    #[test]
    fn test_statement_builder_defaults() {
        let s = StatementBuilder::new(p(5)).build();
        assert_eq!(s.claim().main_snak(), &Snak::some_value(p(5)));
        assert_eq!(s.rank(), Rank::Normal);
        assert!(s.references().is_empty());
        assert!(s.guid().is_none());
    }

    #[test]
    fn test_statement_builder_full() {
        let s = StatementBuilder::new(p(5))
            .string_value("x")
            .qualifier(Snak::no_value(p(6)))
            .reference([Snak::some_value(p(7))])
            .reference([Snak::some_value(p(7))])
            .rank(Rank::Preferred)
            .build();
        assert_eq!(s.claim().qualifiers().len(), 1);
        assert_eq!(s.references().len(), 1);
        assert_eq!(s.rank(), Rank::Preferred);
    }
}
