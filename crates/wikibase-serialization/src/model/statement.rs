//! Claims, references and statements, and their grouped containers.

use crate::error::ModelError;
use crate::model::id::{ContentHasher, PropertyId};
use crate::model::snak::{Snak, SnakList};

/// A main snak plus qualifiers.
///
/// Qualifiers are kept grouped by property (first-seen order), which is the
/// order the grouped wire form reproduces.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    main_snak: Snak,
    qualifiers: SnakList,
}

impl Claim {
    pub fn new(main_snak: Snak, qualifiers: SnakList) -> Self {
        Self {
            main_snak,
            qualifiers: qualifiers.grouped_by_property(),
        }
    }

    pub fn main_snak(&self) -> &Snak {
        &self.main_snak
    }

    pub fn qualifiers(&self) -> &SnakList {
        &self.qualifiers
    }

    /// Property of the main snak; the statement grouping key.
    pub fn property(&self) -> PropertyId {
        self.main_snak.property()
    }
}

/// Provenance for a statement: a list of snaks identified by a derived hash.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reference {
    snaks: SnakList,
}

impl Reference {
    pub fn new(snaks: SnakList) -> Self {
        Self { snaks }
    }

    pub fn snaks(&self) -> &SnakList {
        &self.snaks
    }

    /// Content hash of the snaks, recomputed on every call.
    pub fn hash(&self) -> String {
        let mut hasher = ContentHasher::new();
        hasher.tag(b'R');
        self.snaks.hash_into(&mut hasher);
        hasher.finish_hex()
    }
}

/// Ordered references, deduplicated by hash.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceList {
    references: Vec<Reference>,
}

impl ReferenceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `reference` unless one with the same hash is present.
    /// Returns whether it was added.
    pub fn push(&mut self, reference: Reference) -> bool {
        let hash = reference.hash();
        if self.references.iter().any(|r| r.hash() == hash) {
            return false;
        }
        self.references.push(reference);
        true
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reference> {
        self.references.iter()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

impl FromIterator<Reference> for ReferenceList {
    fn from_iter<I: IntoIterator<Item = Reference>>(iter: I) -> Self {
        let mut list = Self::new();
        for reference in iter {
            list.push(reference);
        }
        list
    }
}

/// Statement rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rank {
    Deprecated,
    #[default]
    Normal,
    Preferred,
}

impl Rank {
    /// Wire name of the rank.
    pub fn name(self) -> &'static str {
        match self {
            Rank::Deprecated => "deprecated",
            Rank::Normal => "normal",
            Rank::Preferred => "preferred",
        }
    }

    pub fn from_name(name: &str) -> Option<Rank> {
        match name {
            "deprecated" => Some(Rank::Deprecated),
            "normal" => Some(Rank::Normal),
            "preferred" => Some(Rank::Preferred),
            _ => None,
        }
    }

    /// Integer form of the rank, as stored by older consumers.
    pub fn ordinal(self) -> u8 {
        match self {
            Rank::Deprecated => 0,
            Rank::Normal => 1,
            Rank::Preferred => 2,
        }
    }

    pub fn from_ordinal(v: u64) -> Option<Rank> {
        match v {
            0 => Some(Rank::Deprecated),
            1 => Some(Rank::Normal),
            2 => Some(Rank::Preferred),
            _ => None,
        }
    }
}

/// A claim with references, a rank and an optional GUID.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    claim: Claim,
    references: ReferenceList,
    rank: Rank,
    guid: Option<String>,
}

impl Statement {
    pub fn new(claim: Claim, references: ReferenceList, rank: Rank) -> Self {
        Self {
            claim,
            references,
            rank,
            guid: None,
        }
    }

    /// Creates a statement with an already assigned GUID.
    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn claim(&self) -> &Claim {
        &self.claim
    }

    pub fn references(&self) -> &ReferenceList {
        &self.references
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn set_rank(&mut self, rank: Rank) {
        self.rank = rank;
    }

    pub fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    /// Assigns the GUID. A GUID can be assigned only once.
    pub fn set_guid(&mut self, guid: impl Into<String>) -> Result<(), ModelError> {
        if let Some(existing) = &self.guid {
            return Err(ModelError::GuidAlreadyAssigned {
                existing: existing.clone(),
            });
        }
        self.guid = Some(guid.into());
        Ok(())
    }

    pub fn property(&self) -> PropertyId {
        self.claim.property()
    }
}

/// Ordered statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementList {
    statements: Vec<Statement>,
}

impl StatementList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Finds a statement by GUID.
    pub fn get_by_guid(&self, guid: &str) -> Option<&Statement> {
        self.statements.iter().find(|s| s.guid() == Some(guid))
    }
}

impl FromIterator<Statement> for StatementList {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self {
            statements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for StatementList {
    type Item = Statement;
    type IntoIter = std::vec::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl<'a> IntoIterator for &'a StatementList {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

/// All statements about one property. The property is derived from the
/// statements, never stored separately.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementGroup {
    statements: StatementList,
}

impl StatementGroup {
    /// Builds a group; fails if the list is empty or mixes properties.
    pub fn new(statements: StatementList) -> Result<Self, ModelError> {
        let Some(first) = statements.iter().next() else {
            return Err(ModelError::EmptyStatementGroup);
        };
        let property = first.property();
        if let Some(other) = statements.iter().find(|s| s.property() != property) {
            return Err(ModelError::MixedStatementGroup {
                expected: property,
                found: other.property(),
            });
        }
        Ok(Self { statements })
    }

    pub fn property(&self) -> PropertyId {
        // Non-empty by construction.
        self.statements.statements[0].property()
    }

    pub fn statements(&self) -> &StatementList {
        &self.statements
    }
}

/// Statement groups keyed by property, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementGroupSet {
    groups: Vec<StatementGroup>,
}

impl StatementGroupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a statement to the group of its main-snak property.
    pub fn add_statement(&mut self, statement: Statement) {
        let property = statement.property();
        match self.groups.iter_mut().find(|g| g.property() == property) {
            Some(group) => group.statements.push(statement),
            None => self.groups.push(StatementGroup {
                statements: std::iter::once(statement).collect(),
            }),
        }
    }

    /// Adds all statements of `group`, merging with an existing group.
    pub fn add_group(&mut self, group: StatementGroup) {
        for statement in group.statements.statements {
            self.add_statement(statement);
        }
    }

    pub fn get(&self, property: PropertyId) -> Option<&StatementGroup> {
        self.groups.iter().find(|g| g.property() == property)
    }

    pub fn groups(&self) -> std::slice::Iter<'_, StatementGroup> {
        self.groups.iter()
    }

    /// All statements, group by group.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.groups.iter().flat_map(|g| g.statements.iter())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<Statement> for StatementGroupSet {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        let mut set = Self::new();
        for statement in iter {
            set.add_statement(statement);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::DataValue;

    fn p(n: u64) -> PropertyId {
        PropertyId::new(n).unwrap()
    }

    fn statement(prop: u64) -> Statement {
        Statement::new(
            Claim::new(Snak::some_value(p(prop)), SnakList::new()),
            ReferenceList::new(),
            Rank::Normal,
        )
    }

    #[test]
    fn test_claim_groups_qualifiers() {
        let qualifiers: SnakList = [
            Snak::no_value(p(2)),
            Snak::no_value(p(3)),
            Snak::some_value(p(2)),
        ]
        .into_iter()
        .collect();
        let claim = Claim::new(Snak::no_value(p(1)), qualifiers);
        let props: Vec<_> = claim.qualifiers().iter().map(Snak::property).collect();
        assert_eq!(props, [p(2), p(2), p(3)]);
    }

    #[test]
    fn test_reference_hash_is_derived() {
        let a = Reference::new([Snak::value(p(1), DataValue::String("x".into()))].into_iter().collect());
        let b = Reference::new([Snak::value(p(1), DataValue::String("x".into()))].into_iter().collect());
        let c = Reference::new([Snak::value(p(1), DataValue::String("y".into()))].into_iter().collect());
        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.hash(), c.hash());
        assert_eq!(a.hash().len(), 40);
    }

    #[test]
    fn test_reference_list_dedup() {
        let r = Reference::new([Snak::no_value(p(4))].into_iter().collect());
        let mut list = ReferenceList::new();
        assert!(list.push(r.clone()));
        assert!(!list.push(r));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_rank_encodings() {
        for rank in [Rank::Deprecated, Rank::Normal, Rank::Preferred] {
            assert_eq!(Rank::from_name(rank.name()), Some(rank));
            assert_eq!(Rank::from_ordinal(u64::from(rank.ordinal())), Some(rank));
        }
        assert_eq!(Rank::from_ordinal(3), None);
        assert_eq!(Rank::from_name("bogus"), None);
    }

    #[test]
    fn test_guid_assigned_once() {
        let mut s = statement(1);
        assert!(s.set_guid("Q1$a").is_ok());
        assert!(matches!(
            s.set_guid("Q1$b"),
            Err(ModelError::GuidAlreadyAssigned { .. })
        ));
        assert_eq!(s.guid(), Some("Q1$a"));
    }

    #[test]
    fn test_group_set_first_seen_order() {
        let set: StatementGroupSet = [statement(7), statement(8), statement(7)].into_iter().collect();
        let keys: Vec<_> = set.groups().map(StatementGroup::property).collect();
        assert_eq!(keys, [p(7), p(8)]);
        assert_eq!(set.get(p(7)).unwrap().statements().len(), 2);
        assert_eq!(set.statements().count(), 3);
    }

    #[test]
    fn test_group_rejects_mixed_properties() {
        let list: StatementList = [statement(1), statement(2)].into_iter().collect();
        assert!(matches!(
            StatementGroup::new(list),
            Err(ModelError::MixedStatementGroup { .. })
        ));
        assert!(matches!(
            StatementGroup::new(StatementList::new()),
            Err(ModelError::EmptyStatementGroup)
        ));
    }
}
