//! Snaks: single property assertions.

use crate::model::id::{ContentHasher, PropertyId};
use crate::model::value::DataValue;

/// One (property, value-or-absence) assertion.
#[derive(Debug, Clone, PartialEq)]
pub enum Snak {
    /// The property has no value.
    NoValue { property: PropertyId },
    /// The property has a value, but it is unknown.
    SomeValue { property: PropertyId },
    /// The property has the given value.
    Value { property: PropertyId, value: DataValue },
}

impl Snak {
    pub fn no_value(property: PropertyId) -> Self {
        Snak::NoValue { property }
    }

    pub fn some_value(property: PropertyId) -> Self {
        Snak::SomeValue { property }
    }

    pub fn value(property: PropertyId, value: DataValue) -> Self {
        Snak::Value { property, value }
    }

    /// The property this snak is about.
    pub fn property(&self) -> PropertyId {
        match self {
            Snak::NoValue { property }
            | Snak::SomeValue { property }
            | Snak::Value { property, .. } => *property,
        }
    }

    /// The wire discriminator of this variant.
    pub fn snak_type(&self) -> &'static str {
        match self {
            Snak::NoValue { .. } => "novalue",
            Snak::SomeValue { .. } => "somevalue",
            Snak::Value { .. } => "value",
        }
    }

    pub(crate) fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.str(self.snak_type()).u64(self.property().numeric());
        if let Snak::Value { value, .. } = self {
            value.hash_into(hasher);
        }
    }
}

/// Ordered sequence of snaks; the order is the display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnakList {
    snaks: Vec<Snak>,
}

impl SnakList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snak: Snak) {
        self.snaks.push(snak);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snak> {
        self.snaks.iter()
    }

    pub fn len(&self) -> usize {
        self.snaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snaks.is_empty()
    }

    /// Returns a copy reordered so that snaks of the same property are
    /// adjacent, keeping the first-seen order of properties and the relative
    /// order within each property.
    pub fn grouped_by_property(&self) -> SnakList {
        let mut order: Vec<PropertyId> = Vec::new();
        for snak in &self.snaks {
            if !order.contains(&snak.property()) {
                order.push(snak.property());
            }
        }
        let source = &self.snaks;
        let snaks = order
            .into_iter()
            .flat_map(move |p| source.iter().filter(move |s| s.property() == p).cloned())
            .collect();
        SnakList { snaks }
    }

    /// Splits into per-property runs, in first-seen property order.
    pub fn property_groups(&self) -> Vec<(PropertyId, Vec<&Snak>)> {
        let mut groups: Vec<(PropertyId, Vec<&Snak>)> = Vec::new();
        for snak in &self.snaks {
            match groups.iter_mut().find(|(p, _)| *p == snak.property()) {
                Some((_, members)) => members.push(snak),
                None => groups.push((snak.property(), vec![snak])),
            }
        }
        groups
    }

    pub(crate) fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.u64(self.snaks.len() as u64);
        for snak in &self.snaks {
            snak.hash_into(hasher);
        }
    }
}

impl FromIterator<Snak> for SnakList {
    fn from_iter<I: IntoIterator<Item = Snak>>(iter: I) -> Self {
        Self {
            snaks: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SnakList {
    type Item = &'a Snak;
    type IntoIter = std::slice::Iter<'a, Snak>;

    fn into_iter(self) -> Self::IntoIter {
        self.snaks.iter()
    }
}
