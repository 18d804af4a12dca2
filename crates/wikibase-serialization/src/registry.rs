//! Discriminator-keyed strategy registry.
//!
//! A [`StrategyRegistry`] maps a [`Discriminator`] naming a conceptual kind
//! ("snak", "statement", "item entity", ...) to a type-erased strategy. It
//! knows nothing about the entity domain: strategies are stored as
//! `Box<dyn Any>` and resolved back to their trait-object type on lookup.
//!
//! Serialization and deserialization strategies live in separate registries
//! (their operations have opposite polarity); the polarity is a type
//! parameter so a serializer registry cannot hand out deserializers.

use std::any::{Any, type_name};
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{DeserializeError, RegistryError, SerializeError};

/// The wire/storage value every codec produces or consumes.
pub type WireValue = serde_json::Value;

/// Converts a model value to its wire form.
pub trait Serializer<T: ?Sized>: Send + Sync {
    fn serialize(&self, value: &T) -> Result<WireValue, SerializeError>;
}

/// Converts a wire value back to a freshly allocated model value.
pub trait Deserializer<T>: Send + Sync {
    fn deserialize(&self, wire: &WireValue) -> Result<T, DeserializeError>;
}

/// A serializer whose output depends on the requested [`WireShape`].
pub trait ShapedSerializer<T: ?Sized>: Send + Sync {
    fn serialize_shaped(&self, value: &T, shape: WireShape) -> Result<WireValue, SerializeError>;
}

/// A deserializer that reads the requested [`WireShape`].
pub trait ShapedDeserializer<T>: Send + Sync {
    fn deserialize_shaped(&self, wire: &WireValue, shape: WireShape) -> Result<T, DeserializeError>;
}

/// The two wire layouts produced from one strategy set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WireShape {
    /// The current layout.
    #[default]
    Current,
    /// The historical layout expected by older consumers: property-id keys
    /// of statement groups and qualifiers are lowercase.
    Legacy,
}

impl WireShape {
    /// Maps the `legacyStyle` flag of the scripting bridge to a shape.
    pub fn from_legacy_flag(legacy_style: bool) -> Self {
        if legacy_style {
            WireShape::Legacy
        } else {
            WireShape::Current
        }
    }

    pub fn is_legacy(self) -> bool {
        self == WireShape::Legacy
    }
}

impl fmt::Display for WireShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireShape::Current => f.write_str("current"),
            WireShape::Legacy => f.write_str("legacy"),
        }
    }
}

/// Names the conceptual kind a strategy handles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Discriminator {
    Term,
    TermMap,
    MultiTerm,
    MultiTermMap,
    Fingerprint,
    Snak,
    SnakList,
    Reference,
    ReferenceList,
    SiteLink,
    SiteLinkSet,
    Claim(WireShape),
    Statement(WireShape),
    StatementList(WireShape),
    StatementGroup(WireShape),
    StatementGroupSet(WireShape),
    /// One entity kind, named by its wire `type` (`"item"`, `"property"`, ...).
    Entity(Cow<'static, str>),
}

impl Discriminator {
    /// Discriminator for an entity kind.
    pub fn entity(kind: impl Into<Cow<'static, str>>) -> Self {
        Discriminator::Entity(kind.into())
    }
}

impl fmt::Display for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discriminator::Term => f.write_str("term"),
            Discriminator::TermMap => f.write_str("term map"),
            Discriminator::MultiTerm => f.write_str("multi-term"),
            Discriminator::MultiTermMap => f.write_str("multi-term map"),
            Discriminator::Fingerprint => f.write_str("fingerprint"),
            Discriminator::Snak => f.write_str("snak"),
            Discriminator::SnakList => f.write_str("snak list"),
            Discriminator::Reference => f.write_str("reference"),
            Discriminator::ReferenceList => f.write_str("reference list"),
            Discriminator::SiteLink => f.write_str("site link"),
            Discriminator::SiteLinkSet => f.write_str("site link set"),
            Discriminator::Claim(shape) => write!(f, "{shape} claim"),
            Discriminator::Statement(shape) => write!(f, "{shape} statement"),
            Discriminator::StatementList(shape) => write!(f, "{shape} statement list"),
            Discriminator::StatementGroup(shape) => write!(f, "{shape} statement group"),
            Discriminator::StatementGroupSet(shape) => write!(f, "{shape} statement group set"),
            Discriminator::Entity(kind) => write!(f, "{kind} entity"),
        }
    }
}

/// Polarity marker for serializer registries.
#[derive(Debug, Clone, Copy)]
pub enum Serialization {}

/// Polarity marker for deserializer registries.
#[derive(Debug, Clone, Copy)]
pub enum Deserialization {}

/// Type-erased strategy table.
pub struct StrategyRegistry<P> {
    strategies: FxHashMap<Discriminator, Box<dyn Any + Send + Sync>>,
    _polarity: PhantomData<fn() -> P>,
}

impl<P> Default for StrategyRegistry<P> {
    fn default() -> Self {
        Self {
            strategies: FxHashMap::default(),
            _polarity: PhantomData,
        }
    }
}

impl<P> fmt::Debug for StrategyRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("discriminators", &self.strategies.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<P> StrategyRegistry<P> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `strategy` under `discriminator`.
    ///
    /// `S` is the handle type callers will ask for, typically an
    /// `Arc<dyn Serializer<T>>`.
    pub fn register<S>(&mut self, discriminator: Discriminator, strategy: S) -> Result<(), RegistryError>
    where
        S: Any + Send + Sync,
    {
        if self.strategies.contains_key(&discriminator) {
            return Err(RegistryError::DuplicateStrategy {
                discriminator: discriminator.to_string(),
            });
        }
        tracing::trace!(%discriminator, "registered strategy");
        self.strategies.insert(discriminator, Box::new(strategy));
        Ok(())
    }

    /// Returns a clone of the handle stored under `discriminator`.
    pub fn get<S>(&self, discriminator: &Discriminator) -> Result<S, RegistryError>
    where
        S: Any + Send + Sync + Clone,
    {
        let boxed = self
            .strategies
            .get(discriminator)
            .ok_or_else(|| RegistryError::UnregisteredStrategy {
                discriminator: discriminator.to_string(),
            })?;
        boxed
            .downcast_ref::<S>()
            .cloned()
            .ok_or_else(|| RegistryError::StrategyTypeMismatch {
                discriminator: discriminator.to_string(),
                expected: type_name::<S>(),
            })
    }

    /// Returns `true` if a strategy is registered under `discriminator`.
    pub fn contains(&self, discriminator: &Discriminator) -> bool {
        self.strategies.contains_key(discriminator)
    }

    /// Entity kinds that have a registered strategy.
    pub fn entity_kinds(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().filter_map(|d| match d {
            Discriminator::Entity(kind) => Some(kind.as_ref()),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl StrategyRegistry<Serialization> {
    /// Registers a serializer for `T`.
    pub fn register_serializer<T, S>(&mut self, discriminator: Discriminator, strategy: S) -> Result<(), RegistryError>
    where
        T: ?Sized + 'static,
        S: Serializer<T> + 'static,
    {
        let handle: Arc<dyn Serializer<T>> = Arc::new(strategy);
        self.register(discriminator, handle)
    }

    /// Resolves the serializer for `T` registered under `discriminator`.
    pub fn serializer<T: ?Sized + 'static>(
        &self,
        discriminator: &Discriminator,
    ) -> Result<Arc<dyn Serializer<T>>, RegistryError> {
        self.get(discriminator)
    }

    /// Registers a shape-aware serializer for `T`.
    pub fn register_shaped_serializer<T, S>(
        &mut self,
        discriminator: Discriminator,
        strategy: S,
    ) -> Result<(), RegistryError>
    where
        T: ?Sized + 'static,
        S: ShapedSerializer<T> + 'static,
    {
        let handle: Arc<dyn ShapedSerializer<T>> = Arc::new(strategy);
        self.register(discriminator, handle)
    }

    pub fn shaped_serializer<T: ?Sized + 'static>(
        &self,
        discriminator: &Discriminator,
    ) -> Result<Arc<dyn ShapedSerializer<T>>, RegistryError> {
        self.get(discriminator)
    }
}

impl StrategyRegistry<Deserialization> {
    /// Registers a deserializer for `T`.
    pub fn register_deserializer<T, S>(&mut self, discriminator: Discriminator, strategy: S) -> Result<(), RegistryError>
    where
        T: 'static,
        S: Deserializer<T> + 'static,
    {
        let handle: Arc<dyn Deserializer<T>> = Arc::new(strategy);
        self.register(discriminator, handle)
    }

    /// Resolves the deserializer for `T` registered under `discriminator`.
    pub fn deserializer<T: 'static>(
        &self,
        discriminator: &Discriminator,
    ) -> Result<Arc<dyn Deserializer<T>>, RegistryError> {
        self.get(discriminator)
    }

    /// Registers a shape-aware deserializer for `T`.
    pub fn register_shaped_deserializer<T, S>(
        &mut self,
        discriminator: Discriminator,
        strategy: S,
    ) -> Result<(), RegistryError>
    where
        T: 'static,
        S: ShapedDeserializer<T> + 'static,
    {
        let handle: Arc<dyn ShapedDeserializer<T>> = Arc::new(strategy);
        self.register(discriminator, handle)
    }

    pub fn shaped_deserializer<T: 'static>(
        &self,
        discriminator: &Discriminator,
    ) -> Result<Arc<dyn ShapedDeserializer<T>>, RegistryError> {
        self.get(discriminator)
    }
}
