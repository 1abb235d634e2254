use crate::schema::{Literal, Schema, SchemaNode};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tracing::{debug, trace};

static NEXT_IMPLEMENTATION_ID: AtomicU64 = AtomicU64::new(1);

/// Entry count at which the cache first sweeps out dropped schemas.
const MIN_SWEEP_AT: usize = 64;

/// A behavior axis a schema can be projected into.
///
/// A capability supplies the structural rules: how the behaviors of a node's
/// children combine into the behavior of the node itself. Primitive behaviors
/// are not part of the capability; they are bound by name in an
/// [`Implementation`].
pub trait Capability: Send + Sync + 'static {
    type Behavior: Clone + Send + Sync + 'static;

    fn name(&self) -> &'static str;

    fn literal(&self, values: &[Literal]) -> Self::Behavior;

    /// Combines per-field behaviors. Fields arrive in declaration order.
    fn structure(&self, fields: Vec<(String, Self::Behavior)>) -> Self::Behavior;

    fn union(&self, alternatives: Vec<Self::Behavior>) -> Self::Behavior;

    fn intersection(&self, parts: Vec<Self::Behavior>) -> Self::Behavior;

    fn array(&self, element: Self::Behavior) -> Self::Behavior;
}

/// A capability together with its primitive bindings.
///
/// Implementations are immutable. [`Implementation::extend`] produces a new
/// implementation and leaves the original, and anything interpreted from it,
/// untouched.
pub struct Implementation<C: Capability> {
    id: u64,
    capability: Arc<C>,
    bindings: Arc<BTreeMap<String, C::Behavior>>,
    cache: Arc<RwLock<Cache<C::Behavior>>>,
}

/// Interpreted behaviors keyed by schema id. Entries hold the schema weakly
/// and are swept once their schema is gone.
struct Cache<B> {
    entries: HashMap<u64, (Weak<SchemaNode>, B)>,
    sweep_at: usize,
}

impl<B> Cache<B> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            sweep_at: MIN_SWEEP_AT,
        }
    }

    fn insert(&mut self, schema: &Schema, behavior: B) {
        if self.entries.len() >= self.sweep_at {
            let before = self.entries.len();
            self.entries.retain(|_, (node, _)| node.strong_count() > 0);
            self.sweep_at = MIN_SWEEP_AT.max(self.entries.len() * 2);
            trace!(
                swept = before - self.entries.len(),
                kept = self.entries.len(),
                "swept interpretation cache"
            );
        }

        self.entries
            .entry(schema.id())
            .or_insert_with(|| (schema.downgrade(), behavior));
    }
}

impl<C: Capability> Implementation<C> {
    pub fn register<I, K>(capability: C, bindings: I) -> Self
    where
        I: IntoIterator<Item = (K, C::Behavior)>,
        K: Into<String>,
    {
        let bindings: BTreeMap<String, C::Behavior> = bindings
            .into_iter()
            .map(|(name, behavior)| (name.into(), behavior))
            .collect();

        let implementation = Self::from_parts(Arc::new(capability), bindings);
        debug!(
            capability = implementation.capability.name(),
            id = implementation.id,
            primitives = implementation.bindings.len(),
            "registered capability implementation"
        );
        implementation
    }

    /// Returns a new implementation with `name` bound to `binding`, overriding
    /// any existing binding of that name.
    pub fn extend(&self, name: impl Into<String>, binding: C::Behavior) -> Self {
        let name = name.into();
        let mut bindings = (*self.bindings).clone();
        let replaced = bindings.insert(name.clone(), binding).is_some();

        let extended = Self::from_parts(self.capability.clone(), bindings);
        debug!(
            capability = self.capability.name(),
            base = self.id,
            id = extended.id,
            primitive = %name,
            replaced,
            "extended capability implementation"
        );
        extended
    }

    fn from_parts(capability: Arc<C>, bindings: BTreeMap<String, C::Behavior>) -> Self {
        Self {
            id: NEXT_IMPLEMENTATION_ID.fetch_add(1, Ordering::Relaxed),
            capability,
            bindings: Arc::new(bindings),
            cache: Arc::new(RwLock::new(Cache::new())),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn capability(&self) -> &C {
        &self.capability
    }

    pub fn binding(&self, name: &str) -> Option<&C::Behavior> {
        self.bindings.get(name)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn bound_names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub(crate) fn cached(&self, schema: &Schema) -> Option<C::Behavior> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .get(&schema.id())
            .map(|(_, behavior)| behavior.clone())
    }

    pub(crate) fn remember(&self, schema: &Schema, behavior: C::Behavior) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(schema, behavior);
    }

    pub(crate) fn cache_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

impl<C: Capability> Clone for Implementation<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            capability: self.capability.clone(),
            bindings: self.bindings.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<C: Capability> fmt::Debug for Implementation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("id", &self.id)
            .field("capability", &self.capability.name())
            .field("bindings", &self.bindings.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    /// Renders a schema shape as text; enough to exercise the binding table.
    struct Describe;

    impl Capability for Describe {
        type Behavior = String;

        fn name(&self) -> &'static str {
            "Describe"
        }

        fn literal(&self, values: &[Literal]) -> String {
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" | ")
        }

        fn structure(&self, fields: Vec<(String, String)>) -> String {
            let fields: Vec<_> = fields
                .into_iter()
                .map(|(name, field)| format!("{}: {}", name, field))
                .collect();
            format!("{{ {} }}", fields.join(", "))
        }

        fn union(&self, alternatives: Vec<String>) -> String {
            alternatives.join(" | ")
        }

        fn intersection(&self, parts: Vec<String>) -> String {
            parts.join(" & ")
        }

        fn array(&self, element: String) -> String {
            format!("Array<{}>", element)
        }
    }

    #[test]
    fn extend_leaves_original_untouched() {
        let base = Implementation::register(Describe, vec![("string", "string".to_owned())]);
        let extended = base.extend("Price", "price".to_owned());

        assert!(!base.is_bound("Price"));
        assert!(extended.is_bound("Price"));
        assert!(extended.is_bound("string"));
        assert_ne!(base.id(), extended.id());
        assert_eq!(vec!["string"], base.bound_names().collect::<Vec<_>>());
        assert_eq!(
            vec!["Price", "string"],
            extended.bound_names().collect::<Vec<_>>()
        );
    }

    #[test]
    fn extend_overrides_existing_binding() {
        let base = Implementation::register(Describe, vec![("string", "string".to_owned())]);
        let extended = base.extend("string", "text".to_owned());

        assert_eq!(Some(&"string".to_owned()), base.binding("string"));
        assert_eq!(Some(&"text".to_owned()), extended.binding("string"));
    }

    #[test]
    fn clones_share_identity_and_cache() {
        let base = Implementation::register(Describe, Vec::<(String, String)>::new());
        let clone = base.clone();
        let schema = schema::string();

        clone.remember(&schema, "cached".to_owned());

        assert_eq!(base.id(), clone.id());
        assert_eq!(Some("cached".to_owned()), base.cached(&schema));
        assert_eq!(0, base.extend("x", "x".to_owned()).cache_len());
    }

    #[test]
    fn cache_sweeps_dropped_schemas() {
        let implementation = Implementation::register(Describe, Vec::<(String, String)>::new());
        let live = schema::string();
        implementation.remember(&live, "live".to_owned());

        for _ in 0..1000 {
            let dropped = schema::boolean();
            implementation.remember(&dropped, "dropped".to_owned());
        }

        assert!(implementation.cache_len() <= MIN_SWEEP_AT);
        assert_eq!(Some("live".to_owned()), implementation.cached(&live));
    }
}
