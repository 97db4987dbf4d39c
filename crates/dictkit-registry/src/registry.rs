//! The two-level family/variant registry.
//!
//! [`ClassRegistry`] keeps its slots in a `BTreeMap` keyed by a registration
//! sequence number, so iteration follows registration order. Exact
//! `(family, variant)` lookups go through a hash index; wildcard lookups scan
//! the slots filtered by whichever axis is given.
//!
//! # Invariants
//!
//! - A `(family, variant)` pair names at most one slot.
//! - A family exists only while at least one variant is registered under it.
//! - Every slot is reachable from both `index` and `families`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::key::RegistryKey;
use crate::name::{normalize, Class, Interner, Named, Symbol};

#[derive(Clone, Debug)]
struct Slot<V> {
    family: Symbol,
    variant: Symbol,
    value: V,
}

/// A registry of values grouped by family and keyed by their own names.
///
/// Not internally synchronized; wrap it in a lock to share across threads.
#[derive(Debug)]
pub struct ClassRegistry<V = Class> {
    interner: Interner,
    /// All slots, keyed by registration sequence.
    slots: BTreeMap<u64, Slot<V>>,
    /// Exact-pair index: (family, variant) -> sequence.
    index: HashMap<(Symbol, Symbol), u64>,
    /// Family index: family -> sequences in registration order.
    families: HashMap<Symbol, BTreeSet<u64>>,
    next_seq: u64,
}

impl<V> Default for ClassRegistry<V> {
    fn default() -> Self {
        Self {
            interner: Interner::default(),
            slots: BTreeMap::new(),
            index: HashMap::new(),
            families: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<V: Named> ClassRegistry<V> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under the family named by `family`.
    ///
    /// The variant is the value's own name. Re-registering an existing
    /// `(family, variant)` pair replaces the value in place, keeping its
    /// registration position, and returns the previous value.
    pub fn insert(&mut self, family: impl Named, value: V) -> Option<V> {
        let family = self.interner.intern(&family.name());
        let variant = self.interner.intern(&value.name());

        if let Some(seq) = self.index.get(&(family.clone(), variant.clone())) {
            if let Some(slot) = self.slots.get_mut(seq) {
                debug!(%family, %variant, "replaced registry entry");
                return Some(std::mem::replace(&mut slot.value, value));
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert((family.clone(), variant.clone()), seq);
        self.families.entry(family.clone()).or_default().insert(seq);
        debug!(%family, %variant, seq, symbols = self.interner.len(), "registered entry");
        self.slots.insert(
            seq,
            Slot {
                family,
                variant,
                value,
            },
        );
        None
    }
}

impl<V> ClassRegistry<V> {
    /// Number of registered values.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Look up a single value.
    ///
    /// - [`RegistryKey::Any`] yields `Ok(None)`.
    /// - An exact pair resolves case-insensitively.
    /// - A pair with one side open, or a bare family, must match exactly one
    ///   entry; no match or several matches is an error.
    pub fn get(&self, key: impl Into<RegistryKey>) -> RegistryResult<Option<&V>> {
        let key = key.into();
        let seq = match key.parts() {
            (None, None) => return Ok(None),
            (Some(family), Some(variant)) => self.find_exact(family, variant)?,
            (Some(family), None) => {
                let seqs = self.family_seqs(family)?;
                unique(
                    seqs.iter().copied(),
                    || format!("{}/*", normalize(family)),
                    || RegistryError::FamilyNotFound {
                        family: normalize(family),
                    },
                )?
            }
            (None, Some(variant)) => unique(
                self.variant_seqs(variant).into_iter(),
                || format!("*/{}", normalize(variant)),
                || RegistryError::VariantNotFound {
                    family: None,
                    variant: normalize(variant),
                },
            )?,
        };
        Ok(self.slots.get(&seq).map(|slot| &slot.value))
    }

    /// Returns `true` if `key` resolves to exactly one value.
    pub fn contains(&self, key: impl Into<RegistryKey>) -> bool {
        matches!(self.get(key), Ok(Some(_)))
    }

    /// All values registered under `family`, in registration order.
    pub fn family(&self, family: impl Named) -> RegistryResult<Vec<&V>> {
        let seqs = self.family_seqs(&family.name())?;
        Ok(seqs
            .iter()
            .filter_map(|seq| self.slots.get(seq))
            .map(|slot| &slot.value)
            .collect())
    }

    /// Distinct family names, in order of their earliest live registration.
    pub fn families(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.slots
            .values()
            .filter(|slot| seen.insert(slot.family.as_str()))
            .map(|slot| slot.family.as_str())
            .collect()
    }

    /// Remove entries matching `key`, returning them in registration order.
    ///
    /// - An exact pair removes that one slot.
    /// - A bare family (or `(family, None)`) removes every variant of it.
    /// - `(None, variant)` removes every entry with that variant name.
    /// - [`RegistryKey::Any`] matches nothing and is an error.
    pub fn remove(&mut self, key: impl Into<RegistryKey>) -> RegistryResult<Vec<V>> {
        let key = key.into();
        let seqs: Vec<u64> = match key.parts() {
            (None, None) => return Err(RegistryError::EmptyKey),
            (Some(family), Some(variant)) => vec![self.find_exact(family, variant)?],
            (Some(family), None) => self.family_seqs(family)?.iter().copied().collect(),
            (None, Some(variant)) => {
                let seqs = self.variant_seqs(variant);
                if seqs.is_empty() {
                    return Err(RegistryError::VariantNotFound {
                        family: None,
                        variant: normalize(variant),
                    });
                }
                seqs
            }
        };

        let removed: Vec<V> = seqs
            .into_iter()
            .filter_map(|seq| self.remove_slot(seq))
            .collect();
        if self.slots.is_empty() {
            self.interner = Interner::default();
        }
        debug!(?key, removed = removed.len(), "removed registry entries");
        Ok(removed)
    }

    /// Remove everything, interned names included.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.families.clear();
        self.interner = Interner::default();
    }

    /// Iterate over registered values in registration order.
    pub fn iter(&self) -> Values<'_, V> {
        Values {
            inner: self.slots.values(),
        }
    }

    /// Alias of [`ClassRegistry::iter`].
    pub fn values(&self) -> Values<'_, V> {
        self.iter()
    }

    /// Iterate over `(family, variant, value)` triples in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &V)> + '_ {
        self.slots
            .values()
            .map(|slot| (slot.family.as_str(), slot.variant.as_str(), &slot.value))
    }

    // ---------------------------------------------------------------
    // Resolution helpers
    // ---------------------------------------------------------------

    fn find_exact(&self, family: &str, variant: &str) -> RegistryResult<u64> {
        let family_sym = self
            .interner
            .lookup(family)
            .filter(|sym| self.families.contains_key(sym))
            .ok_or_else(|| RegistryError::FamilyNotFound {
                family: normalize(family),
            })?;
        let not_found = || RegistryError::VariantNotFound {
            family: Some(family_sym.to_string()),
            variant: normalize(variant),
        };
        let variant_sym = self.interner.lookup(variant).ok_or_else(not_found)?;
        self.index
            .get(&(family_sym.clone(), variant_sym))
            .copied()
            .ok_or_else(not_found)
    }

    fn family_seqs(&self, family: &str) -> RegistryResult<&BTreeSet<u64>> {
        self.interner
            .lookup(family)
            .and_then(|sym| self.families.get(&sym))
            .filter(|seqs| !seqs.is_empty())
            .ok_or_else(|| RegistryError::FamilyNotFound {
                family: normalize(family),
            })
    }

    /// Linear scan for slots whose variant matches, in registration order.
    fn variant_seqs(&self, variant: &str) -> Vec<u64> {
        let Some(sym) = self.interner.lookup(variant) else {
            return Vec::new();
        };
        self.slots
            .iter()
            .filter(|(_, slot)| slot.variant == sym)
            .map(|(seq, _)| *seq)
            .collect()
    }

    fn remove_slot(&mut self, seq: u64) -> Option<V> {
        let slot = self.slots.remove(&seq)?;
        self.index.remove(&(slot.family.clone(), slot.variant.clone()));
        if let Some(seqs) = self.families.get_mut(&slot.family) {
            seqs.remove(&seq);
            if seqs.is_empty() {
                self.families.remove(&slot.family);
            }
        }
        Some(slot.value)
    }
}

/// Pick the single sequence from `seqs`. No match is `missing()`, several
/// matches are ambiguous.
fn unique(
    mut seqs: impl Iterator<Item = u64>,
    pattern: impl FnOnce() -> String,
    missing: impl FnOnce() -> RegistryError,
) -> RegistryResult<u64> {
    let Some(first) = seqs.next() else {
        return Err(missing());
    };
    match seqs.count() {
        0 => Ok(first),
        rest => Err(RegistryError::Ambiguous {
            pattern: pattern(),
            candidates: rest + 1,
        }),
    }
}

/// Iterator over registry values in registration order.
pub struct Values<'a, V> {
    inner: std::collections::btree_map::Values<'a, u64, Slot<V>>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|slot| &slot.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, V> IntoIterator for &'a ClassRegistry<V> {
    type Item = &'a V;
    type IntoIter = Values<'a, V>;

    fn into_iter(self) -> Values<'a, V> {
        self.iter()
    }
}

impl<V: Named> Extend<(Class, V)> for ClassRegistry<V> {
    fn extend<I: IntoIterator<Item = (Class, V)>>(&mut self, iter: I) {
        for (family, value) in iter {
            self.insert(&family, value);
        }
    }
}
