//! Structural merge of mappings.
//!
//! Merge semantics, for each key of the secondary mapping:
//! - Missing in primary: inserted
//! - Both mappings: merged recursively with the same `update` flag
//! - Both lists: concatenated (primary items first)
//! - Both sets: unioned
//! - Anything else: the secondary value wins when `update` is set,
//!   otherwise the primary value is kept
//!
//! No combination of inputs is an error.

use std::ops::Deref;

use dictkit_types::{Mapping, Value};
use tracing::trace;

/// Flags controlling a [`merge`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeOptions {
    /// Let secondary values overwrite colliding scalars.
    pub update: bool,
    /// Produce an independent copy instead of mutating the primary mapping.
    pub new: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            update: true,
            new: false,
        }
    }
}

impl MergeOptions {
    /// Keep the primary value on scalar collisions.
    pub fn keep_existing(self) -> Self {
        Self {
            update: false,
            ..self
        }
    }

    /// Leave both inputs untouched and return a fresh mapping.
    pub fn into_new(self) -> Self {
        Self { new: true, ..self }
    }
}

/// The result of a [`merge`]: either the mutated primary mapping or a new one.
#[derive(Debug)]
pub enum Merged<'a> {
    InPlace(&'a mut Mapping),
    New(Mapping),
}

impl Merged<'_> {
    /// Returns `true` if the result is a fresh mapping.
    pub fn is_new(&self) -> bool {
        matches!(self, Merged::New(_))
    }

    /// Take ownership of the result, cloning it when it was merged in place.
    pub fn into_owned(self) -> Mapping {
        match self {
            Merged::InPlace(map) => map.clone(),
            Merged::New(map) => map,
        }
    }
}

impl Deref for Merged<'_> {
    type Target = Mapping;

    fn deref(&self) -> &Mapping {
        match self {
            Merged::InPlace(map) => map,
            Merged::New(map) => map,
        }
    }
}

/// Merge `secondary` into `primary` according to `options`.
///
/// With `options.new == false` the primary mapping is mutated and handed
/// back as [`Merged::InPlace`]; otherwise `primary` is left untouched and
/// the merged copy is returned as [`Merged::New`].
///
/// `primary` is borrowed mutably in both modes. Callers holding only a
/// `&Mapping` should call [`merged`] instead.
pub fn merge<'a>(
    primary: &'a mut Mapping,
    secondary: &Mapping,
    options: MergeOptions,
) -> Merged<'a> {
    trace!(
        primary_keys = primary.len(),
        secondary_keys = secondary.len(),
        update = options.update,
        new = options.new,
        "merging mappings"
    );
    if options.new {
        Merged::New(merged(primary, secondary, options.update))
    } else {
        Merged::InPlace(merge_into(primary, secondary, options.update))
    }
}

/// Merge `secondary` into `primary` in place and return `primary`.
pub fn merge_into<'a>(
    primary: &'a mut Mapping,
    secondary: &Mapping,
    update: bool,
) -> &'a mut Mapping {
    for (key, incoming) in secondary {
        match primary.get_mut(key) {
            Some(existing) => merge_values(existing, incoming, update),
            None => {
                primary.insert(key.clone(), incoming.clone());
            }
        }
    }
    primary
}

/// Merge two mappings into a new, structurally independent mapping.
pub fn merged(primary: &Mapping, secondary: &Mapping, update: bool) -> Mapping {
    let mut result = primary.clone();
    merge_into(&mut result, secondary, update);
    result
}

/// Merge a single incoming value into an existing slot.
pub fn merge_values(target: &mut Value, incoming: &Value, update: bool) {
    match (target, incoming) {
        (Value::Map(existing), Value::Map(incoming)) => {
            merge_into(existing, incoming, update);
        }
        (Value::List(existing), Value::List(incoming)) => {
            existing.extend(incoming.iter().cloned());
        }
        (Value::Set(existing), Value::Set(incoming)) => {
            existing.extend(incoming.iter().cloned());
        }
        (slot, incoming) => {
            if update {
                *slot = incoming.clone();
            }
        }
    }
}

/// Fold several layers into a fresh mapping. The first layer has the lowest
/// precedence when `update` is set.
pub fn merge_all<'a, I>(layers: I, update: bool) -> Mapping
where
    I: IntoIterator<Item = &'a Mapping>,
{
    let mut result = Mapping::new();
    let mut count = 0usize;
    for layer in layers {
        merge_into(&mut result, layer, update);
        count += 1;
    }
    trace!(layers = count, keys = result.len(), "merged layers");
    result
}
