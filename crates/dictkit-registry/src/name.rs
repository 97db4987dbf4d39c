//! Name providers and interned registry names.
//!
//! Registry keys are derived from names rather than reflection: anything
//! implementing [`Named`] can act as a family key or a registered value.
//! [`Class`] is the stock type identity, built from a Rust type with
//! [`Class::of`].

use std::any::{type_name, TypeId};
use std::borrow::{Borrow, Cow};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Anything exposing a stable display name.
pub trait Named {
    fn name(&self) -> Cow<'_, str>;
}

impl Named for str {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Named for String {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl<T: Named + ?Sized> Named for &T {
    fn name(&self) -> Cow<'_, str> {
        (**self).name()
    }
}

/// A named type identity.
///
/// [`Class::of`] captures the unqualified name of a Rust type together with
/// its [`TypeId`]; [`Class::named`] builds an identity from a bare name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Class {
    name: Cow<'static, str>,
    type_id: Option<TypeId>,
}

impl Class {
    /// The identity of `T`, named after the last path segment of its type
    /// name with generic arguments stripped (`a::b::Foo<u8>` → `Foo`).
    ///
    /// Meant for named types (structs, enums, aliases of either).
    /// Tuples, references, slices and arrays have no single name and yield
    /// fragments such as `D)` for `(a::B, c::D)`; register those with
    /// [`Class::named`].
    pub fn of<T: ?Sized + 'static>() -> Self {
        let full = type_name::<T>();
        let base = full.split('<').next().unwrap_or(full);
        let short = base.rsplit("::").next().unwrap_or(base);
        Self {
            name: Cow::Borrowed(short),
            type_id: Some(TypeId::of::<T>()),
        }
    }

    /// An identity known only by name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            type_id: None,
        }
    }

    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// Returns `true` if this identity was captured from `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_id == Some(TypeId::of::<T>())
    }
}

impl Named for Class {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.name.as_ref())
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An interned, lower-cased registry name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", &*self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a name for storage and lookup.
pub(crate) fn normalize(name: &str) -> String {
    name.to_lowercase()
}

/// Symbol table handing out one shared allocation per distinct name.
#[derive(Debug, Default)]
pub(crate) struct Interner {
    symbols: HashSet<Symbol>,
}

impl Interner {
    /// Intern `name` (lower-cased), reusing an existing symbol if present.
    pub(crate) fn intern(&mut self, name: &str) -> Symbol {
        let normalized = normalize(name);
        if let Some(existing) = self.symbols.get(normalized.as_str()) {
            return existing.clone();
        }
        let symbol = Symbol(Arc::from(normalized));
        self.symbols.insert(symbol.clone());
        symbol
    }

    /// Look up an already interned name without allocating a new symbol.
    pub(crate) fn lookup(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(normalize(name).as_str()).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.symbols.len()
    }
}
