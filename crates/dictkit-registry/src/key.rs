//! Lookup keys for the class registry.

use crate::name::{Class, Named};

/// The forms a registry key can take.
///
/// `None` on either side of a [`RegistryKey::Pair`] is a wildcard over that
/// axis. A bare [`RegistryKey::Family`] behaves like `Pair(Some(family), None)`
/// for lookups and removes the whole family on deletion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryKey {
    /// The empty key: lookups yield `None`.
    Any,
    Family(String),
    Pair(Option<String>, Option<String>),
}

impl RegistryKey {
    pub fn any() -> Self {
        RegistryKey::Any
    }

    pub fn family(family: impl Named) -> Self {
        RegistryKey::Family(family.name().into_owned())
    }

    pub fn pair(family: impl Named, variant: impl Named) -> Self {
        RegistryKey::Pair(
            Some(family.name().into_owned()),
            Some(variant.name().into_owned()),
        )
    }

    /// A variant looked up across every family.
    pub fn variant(variant: impl Named) -> Self {
        RegistryKey::Pair(None, Some(variant.name().into_owned()))
    }

    /// A pair with either side optional.
    pub fn wildcard(family: Option<&dyn Named>, variant: Option<&dyn Named>) -> Self {
        match (family, variant) {
            (None, None) => RegistryKey::Any,
            (family, variant) => RegistryKey::Pair(
                family.map(|f| f.name().into_owned()),
                variant.map(|v| v.name().into_owned()),
            ),
        }
    }

    /// Split into `(family, variant)` patterns; a bare family has no variant.
    pub(crate) fn parts(&self) -> (Option<&str>, Option<&str>) {
        match self {
            RegistryKey::Any => (None, None),
            RegistryKey::Family(family) => (Some(family), None),
            RegistryKey::Pair(family, variant) => (family.as_deref(), variant.as_deref()),
        }
    }
}

impl From<&str> for RegistryKey {
    fn from(family: &str) -> Self {
        RegistryKey::Family(family.to_string())
    }
}

impl From<String> for RegistryKey {
    fn from(family: String) -> Self {
        RegistryKey::Family(family)
    }
}

impl From<&Class> for RegistryKey {
    fn from(family: &Class) -> Self {
        RegistryKey::family(family)
    }
}

impl From<Class> for RegistryKey {
    fn from(family: Class) -> Self {
        RegistryKey::family(&family)
    }
}

impl<A: Named, B: Named> From<(A, B)> for RegistryKey {
    fn from((family, variant): (A, B)) -> Self {
        RegistryKey::pair(family, variant)
    }
}
