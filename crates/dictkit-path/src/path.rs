//! Tree paths.
//!
//! A string path is split on `/` with empty segments dropped, so
//! `"/a//b/"` and `["a", "b"]` address the same slot. Segments given as a
//! sequence are split the same way, so `["a/b"]` is the path `a/b` and an
//! empty segment contributes nothing.

use std::fmt;

/// An ordered sequence of path segments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath {
    segments: Vec<String>,
}

impl TreePath {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-delimited path.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: split_segments(path).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// A new path with `segment` appended. A segment holding `/` appends
    /// each of its parts.
    pub fn join(&self, segment: impl AsRef<str>) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(split_segments(segment.as_ref()));
        Self { segments }
    }

    /// Split into the parent segments and the final segment.
    pub fn split_last(&self) -> Option<(&String, &[String])> {
        self.segments.split_last()
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl From<&str> for TreePath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<String> for TreePath {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}

impl From<&String> for TreePath {
    fn from(path: &String) -> Self {
        Self::parse(path)
    }
}

impl From<&TreePath> for TreePath {
    fn from(path: &TreePath) -> Self {
        path.clone()
    }
}

impl From<Vec<String>> for TreePath {
    fn from(segments: Vec<String>) -> Self {
        segments.into_iter().collect()
    }
}

impl From<Vec<&str>> for TreePath {
    fn from(segments: Vec<&str>) -> Self {
        segments.into_iter().collect()
    }
}

impl From<&[&str]> for TreePath {
    fn from(segments: &[&str]) -> Self {
        segments.iter().copied().collect()
    }
}

impl<const N: usize> From<[&str; N]> for TreePath {
    fn from(segments: [&str; N]) -> Self {
        segments.into_iter().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TreePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut segments = Vec::new();
        for segment in iter {
            segments.extend(split_segments(segment.as_ref()));
        }
        Self { segments }
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = String> + '_ {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}
