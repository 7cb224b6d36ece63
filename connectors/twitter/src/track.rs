//! Keyword tracklist sent to the filter stream.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Keywords tracked when nothing else is configured.
pub const DEFAULT_TRACKLIST: [&str; 3] = ["#Brexit", "#brexit", "#br"];

/// Ordered set of keywords the stream endpoint filters on.
///
/// Entries keep their first-seen order. Matching is done server-side and is
/// case-insensitive there, but entries are kept verbatim: `#Brexit` and
/// `#brexit` are distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tracklist(Vec<String>);

impl Tracklist {
    /// Build a tracklist, trimming entries and dropping blanks and exact
    /// duplicates.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim();
            if keyword.is_empty() || entries.iter().any(|k| k == keyword) {
                continue;
            }
            entries.push(keyword.to_string());
        }
        Self(entries)
    }

    /// Parse a whitespace-separated keyword string such as `"#Brexit #brexit"`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        Self::new(s.split_whitespace())
    }

    /// Render the `track` request parameter (comma-separated).
    #[must_use]
    pub fn to_track_param(&self) -> String {
        self.0.join(",")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for Tracklist {
    fn default() -> Self {
        Self::new(DEFAULT_TRACKLIST)
    }
}

impl fmt::Display for Tracklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

impl<'de> Deserialize<'de> for Tracklist {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let keywords = Vec::<String>::deserialize(deserializer)?;
        Ok(Self::new(keywords))
    }
}
