use unicase::Ascii;

use super::{HeaderName, HeaderValue};

/// Headers in insertion order, looked up case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<HeaderEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
    name: Ascii<String>,
    value: HeaderValue,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = Ascii::new(name);
        self.entries.iter().position(|entry| entry.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.position(name).map(|idx| &self.entries[idx].value)
    }

    /// True if the header is registered under exactly this name and holds exactly these values
    pub fn holds(&self, name: &HeaderName, value: &HeaderValue) -> bool {
        self.position(name.as_str()).is_some_and(|idx| {
            let entry = &self.entries[idx];
            entry.name.as_str() == name.as_str() && &entry.value == value
        })
    }

    /// Removes any header with the same name, then appends this one under the new case
    pub fn replace(&mut self, name: HeaderName, value: HeaderValue) {
        self.remove(name.as_str());
        self.entries.push(HeaderEntry {
            name: Ascii::new(name.into_string()),
            value,
        });
    }

    /// Removes any header with the same name, then puts this one in front of all others
    pub fn replace_first(&mut self, name: HeaderName, value: HeaderValue) {
        self.remove(name.as_str());
        self.entries.insert(
            0,
            HeaderEntry {
                name: Ascii::new(name.into_string()),
                value,
            },
        );
    }

    /// Adds the values to an existing header, which keeps its case and position,
    /// or appends a new one
    pub fn append(&mut self, name: HeaderName, value: HeaderValue) {
        match self.position(name.as_str()) {
            Some(idx) => self.entries[idx].value.extend(value),
            None => self.entries.push(HeaderEntry {
                name: Ascii::new(name.into_string()),
                value,
            }),
        }
    }

    /// Returns true if a header was removed
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), &entry.value[..]))
    }
}
