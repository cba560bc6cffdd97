use std::collections::BTreeSet;

use crate::Identifier;

/// Every identifier already reported to the user. The set only grows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct History {
    ids: BTreeSet<Identifier>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the flat on-disk form: one identifier per line. Blank lines and
    /// repeated lines are tolerated.
    pub fn from_lines(text: &str) -> Self {
        text.lines().filter_map(Identifier::parse).collect()
    }

    /// Serializes to one identifier per line, sorted, newline-terminated.
    pub fn to_lines(&self) -> String {
        let mut out = String::with_capacity(self.ids.len() * 9);
        for id in self.iter() {
            out.push_str(id.as_str());
            out.push('\n');
        }
        out
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.ids.contains(id)
    }

    /// Returns a new history holding `self ∪ ids`.
    pub fn merged<'a, I>(&self, ids: I) -> History
    where
        I: IntoIterator<Item = &'a Identifier>,
    {
        let mut next = self.ids.clone();
        next.extend(ids.into_iter().cloned());
        History { ids: next }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.ids.iter()
    }
}

impl FromIterator<Identifier> for History {
    fn from_iter<T: IntoIterator<Item = Identifier>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
