/// Parameters forwarded to the remote search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Offset of the first returned identifier.
    pub retstart: u32,
    /// Upper bound on returned identifiers.
    pub retmax: u32,
    /// Earliest publication date, `YYYY[/MM[/DD]]`.
    pub mindate: Option<String>,
    /// Latest publication date, `YYYY[/MM[/DD]]`.
    pub maxdate: Option<String>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            retstart: 0,
            retmax: 20,
            mindate: None,
            maxdate: None,
        }
    }
}

/// A named, parameterized search. Immutable once built from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub name: String,
    pub term: String,
    pub params: SearchParams,
}

impl Query {
    pub fn new(name: impl Into<String>, term: impl Into<String>, params: SearchParams) -> Self {
        Self {
            name: name.into(),
            term: term.into(),
            params,
        }
    }
}
