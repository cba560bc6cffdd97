//! Decoders for E-utilities responses: `esearch` JSON and `efetch` PubMed XML.

use notifier_core::{Identifier, Metadata};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid xml: {0}")]
    Xml(String),
    #[error("response lacks {0}")]
    Missing(&'static str),
    #[error("{0}")]
    Api(String),
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    esearchresult: Option<SearchResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(rename = "ERROR")]
    error: Option<String>,
}

/// Extracts the ordered identifier list from an `esearch` JSON body.
pub fn decode_search(body: &[u8]) -> Result<Vec<Identifier>, DecodeError> {
    let envelope: SearchEnvelope = serde_json::from_slice(body)?;
    if let Some(message) = envelope.error {
        return Err(DecodeError::Api(message));
    }
    let result = envelope
        .esearchresult
        .ok_or(DecodeError::Missing("esearchresult"))?;
    if let Some(message) = result.error {
        return Err(DecodeError::Api(message));
    }
    Ok(result
        .idlist
        .iter()
        .filter_map(|id| Identifier::parse(id))
        .collect())
}

/// Decodes every `PubmedArticle` and `PubmedBookArticle` of an `efetch`
/// article set, in document order.
///
/// Inline markup inside titles and abstracts is flattened and whitespace
/// collapsed.
pub fn decode_articles(xml: &str) -> Result<Vec<(Identifier, Metadata)>, DecodeError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<ArticleParts> = None;
    let mut out = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if is_record(name.as_bytes()) {
                    current = Some(ArticleParts::default());
                } else if let Some(article) = current.as_mut() {
                    article.open(&path, &name);
                }
                path.push(name);
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                if is_record(name.as_ref()) {
                    if let Some(article) = current.take() {
                        out.extend(article.finish());
                    }
                } else if let Some(article) = current.as_mut() {
                    article.close(name.as_ref());
                }
                path.pop();
            }
            Ok(Event::Text(t)) => {
                if let Some(article) = current.as_mut() {
                    let text = t.unescape().map_err(|e| DecodeError::Xml(e.to_string()))?;
                    article.absorb(&path, &text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(article) = current.as_mut() {
                    article.absorb(&path, &String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(DecodeError::Xml(format!(
                    "at byte {}: {err}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

fn is_record(name: &[u8]) -> bool {
    name == b"PubmedArticle" || name == b"PubmedBookArticle"
}

#[derive(Debug, Default)]
struct AuthorParts {
    last_name: String,
    fore_name: String,
    initials: String,
    collective: String,
}

impl AuthorParts {
    fn display(&self) -> Option<String> {
        let last = collapse(&self.last_name);
        let given = if self.initials.trim().is_empty() {
            collapse(&self.fore_name)
        } else {
            collapse(&self.initials)
        };
        match (last.is_empty(), given.is_empty()) {
            (false, false) => Some(format!("{last} {given}")),
            (false, true) => Some(last),
            _ => Some(collapse(&self.collective)).filter(|name| !name.is_empty()),
        }
    }
}

#[derive(Debug, Default)]
struct ArticleParts {
    pmid: String,
    title: String,
    iso_abbreviation: String,
    journal_title: String,
    book_title: String,
    publisher: String,
    year: String,
    medline_date: String,
    authors: Vec<String>,
    author: Option<AuthorParts>,
    abstract_parts: Vec<String>,
    abstract_part: Option<String>,
}

impl ArticleParts {
    fn open(&mut self, path: &[String], name: &str) {
        let parent = path.last().map(String::as_str);
        match name {
            // Book-level author lists name the editors.
            "Author" if !path.iter().any(|p| p == "Book") => {
                self.author = Some(AuthorParts::default())
            }
            // Translated copies live under OtherAbstract.
            "AbstractText" if parent == Some("Abstract") => {
                self.abstract_part = Some(String::new())
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"Author" => {
                if let Some(name) = self.author.take().and_then(|a| a.display()) {
                    self.authors.push(name);
                }
            }
            b"AbstractText" => {
                if let Some(part) = self.abstract_part.take() {
                    let part = collapse(&part);
                    if !part.is_empty() {
                        self.abstract_parts.push(part);
                    }
                }
            }
            _ => {}
        }
    }

    fn absorb(&mut self, path: &[String], text: &str) {
        let within = |tag: &str| path.iter().any(|p| p == tag);
        let ends_with = |parent: &str, child: &str| {
            path.len() >= 2 && path[path.len() - 2] == parent && path[path.len() - 1] == child
        };

        if within("ArticleTitle") {
            self.title.push_str(text);
        } else if within("AbstractText") {
            if let Some(part) = self.abstract_part.as_mut() {
                part.push_str(text);
            }
        } else if let Some(author) = self.author.as_mut() {
            match path.last().map(String::as_str) {
                Some("LastName") => author.last_name.push_str(text),
                Some("ForeName") => author.fore_name.push_str(text),
                Some("Initials") => author.initials.push_str(text),
                Some("CollectiveName") => author.collective.push_str(text),
                _ => {}
            }
        } else if ends_with("MedlineCitation", "PMID") || ends_with("BookDocument", "PMID") {
            self.pmid.push_str(text);
        } else if ends_with("Journal", "ISOAbbreviation") {
            self.iso_abbreviation.push_str(text);
        } else if ends_with("Journal", "Title") {
            self.journal_title.push_str(text);
        } else if ends_with("Book", "BookTitle") {
            self.book_title.push_str(text);
        } else if ends_with("Publisher", "PublisherName") {
            self.publisher.push_str(text);
        } else if ends_with("PubDate", "Year") {
            self.year.push_str(text);
        } else if ends_with("PubDate", "MedlineDate") {
            self.medline_date.push_str(text);
        }
    }

    fn finish(self) -> Option<(Identifier, Metadata)> {
        let id = Identifier::parse(&self.pmid)?;
        let book_title = collapse(&self.book_title);
        let venue = [
            collapse(&self.iso_abbreviation),
            collapse(&self.journal_title),
            book_title.clone(),
            collapse(&self.publisher),
        ]
        .into_iter()
        .find(|candidate| !candidate.is_empty())
        .unwrap_or_default();
        let title = match collapse(&self.title) {
            title if title.is_empty() => book_title,
            title => title,
        };
        let year = Some(self.year.trim().to_string())
            .filter(|y| !y.is_empty())
            .or_else(|| {
                let medline = self.medline_date.trim();
                medline
                    .get(..4)
                    .filter(|prefix| prefix.chars().all(|c| c.is_ascii_digit()))
                    .map(str::to_string)
            });
        let abstract_text = if self.abstract_parts.is_empty() {
            None
        } else {
            Some(self.abstract_parts.join(" "))
        };
        Some((
            id,
            Metadata {
                title,
                venue,
                year,
                authors: self.authors,
                abstract_text,
            },
        ))
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_error_field_is_an_api_error() {
        let body = br#"{"esearchresult": {"ERROR": "Invalid query"}}"#;
        let err = decode_search(body).unwrap_err();
        assert!(matches!(err, DecodeError::Api(ref m) if m == "Invalid query"));
    }

    #[test]
    fn search_without_result_is_missing() {
        let err = decode_search(br#"{"header": {}}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Missing("esearchresult")));
    }

    #[test]
    fn medline_date_supplies_year() {
        let xml = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation>
            <PMID Version="1">42</PMID>
            <Article><Journal><JournalIssue><PubDate><MedlineDate>1998 Dec-1999 Jan</MedlineDate></PubDate></JournalIssue>
            <Title>Journal of Things</Title></Journal>
            <ArticleTitle>T</ArticleTitle>
            <AuthorList><Author><CollectiveName>Study Group</CollectiveName></Author></AuthorList>
            </Article></MedlineCitation></PubmedArticle></PubmedArticleSet>"#;
        let articles = decode_articles(xml).unwrap();
        let (id, meta) = &articles[0];
        assert_eq!(id.as_str(), "42");
        assert_eq!(meta.year.as_deref(), Some("1998"));
        assert_eq!(meta.venue, "Journal of Things");
        assert_eq!(meta.authors, vec!["Study Group".to_string()]);
        assert_eq!(meta.abstract_text, None);
    }

    #[test]
    fn other_abstract_is_not_appended() {
        let xml = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation>
            <PMID Version="1">7</PMID>
            <Article><Journal><Title>J</Title></Journal>
            <ArticleTitle>T</ArticleTitle>
            <Abstract><AbstractText>English text.</AbstractText></Abstract>
            </Article>
            <OtherAbstract Type="Publisher" Language="spa"><AbstractText>Texto en espanol.</AbstractText></OtherAbstract>
            </MedlineCitation></PubmedArticle></PubmedArticleSet>"#;
        let articles = decode_articles(xml).unwrap();
        assert_eq!(articles[0].1.abstract_text.as_deref(), Some("English text."));
    }

    #[test]
    fn whole_book_falls_back_to_book_title() {
        let xml = r#"<PubmedArticleSet><PubmedBookArticle><BookDocument>
            <PMID Version="1">20301295</PMID>
            <Book><Publisher><PublisherName>University of Washington, Seattle</PublisherName></Publisher>
            <BookTitle book="gene">GeneReviews</BookTitle>
            <PubDate><Year>1993</Year></PubDate></Book>
            </BookDocument></PubmedBookArticle></PubmedArticleSet>"#;
        let articles = decode_articles(xml).unwrap();
        let (id, meta) = &articles[0];
        assert_eq!(id.as_str(), "20301295");
        assert_eq!(meta.title, "GeneReviews");
        assert_eq!(meta.venue, "GeneReviews");
        assert_eq!(meta.year.as_deref(), Some("1993"));
    }
}
