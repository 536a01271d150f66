//! HTTP client for the NCBI E-utilities literature index.
//!
//! Searches go through `esearch.fcgi` (JSON); record detail comes from
//! `efetch.fcgi`, which only speaks XML, parsed here with a streaming reader.
//! A malformed article is skipped individually and never aborts its siblings.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::matcher::LiteratureIndex;
use super::types::{ArticleAuthor, ArticleRecord, SearchHits};
use crate::TARGET_WEB_REQUEST;

pub const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const ARTICLE_URL_BASE: &str = "https://pubmed.ncbi.nlm.nih.gov";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct EsearchResponse {
    #[serde(default)]
    esearchresult: EsearchResult,
}

#[derive(Debug, Default, Deserialize)]
struct EsearchResult {
    #[serde(default)]
    idlist: Vec<String>,
    /// The index reports the count as a string.
    #[serde(default)]
    count: String,
}

pub struct LiteratureClient {
    client: reqwest::Client,
    base_url: String,
}

impl LiteratureClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: EUTILS_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LiteratureIndex for LiteratureClient {
    async fn search(&self, query: &str, limit: usize) -> Result<SearchHits> {
        debug!(target: TARGET_WEB_REQUEST, "Literature search: {}", query);

        let retmax = limit.to_string();
        let response = self
            .client
            .get(format!("{}/esearch.fcgi", self.base_url))
            .query(&[
                ("db", "pubmed"),
                ("term", query),
                ("retmax", retmax.as_str()),
                ("retmode", "json"),
                ("sort", "date"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "literature index returned status {}",
                response.status()
            ));
        }

        let parsed: EsearchResponse = response.json().await?;
        let total = parsed.esearchresult.count.parse().unwrap_or(0);

        Ok(SearchHits {
            ids: parsed.esearchresult.idlist,
            total,
        })
    }

    async fn fetch_details(&self, ids: &[String]) -> Result<Vec<ArticleRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            target: TARGET_WEB_REQUEST,
            "Fetching detail for {} literature records",
            ids.len()
        );

        let id_list = ids.join(",");
        let response = self
            .client
            .get(format!("{}/efetch.fcgi", self.base_url))
            .query(&[("db", "pubmed"), ("id", id_list.as_str()), ("retmode", "xml")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "literature index returned status {}",
                response.status()
            ));
        }

        let body = response.text().await?;
        Ok(parse_article_records(&body))
    }
}

/// Unescape the predefined XML entities that appear in titles and
/// affiliations.
fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Resolve an entity reference emitted as its own event (the name between
/// `&` and `;`). Unknown named entities resolve to nothing.
fn resolve_entity(name: &str) -> String {
    match name {
        "amp" => "&".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "quot" => "\"".to_string(),
        "apos" => "'".to_string(),
        _ => name
            .strip_prefix("#x")
            .or_else(|| name.strip_prefix("#X"))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .or_else(|| name.strip_prefix('#').and_then(|dec| dec.parse().ok()))
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default(),
    }
}

/// Which element's text is currently being captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Pmid,
    ArticleTitle,
    JournalTitle,
    Year,
    AuthorLastName,
    AuthorForeName,
    AuthorInitials,
    AuthorAffiliation,
}

/// Parse an efetch XML body into article records.
///
/// Articles missing an identifier or title are dropped; a reader-level error
/// stops at the failure point but keeps everything parsed so far.
pub fn parse_article_records(xml: &str) -> Vec<ArticleRecord> {
    // Text is trimmed once per field at element end; trimming individual
    // text fragments would eat the spacing around entity references.
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut records: Vec<ArticleRecord> = Vec::new();
    let mut current: Option<ArticleRecord> = None;
    let mut current_author: Option<ArticleAuthor> = None;
    let mut capture = Capture::None;
    let mut in_journal = false;
    let mut in_pub_date = false;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                match e.name().as_ref() {
                    b"PubmedArticle" => {
                        current = Some(ArticleRecord::default());
                        current_author = None;
                    }
                    b"PMID" => {
                        // Only the article's own PMID; later PMID elements
                        // belong to cited or related records.
                        if current.as_ref().is_some_and(|r| r.id.is_empty()) {
                            capture = Capture::Pmid;
                            text.clear();
                        }
                    }
                    b"ArticleTitle" => {
                        capture = Capture::ArticleTitle;
                        text.clear();
                    }
                    b"Journal" => in_journal = true,
                    b"Title" if in_journal => {
                        capture = Capture::JournalTitle;
                        text.clear();
                    }
                    b"PubDate" => in_pub_date = true,
                    b"Year" if in_pub_date => {
                        if current.as_ref().is_some_and(|r| r.year.is_none()) {
                            capture = Capture::Year;
                            text.clear();
                        }
                    }
                    b"Author" => current_author = Some(ArticleAuthor::default()),
                    b"LastName" if current_author.is_some() => {
                        capture = Capture::AuthorLastName;
                        text.clear();
                    }
                    b"ForeName" if current_author.is_some() => {
                        capture = Capture::AuthorForeName;
                        text.clear();
                    }
                    b"Initials" if current_author.is_some() => {
                        capture = Capture::AuthorInitials;
                        text.clear();
                    }
                    b"Affiliation" if current_author.is_some() => {
                        capture = Capture::AuthorAffiliation;
                        text.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if capture != Capture::None {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                if capture != Capture::None {
                    text.push_str(&resolve_entity(&String::from_utf8_lossy(e.as_ref())));
                }
            }
            Ok(Event::End(ref e)) => {
                // Capture only closes on its own element, so inline markup
                // inside a title keeps accumulating text.
                let finished = unescape_xml(text.trim());
                match e.name().as_ref() {
                    b"PMID" if capture == Capture::Pmid => {
                        if let Some(record) = current.as_mut() {
                            record.id = finished;
                        }
                        capture = Capture::None;
                    }
                    b"ArticleTitle" if capture == Capture::ArticleTitle => {
                        if let Some(record) = current.as_mut() {
                            record.title = finished;
                        }
                        capture = Capture::None;
                    }
                    b"Title" if capture == Capture::JournalTitle => {
                        if let Some(record) = current.as_mut() {
                            record.journal = finished;
                        }
                        capture = Capture::None;
                    }
                    b"Year" if capture == Capture::Year => {
                        if let Some(record) = current.as_mut() {
                            record.year = finished.parse().ok();
                        }
                        capture = Capture::None;
                    }
                    b"LastName" if capture == Capture::AuthorLastName => {
                        if let Some(author) = current_author.as_mut() {
                            author.last_name = finished;
                        }
                        capture = Capture::None;
                    }
                    b"ForeName" if capture == Capture::AuthorForeName => {
                        if let Some(author) = current_author.as_mut() {
                            author.fore_name = finished;
                        }
                        capture = Capture::None;
                    }
                    b"Initials" if capture == Capture::AuthorInitials => {
                        if let Some(author) = current_author.as_mut() {
                            author.initials = finished;
                        }
                        capture = Capture::None;
                    }
                    b"Affiliation" if capture == Capture::AuthorAffiliation => {
                        if let Some(author) = current_author.as_mut() {
                            if !finished.is_empty() {
                                author.affiliation = Some(finished);
                            }
                        }
                        capture = Capture::None;
                    }
                    b"Journal" => in_journal = false,
                    b"PubDate" => in_pub_date = false,
                    b"Author" => {
                        if let (Some(record), Some(author)) =
                            (current.as_mut(), current_author.take())
                        {
                            record.authors.push(author);
                        }
                    }
                    b"PubmedArticle" => {
                        if let Some(mut record) = current.take() {
                            if record.id.is_empty() || record.title.is_empty() {
                                warn!(
                                    target: TARGET_WEB_REQUEST,
                                    "Skipping malformed literature record (id={:?})", record.id
                                );
                            } else {
                                record.url =
                                    Some(format!("{}/{}/", ARTICLE_URL_BASE, record.id));
                                records.push(record);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                warn!(
                    target: TARGET_WEB_REQUEST,
                    "Literature XML parse error, keeping {} records: {}",
                    records.len(),
                    err
                );
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" ?>
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">38012345</PMID>
      <Article>
        <Journal>
          <JournalIssue>
            <PubDate><Year>2023</Year><Month>Jun</Month></PubDate>
          </JournalIssue>
          <Title>Journal of Neurosurgery</Title>
        </Journal>
        <ArticleTitle>Thrombectomy outcomes &amp; stroke care</ArticleTitle>
        <AuthorList>
          <Author>
            <LastName>Joyce</LastName>
            <ForeName>Evan</ForeName>
            <Initials>E</Initials>
            <AffiliationInfo>
              <Affiliation>St. Luke's Health System, Boise, Idaho</Affiliation>
            </AffiliationInfo>
          </Author>
          <Author>
            <LastName>Santos</LastName>
            <ForeName>Maria</ForeName>
            <Initials>M</Initials>
          </Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <Article>
        <ArticleTitle>Record without identifier</ArticleTitle>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

    #[test]
    fn test_parse_article_records() {
        let records = parse_article_records(SAMPLE);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.id, "38012345");
        assert_eq!(record.title, "Thrombectomy outcomes & stroke care");
        assert_eq!(record.journal, "Journal of Neurosurgery");
        assert_eq!(record.year, Some(2023));
        assert_eq!(
            record.url.as_deref(),
            Some("https://pubmed.ncbi.nlm.nih.gov/38012345/")
        );
        assert_eq!(record.authors.len(), 2);
        assert_eq!(record.authors[0].last_name, "Joyce");
        assert_eq!(record.authors[0].fore_name, "Evan");
        assert_eq!(
            record.authors[0].affiliation.as_deref(),
            Some("St. Luke's Health System, Boise, Idaho")
        );
        assert!(record.authors[1].affiliation.is_none());
    }

    #[test]
    fn test_malformed_record_skipped_without_aborting_siblings() {
        // The identifier-less second record is dropped; the first survives.
        let records = parse_article_records(SAMPLE);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_empty_and_garbage_input() {
        assert!(parse_article_records("").is_empty());
        assert!(parse_article_records("not xml at all").is_empty());
    }

    #[test]
    fn test_year_outside_pub_date_ignored() {
        let xml = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation>
            <PMID>1</PMID>
            <DateCompleted><Year>1999</Year></DateCompleted>
            <Article>
              <Journal><JournalIssue><PubDate><Year>2020</Year></PubDate></JournalIssue>
              <Title>J</Title></Journal>
              <ArticleTitle>T</ArticleTitle>
            </Article>
        </MedlineCitation></PubmedArticle></PubmedArticleSet>"#;
        let records = parse_article_records(xml);
        assert_eq!(records[0].year, Some(2020));
    }

    #[test]
    fn test_esearch_response_shape() {
        let json = r#"{
            "header": {"type": "esearch"},
            "esearchresult": {
                "count": "87",
                "retmax": "30",
                "idlist": ["38012345", "37098765"]
            }
        }"#;
        let parsed: EsearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.esearchresult.idlist.len(), 2);
        assert_eq!(parsed.esearchresult.count, "87");
    }
}
