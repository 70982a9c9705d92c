//! PubMed Client
//!
//! Two-step E-utilities lookup: `esearch` returns matching PMIDs as JSON,
//! `efetch` returns the article records as XML.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use carewise_core::Source;

use super::records::{PubMedArticle, SourceRecords};
use super::router::FetchTarget;
use super::{send_checked, FetchError, SourceClient};
use crate::models::SourceSettings;

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

pub struct PubMedClient {
    http: reqwest::Client,
    esearch_url: String,
    efetch_url: String,
    api_key: Option<String>,
}

impl PubMedClient {
    pub fn new(http: reqwest::Client, settings: &SourceSettings) -> Self {
        Self {
            http,
            esearch_url: settings.pubmed_esearch_url.clone(),
            efetch_url: settings.pubmed_efetch_url.clone(),
            api_key: settings.pubmed_api_key.clone(),
        }
    }

    fn with_key(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    async fn search_ids(&self, term: &str, limit: usize) -> Result<Vec<String>, FetchError> {
        let params = self.with_key(vec![
            ("db", "pubmed".to_string()),
            ("term", term.to_string()),
            ("retmax", limit.to_string()),
            ("retmode", "json".to_string()),
        ]);
        let response =
            send_checked(self.http.get(&self.esearch_url).query(&params), Source::PubMed).await?;
        let body: ESearchResponse = response.json().await.map_err(|e| FetchError::Decode {
            origin: Source::PubMed,
            message: e.to_string(),
        })?;
        Ok(body.esearchresult.idlist)
    }

    async fn fetch_details(&self, ids: &[String]) -> Result<Vec<PubMedArticle>, FetchError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let params = self.with_key(vec![
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("retmode", "xml".to_string()),
        ]);
        let response =
            send_checked(self.http.get(&self.efetch_url).query(&params), Source::PubMed).await?;
        let xml = response.text().await?;
        parse_efetch_xml(&xml)
    }
}

#[async_trait]
impl SourceClient for PubMedClient {
    fn source(&self) -> Source {
        Source::PubMed
    }

    async fn fetch(&self, target: &FetchTarget, limit: usize) -> Result<SourceRecords, FetchError> {
        let FetchTarget::Search { term } = target else {
            return Err(FetchError::unsupported(Source::PubMed, target));
        };
        let ids = self.search_ids(term, limit).await?;
        tracing::debug!(ids = ids.len(), "PubMed esearch complete");
        Ok(SourceRecords::PubMed(self.fetch_details(&ids).await?))
    }
}

/// Parse an efetch `PubmedArticleSet` document.
///
/// Keeps the full `ArticleTitle` text (inline markup flattened), the first
/// `AbstractText` and the `PubDate/Year`.
pub fn parse_efetch_xml(xml: &str) -> Result<Vec<PubMedArticle>, FetchError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut articles = Vec::new();
    let mut current: Option<PubMedArticle> = None;
    let mut abstract_done = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == "PubmedArticle" {
                    current = Some(PubMedArticle::default());
                    abstract_done = false;
                }
                path.push(name);
            }
            Ok(Event::End(ref e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"PubmedArticle" => {
                        if let Some(article) = current.take() {
                            articles.push(article);
                        }
                    }
                    b"AbstractText" => abstract_done = true,
                    _ => {}
                }
                path.pop();
            }
            Ok(Event::Text(ref e)) => {
                if let Some(article) = current.as_mut() {
                    let text = e.unescape().map_err(|err| FetchError::Xml {
                        origin: Source::PubMed,
                        message: err.to_string(),
                    })?;
                    let in_element = |name: &str| path.iter().any(|p| p == name);

                    if in_element("ArticleTitle") {
                        article
                            .title
                            .get_or_insert_with(String::new)
                            .push_str(&text);
                    } else if in_element("AbstractText") && !abstract_done {
                        article
                            .abstract_text
                            .get_or_insert_with(String::new)
                            .push_str(&text);
                    } else if path.last().map(String::as_str) == Some("Year")
                        && in_element("PubDate")
                        && article.year.is_none()
                    {
                        let year = text.trim();
                        if !year.is_empty() {
                            article.year = Some(year.to_string());
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FetchError::Xml {
                    origin: Source::PubMed,
                    message: e.to_string(),
                })
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(articles)
}
