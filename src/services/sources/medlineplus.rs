//! MedlinePlus Client
//!
//! Queries the health-topics web service. Results arrive as XML `document`
//! elements whose `content` children are keyed by a `name` attribute.

use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use carewise_core::Source;

use super::records::{HealthTopic, SourceRecords};
use super::router::FetchTarget;
use super::{send_checked, FetchError, SourceClient};
use crate::models::SourceSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Summary,
}

fn content_field(e: &BytesStart<'_>) -> Option<Field> {
    e.attributes().flatten().find_map(|attr| {
        if attr.key.as_ref() != b"name" {
            return None;
        }
        match attr.unescape_value().ok()?.as_ref() {
            "title" => Some(Field::Title),
            "FullSummary" => Some(Field::Summary),
            _ => None,
        }
    })
}

fn xml_error(e: impl std::fmt::Display) -> FetchError {
    FetchError::Xml {
        origin: Source::MedlinePlus,
        message: e.to_string(),
    }
}

/// Parse a `nlmSearchResult` document into health topics.
///
/// Text nested inside a content element (highlight spans) is flattened into
/// the field. Only the first occurrence of each field is kept.
pub fn parse_health_topics(xml: &str) -> Result<Vec<HealthTopic>, FetchError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut topics = Vec::new();
    let mut current: Option<HealthTopic> = None;
    // Field being captured and the element depth inside it.
    let mut capture: Option<(Field, usize)> = None;
    let mut value = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if let Some((_, depth)) = capture.as_mut() {
                    *depth += 1;
                } else if e.local_name().as_ref() == b"document" {
                    current = Some(HealthTopic::default());
                } else if current.is_some() && e.local_name().as_ref() == b"content" {
                    if let Some(field) = content_field(e) {
                        capture = Some((field, 0));
                        value.clear();
                    }
                }
            }
            Ok(Event::End(ref e)) => match capture.as_mut() {
                Some((_, depth)) if *depth > 0 => *depth -= 1,
                Some((field, _)) => {
                    let field = *field;
                    capture = None;
                    if let Some(topic) = current.as_mut() {
                        let slot = match field {
                            Field::Title => &mut topic.title,
                            Field::Summary => &mut topic.summary,
                        };
                        if slot.is_none() {
                            *slot = Some(std::mem::take(&mut value));
                        }
                    }
                }
                None => {
                    if e.local_name().as_ref() == b"document" {
                        if let Some(topic) = current.take() {
                            topics.push(topic);
                        }
                    }
                }
            },
            Ok(Event::Text(ref e)) => {
                if capture.is_some() {
                    value.push_str(&e.unescape().map_err(xml_error)?);
                }
            }
            Ok(Event::CData(ref e)) => {
                if capture.is_some() {
                    value.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(topics)
}

pub struct MedlinePlusClient {
    http: reqwest::Client,
    url: String,
}

impl MedlinePlusClient {
    pub fn new(http: reqwest::Client, settings: &SourceSettings) -> Self {
        Self {
            http,
            url: settings.medlineplus_url.clone(),
        }
    }
}

#[async_trait]
impl SourceClient for MedlinePlusClient {
    fn source(&self) -> Source {
        Source::MedlinePlus
    }

    async fn fetch(&self, target: &FetchTarget, limit: usize) -> Result<SourceRecords, FetchError> {
        let FetchTarget::Search { term } = target else {
            return Err(FetchError::unsupported(Source::MedlinePlus, target));
        };
        let params = [
            ("db", "healthTopics".to_string()),
            ("term", term.clone()),
            ("retmax", limit.to_string()),
        ];
        let response =
            send_checked(self.http.get(&self.url).query(&params), Source::MedlinePlus).await?;
        let xml = response.text().await?;
        Ok(SourceRecords::MedlinePlus(parse_health_topics(&xml)?))
    }
}
