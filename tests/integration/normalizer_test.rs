//! Normalizer Integration Tests
//!
//! Raw upstream payloads parsed by the source clients, then normalized.

use carewise::services::evidence::normalize;
use carewise::services::sources::{
    cdc, clinical_trials, medlineplus, pubmed, who, RawResults, SourceRecords,
};
use carewise_core::{is_placeholder_content, Source};

const EFETCH: &str = r#"<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <Article>
        <Journal><JournalIssue><PubDate><Year>2024</Year></PubDate></JournalIssue></Journal>
        <ArticleTitle>Anti-CD19 CAR-T   cells in <i>refractory</i> lymphoma</ArticleTitle>
        <Abstract><AbstractText>Durable responses were observed.</AbstractText></Abstract>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation><Article><ArticleTitle>Letter</ArticleTitle></Article></MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

const STUDIES: &str = r#"{"studies": [{"protocolSection": {
    "identificationModule": {"nctId": "NCT04000000", "briefTitle": "Dose Escalation"},
    "conditionsModule": {"conditions": ["Lymphoma"]}
}}]}"#;

const MEDLINE: &str = r#"<nlmSearchResult><list>
  <document><content name="title">High Blood Pressure</content>
  <content name="FullSummary">&lt;p&gt;Blood pressure is the force of blood.&lt;/p&gt;</content></document>
</list></nlmSearchResult>"#;

#[test]
fn test_biomedical_payloads_normalize() {
    let mut raw = RawResults::new();
    raw.insert(SourceRecords::ClinicalTrials(
        clinical_trials::parse_studies(STUDIES).unwrap(),
    ));
    raw.insert(SourceRecords::PubMed(pubmed::parse_efetch_xml(EFETCH).unwrap()));

    let evidence = normalize(&raw);
    assert_eq!(evidence.len(), 3);

    // PubMed precedes ClinicalTrials regardless of insertion order.
    assert_eq!(evidence[0].source, Source::PubMed);
    assert_eq!(evidence[0].title, "Anti-CD19 CAR-T cells in refractory lymphoma");
    assert_eq!(evidence[0].id, "PMID-Anti-CD19 CAR-T cell");
    assert_eq!(evidence[0].metadata["year"], "2024");

    assert_eq!(evidence[1].id, "PMID-Letter");
    assert!(is_placeholder_content(&evidence[1].content));

    assert_eq!(evidence[2].id, "NCT04000000");
    assert_eq!(
        evidence[2].content,
        "Conditions: Lymphoma\nStatus: Unknown\nPhase: Not specified"
    );
}

#[test]
fn test_general_health_payloads_normalize() {
    let mut raw = RawResults::new();
    raw.insert(SourceRecords::Who(
        who::parse_observations(
            r#"{"value": [{"SpatialDim": "BRA", "TimeDim": 2015, "NumericValue": 23.1}]}"#,
            "NCD_HYP_PREVALENCE_A",
            "hypertension",
            20,
        )
        .unwrap(),
    ));
    raw.insert(SourceRecords::Cdc(
        cdc::parse_rows(r#"[{"cause_name": "Stroke"}]"#, "hypertension").unwrap(),
    ));
    raw.insert(SourceRecords::MedlinePlus(
        medlineplus::parse_health_topics(MEDLINE).unwrap(),
    ));

    let evidence = normalize(&raw);
    let sources: Vec<Source> = evidence.iter().map(|e| e.source).collect();
    assert_eq!(sources, vec![Source::MedlinePlus, Source::Cdc, Source::Who]);

    assert_eq!(evidence[0].id, "MLP-High Blood Pressure");
    assert_eq!(evidence[0].content, "Blood pressure is the force of blood.");

    assert_eq!(evidence[1].title, "No title");
    assert_eq!(evidence[1].content, "No description available");

    assert_eq!(evidence[2].id, "WHO-NCD_HYP_PREVALENCE_A-BRA-2015");
    assert_eq!(evidence[2].title, "Hypertension - BRA (2015)");
    assert_eq!(evidence[2].metadata["type"], "health_statistic");
}
