use std::time::Duration;

use notifier_core::{Identifier, SearchParams};
use notifier_engine::{EutilsFetcher, FailureKind, FetchSettings, Fetcher};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE_XML: &str = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2019//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_190101.dtd">
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">222</PMID>
      <Article PubModel="Print">
        <Journal>
          <JournalIssue CitedMedium="Internet">
            <PubDate><Year>2020</Year><Month>Jan</Month></PubDate>
          </JournalIssue>
          <Title>Nature reviews. Cancer</Title>
          <ISOAbbreviation>Nat Rev Cancer</ISOAbbreviation>
        </Journal>
        <ArticleTitle>Tumour <i>in vivo</i> models &amp; beyond.</ArticleTitle>
        <Abstract>
          <AbstractText Label="BACKGROUND">First part
            spans lines.</AbstractText>
          <AbstractText Label="RESULTS">Second part.</AbstractText>
        </Abstract>
        <AuthorList CompleteYN="Y">
          <Author ValidYN="Y"><LastName>Doe</LastName><ForeName>Jane</ForeName><Initials>J</Initials></Author>
          <Author ValidYN="Y"><LastName>Roe</LastName><ForeName>Richard A</ForeName><Initials>RA</Initials></Author>
        </AuthorList>
      </Article>
      <CommentsCorrectionsList>
        <CommentsCorrections RefType="Cites"><PMID Version="1">999</PMID></CommentsCorrections>
      </CommentsCorrectionsList>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>
"#;

fn fetcher_for(server: &MockServer) -> EutilsFetcher {
    let settings = FetchSettings {
        base_url: server.uri(),
        email: Some("me@example.org".to_string()),
        ..FetchSettings::default()
    };
    EutilsFetcher::new(settings).expect("client")
}

#[tokio::test]
async fn search_returns_identifiers_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("term", "cancer"))
        .and(query_param("retstart", "0"))
        .and(query_param("retmax", "50"))
        .and(query_param("retmode", "json"))
        .and(query_param("mindate", "2020/01/01"))
        .and(query_param("maxdate", "3000"))
        .and(query_param("email", "me@example.org"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"header":{"type":"esearch"},"esearchresult":{"count":"3","idlist":["333","111","222"]}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let params = SearchParams {
        retstart: 0,
        retmax: 50,
        mindate: Some("2020/01/01".to_string()),
        maxdate: None,
    };
    let ids = fetcher_for(&server).search("cancer", &params).await.unwrap();
    let ids: Vec<&str> = ids.iter().map(Identifier::as_str).collect();
    assert_eq!(ids, vec!["333", "111", "222"]);
}

#[tokio::test]
async fn search_api_error_is_typed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"esearchresult":{"ERROR":"Invalid query syntax"}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .search("((", &SearchParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Api("Invalid query syntax".to_string()));
}

#[tokio::test]
async fn search_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .search("cancer", &SearchParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(429));
}

#[tokio::test]
async fn search_rejects_garbage_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .search("cancer", &SearchParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn metadata_is_decoded_from_article_xml() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "222"))
        .and(query_param("retmode", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ARTICLE_XML, "text/xml"))
        .mount(&server)
        .await;

    let meta = fetcher_for(&server)
        .fetch_metadata(&Identifier::from("222"))
        .await
        .unwrap();
    assert_eq!(meta.title, "Tumour in vivo models & beyond.");
    assert_eq!(meta.venue, "Nat Rev Cancer");
    assert_eq!(meta.year.as_deref(), Some("2020"));
    assert_eq!(meta.authors, vec!["Doe J".to_string(), "Roe RA".to_string()]);
    assert_eq!(
        meta.abstract_text.as_deref(),
        Some("First part spans lines. Second part.")
    );
}

const BOOK_CHAPTER_XML: &str = r#"<?xml version="1.0" ?>
<PubmedArticleSet>
  <PubmedBookArticle>
    <BookDocument>
      <PMID Version="1">20301295</PMID>
      <ArticleIdList><ArticleId IdType="bookaccession">NBK1109</ArticleId></ArticleIdList>
      <Book>
        <Publisher>
          <PublisherName>University of Washington, Seattle</PublisherName>
          <PublisherLocation>Seattle (WA)</PublisherLocation>
        </Publisher>
        <BookTitle book="gene">GeneReviews</BookTitle>
        <PubDate><Year>1993</Year></PubDate>
        <AuthorList Type="editors">
          <Author><LastName>Adam</LastName><ForeName>Margaret P</ForeName><Initials>MP</Initials></Author>
        </AuthorList>
      </Book>
      <ArticleTitle book="gene" part="nf1">Neurofibromatosis 1</ArticleTitle>
      <AuthorList Type="authors">
        <Author><LastName>Friedman</LastName><ForeName>Jan M</ForeName><Initials>JM</Initials></Author>
      </AuthorList>
      <Abstract><AbstractText Label="CLINICAL CHARACTERISTICS">Chapter summary.</AbstractText></Abstract>
    </BookDocument>
  </PubmedBookArticle>
</PubmedArticleSet>
"#;

#[tokio::test]
async fn book_chapter_metadata_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "20301295"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(BOOK_CHAPTER_XML, "text/xml"))
        .mount(&server)
        .await;

    let meta = fetcher_for(&server)
        .fetch_metadata(&Identifier::from("20301295"))
        .await
        .unwrap();
    assert_eq!(meta.title, "Neurofibromatosis 1");
    assert_eq!(meta.venue, "GeneReviews");
    assert_eq!(meta.year.as_deref(), Some("1993"));
    assert_eq!(meta.authors, vec!["Friedman JM".to_string()]);
    assert_eq!(meta.abstract_text.as_deref(), Some("Chapter summary."));
}

#[tokio::test]
async fn empty_article_set_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<?xml version=\"1.0\" ?><PubmedArticleSet></PubmedArticleSet>", "text/xml"),
        )
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .fetch_metadata(&Identifier::from("404"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn other_pmid_in_response_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ARTICLE_XML, "text/xml"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server)
        .fetch_metadata(&Identifier::from("999"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::NotFound);
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = EutilsFetcher::new(settings).unwrap();
    let err = fetcher
        .fetch_metadata(&Identifier::from("1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/json")
                .set_body_string("{\"esearchresult\":{}}"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        base_url: server.uri(),
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let fetcher = EutilsFetcher::new(settings).unwrap();
    let err = fetcher
        .search("x", &SearchParams::default())
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(20)
        }
    );
}
