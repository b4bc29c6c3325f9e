use std::time::Duration;

use esg_signals::{
    content::ArticleContentFetcher,
    gdelt::{ClientSettings, GdeltClient},
    ingest::{BatchIngestor, DateWindow, IngestSettings, TargetEntity},
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const SEARCH_PATH: &str = "/api/v2/doc/doc";

fn settings() -> IngestSettings {
    IngestSettings {
        rate_limit_delay: Duration::ZERO,
        ..IngestSettings::default()
    }
}

fn ingestor_for(server: &MockServer, settings: IngestSettings) -> BatchIngestor<GdeltClient, ArticleContentFetcher> {
    let client = GdeltClient::new(&ClientSettings {
        base_url: format!("{}{}", server.uri(), SEARCH_PATH),
        ..ClientSettings::default()
    })
    .unwrap();
    BatchIngestor::new(client, ArticleContentFetcher::new(), settings)
}

fn window() -> DateWindow {
    DateWindow::new("20230101", "20230102")
}

#[tokio::test]
async fn test_batch_downloads_article_bodies() {
    let mock_server = MockServer::start().await;
    let story_url = format!("{}/story", mock_server.uri());

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("query", "\"Acme Holdings\" sourcelang:english"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "articles": [
                {"url": story_url, "seendate": "20230101T093000Z", "sourcecountry": "Ireland"},
                {"url": format!("{}/missing", mock_server.uri()), "seendate": "20230101T100000Z", "sourcecountry": "Ireland"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("query", "\"Globex\" sourcelang:english"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/story"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                "<html><body><article><p>Acme Holdings committed to halving water use across \
                 all of its bottling plants by 2030, according to its annual filing.</p>\
                 </article></body></html>",
                "text/html",
            ),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let entities = vec![TargetEntity::new(1, " Acme   Holdings"), TargetEntity::new(2, "Globex")];
    let report = ingestor_for(&mock_server, settings())
        .run(&entities, &window())
        .await
        .unwrap();

    assert!(report.abort.is_none());
    assert_eq!(report.results.len(), 2);

    let acme = &report.results[0];
    assert_eq!(acme.entity_id, 1);
    assert!(acme.has_content);
    assert_eq!(acme.articles.len(), 2);
    assert!(acme.articles[0].content.contains("halving water use"));
    assert_eq!(acme.articles[1].content, "");

    let globex = &report.results[1];
    assert_eq!(globex.entity_id, 2);
    assert!(!globex.has_content);
}

#[tokio::test]
async fn test_outage_aborts_batch_with_prefix() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let entities: Vec<TargetEntity> = (1..=5)
        .map(|id| TargetEntity::new(id, format!("Org {id}")))
        .collect();
    let report = ingestor_for(
        &mock_server,
        IngestSettings {
            max_consecutive_failures: 2,
            ..settings()
        },
    )
    .run(&entities, &window())
    .await
    .unwrap();

    assert_eq!(report.results.len(), 2);
    assert!(report.results.iter().all(|r| !r.has_content));
    let abort = report.abort.unwrap();
    assert_eq!(abort.consecutive_failures, 3);
    assert!(abort.last_error.contains("overloaded"));
}

#[tokio::test]
async fn test_report_serializes_for_persistence() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"articles": []}"#))
        .mount(&mock_server)
        .await;

    let report = ingestor_for(&mock_server, settings())
        .run(&[TargetEntity::new(7, "Initech")], &window())
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["results"][0]["entity_id"], 7);
    assert_eq!(json["results"][0]["has_content"], false);
    assert!(json["abort"].is_null());
}
