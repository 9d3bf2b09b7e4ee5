use serde_json::json;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use reelgate::error::AppError;
use reelgate::services::providers::{CatalogProvider, TmdbProvider};

const API_KEY: &str = "test-key";

async fn provider_for(server: &MockServer) -> TmdbProvider {
    TmdbProvider::new(API_KEY.to_string(), server.uri(), None)
}

#[tokio::test]
async fn test_trending_parses_list_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trending/movie/week"))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": [
                {
                    "id": 862,
                    "title": "Toy Story",
                    "overview": "Toys come alive.",
                    "genre_ids": [16, 35, 10751],
                    "vote_average": 7.97,
                    "adult": false,
                    "release_date": "1995-10-30",
                    "poster_path": "/toy.jpg"
                },
                {
                    "id": 1,
                    "name": "Untitled Series",
                    "genre_ids": [],
                    "release_date": ""
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let items = provider_for(&server).await.trending().await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Toy Story");
    assert_eq!(items[0].genre_ids, vec![16, 35, 10751]);
    assert_eq!(items[0].release_year(), Some(1995));
    assert_eq!(items[1].title, "Untitled Series");
    assert_eq!(items[1].release_date, None);
    assert_eq!(items[1].vote_average, 0.0);
}

#[tokio::test]
async fn test_by_genre_uses_discover() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("with_genres", "16"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let items = provider_for(&server).await.by_genre(16).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_search_sends_trimmed_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "toy story"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": 862, "title": "Toy Story", "genre_ids": [16] }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let items = provider_for(&server)
        .await
        .search("  toy story ")
        .await
        .unwrap();
    assert_eq!(items[0].id, 862);
}

#[test]
fn test_blank_search_is_rejected_without_a_request() {
    let provider = TmdbProvider::new(API_KEY.to_string(), "http://127.0.0.1:9".to_string(), None);
    let result = tokio_test::block_on(provider.search("   "));
    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn test_details_reads_detail_shaped_genres() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/862"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 862,
            "title": "Toy Story",
            "genres": [
                { "id": 16, "name": "Animation" },
                { "id": 35, "name": "Comedy" }
            ],
            "vote_average": 7.9
        })))
        .mount(&server)
        .await;

    let item = provider_for(&server).await.details(862).await.unwrap();
    assert_eq!(item.map(|i| i.genre_ids), Some(vec![16, 35]));
}

#[tokio::test]
async fn test_details_not_found_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status_code": 34,
            "status_message": "The resource you requested could not be found."
        })))
        .mount(&server)
        .await;

    let item = provider_for(&server).await.details(404).await.unwrap();
    assert_eq!(item, None);
}

#[tokio::test]
async fn test_trailers_keep_youtube_trailers_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/862/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 862,
            "results": [
                { "key": "teaser", "name": "Teaser", "site": "YouTube", "type": "Teaser" },
                { "key": "vimeo", "name": "Trailer", "site": "Vimeo", "type": "Trailer" },
                { "key": "abc123", "name": "Official Trailer", "site": "YouTube", "type": "Trailer" }
            ]
        })))
        .mount(&server)
        .await;

    let trailers = provider_for(&server).await.trailers(862).await.unwrap();
    let keys: Vec<&str> = trailers.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, vec!["abc123"]);
}

#[tokio::test]
async fn test_genre_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/genre/movie/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "genres": [{ "id": 28, "name": "Action" }, { "id": 16, "name": "Animation" }]
        })))
        .mount(&server)
        .await;

    let genres = provider_for(&server).await.genres().await.unwrap();
    assert_eq!(genres.len(), 2);
    assert_eq!(genres[1].name, "Animation");
}

#[tokio::test]
async fn test_upstream_failure_is_external_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status_message": "Invalid API key"
        })))
        .mount(&server)
        .await;

    let result = provider_for(&server).await.popular().await;
    match result {
        Err(AppError::ExternalApi(message)) => assert!(message.contains("401")),
        other => panic!("expected ExternalApi error, got {:?}", other.map(|v| v.len())),
    }
}

#[tokio::test]
async fn test_malformed_body_is_external_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/top_rated"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = provider_for(&server).await.top_rated().await;
    assert!(matches!(result, Err(AppError::ExternalApi(_))));
}
