use briefing_core::{
    BriefingError, GeoCache, LocationResolver, QWeatherClient, QWeatherProvider, Secrets,
    WeatherProvider, WeatherSettings,
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::path::Path;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const KEY: &str = "test-key";

fn secrets(server: &MockServer) -> Secrets {
    Secrets {
        api_host: server.uri(),
        api_key: KEY.to_string(),
    }
}

fn settings(cache_dir: &Path) -> WeatherSettings {
    WeatherSettings {
        cache_file: Some(cache_dir.join("geo.json")),
        ..WeatherSettings::default()
    }
}

async fn mount_json(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, endpoint: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream unavailable"))
        .mount(server)
        .await;
}

fn nanshan_lookup() -> Value {
    json!({
        "code": "200",
        "location": [
            { "id": "101050311", "name": "南山", "lat": "47.3", "lon": "130.2",
              "adm1": "黑龙江省", "adm2": "鹤岗", "tz": "Asia/Shanghai" },
            { "id": "101280604", "name": "南山", "lat": "22.53122", "lon": "113.92942",
              "adm1": "广东省", "adm2": "深圳", "tz": "Asia/Shanghai" }
        ]
    })
}

#[tokio::test]
async fn client_reports_http_status_and_body() {
    let server = MockServer::start().await;
    mount_status(&server, "/v7/weather/now", 503).await;

    let client = QWeatherClient::with_default_timeout(&secrets(&server)).unwrap();
    let err = client
        .get_json("/v7/weather/now", &[("location", "101280604")])
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(matches!(err, BriefingError::Upstream(_)));
    assert!(msg.contains("HTTP 503"), "{msg}");
    assert!(msg.contains("upstream unavailable"), "{msg}");
}

#[tokio::test]
async fn client_rejects_non_success_provider_code() {
    let server = MockServer::start().await;
    mount_json(&server, "/v7/weather/now", json!({ "code": "401" })).await;

    let client = QWeatherClient::with_default_timeout(&secrets(&server)).unwrap();
    let err = client.get_json("/v7/weather/now", &[]).await.unwrap_err();

    assert!(err.to_string().contains("code=401"));
}

#[tokio::test]
async fn client_accepts_payload_without_code() {
    let server = MockServer::start().await;
    mount_json(&server, "/v7/weather/now", json!({ "now": {} })).await;

    let client = QWeatherClient::with_default_timeout(&secrets(&server)).unwrap();
    let data = client.get_json("/v7/weather/now", &[]).await.unwrap();

    assert!(data.get("now").is_some());
}

#[tokio::test]
async fn resolver_picks_best_candidate_and_caches_it() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/v2/city/lookup"))
        .and(query_param("location", "深圳市南山区"))
        .and(query_param("number", "10"))
        .and(query_param("range", "cn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nanshan_lookup()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("geo.json");
    let client = QWeatherClient::with_default_timeout(&secrets(&server)).unwrap();
    let resolver = LocationResolver::new(client, GeoCache::open(&cache_path), "cn");

    let first = resolver.resolve("深圳市南山区").await.unwrap();
    assert_eq!(first.id, "101280604");
    assert_eq!(first.adm2.as_deref(), Some("深圳"));
    assert_eq!(first.lat, 22.53122);

    // Served from the cache; the mock only allows a single request.
    let second = resolver.resolve("  深圳市南山区 ").await.unwrap();
    assert_eq!(second, first);

    let reopened = GeoCache::open(&cache_path);
    assert_eq!(reopened.get("深圳市南山区"), Some(first));
}

#[tokio::test]
async fn resolver_fails_on_empty_lookup() {
    let server = MockServer::start().await;
    mount_json(&server, "/geo/v2/city/lookup", json!({ "code": "200", "location": [] })).await;

    let dir = tempfile::tempdir().unwrap();
    let client = QWeatherClient::with_default_timeout(&secrets(&server)).unwrap();
    let resolver = LocationResolver::new(client, GeoCache::open(dir.path().join("geo.json")), "");

    let err = resolver.resolve("不存在的地方").await.unwrap_err();
    match err {
        BriefingError::Lookup { query, .. } => assert_eq!(query, "不存在的地方"),
        other => panic!("unexpected error: {other}"),
    }
}

async fn mount_weather(server: &MockServer) {
    mount_json(server, "/geo/v2/city/lookup", nanshan_lookup()).await;
    mount_json(
        server,
        "/v7/weather/now",
        json!({ "code": "200", "now": { "windDir": "东南风", "windScale": "3", "windSpeed": "12" } }),
    )
    .await;
    mount_json(
        server,
        "/v7/weather/3d",
        json!({ "code": "200", "daily": [{
            "fxDate": "2024-05-01", "tempMin": "21", "tempMax": "29",
            "textDay": "多云", "textNight": "阵雨", "uvIndex": "9"
        }]}),
    )
    .await;
    mount_json(
        server,
        "/v7/weather/24h",
        json!({ "code": "200", "hourly": [
            { "fxTime": "2024-05-01T08:00+08:00", "pop": "20" },
            { "fxTime": "2024-05-01T09:00+08:00", "pop": "60" },
            { "fxTime": "2024-05-02T00:00+08:00", "pop": "90" }
        ]}),
    )
    .await;
}

#[tokio::test]
async fn provider_merges_all_endpoints() {
    let server = MockServer::start().await;
    mount_weather(&server).await;
    mount_json(&server, "/v7/air/now", json!({ "code": "200", "now": { "aqi": "160" } })).await;
    Mock::given(method("GET"))
        .and(path("/v7/indices/1d"))
        .and(query_param("type", "3,5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "200",
            "daily": [{ "type": "3", "name": "穿衣指数", "text": "建议着短衫。" }]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let provider = QWeatherProvider::new(&secrets(&server), settings(dir.path())).unwrap();

    let record = provider.today("深圳市南山区").await.unwrap();

    assert_eq!(record.query_city, "深圳市南山区");
    assert_eq!(record.location_id, "101280604");
    assert_eq!(record.target_date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    assert_eq!(record.weather_desc.as_deref(), Some("多云转阵雨"));
    // The next day's 90% is outside today.
    assert_eq!(record.precipitation_prob, Some(0.6));
    assert_eq!(record.wind_desc.as_deref(), Some("东南风 3级"));
    assert_eq!(record.aqi, Some(160));
    assert_eq!(record.aqi_desc.as_deref(), Some("中度污染"));
    assert_eq!(record.clothing_advice.as_deref(), Some("建议着短衫。"));
}

#[tokio::test]
async fn provider_degrades_when_optional_endpoints_fail() {
    let server = MockServer::start().await;
    mount_weather(&server).await;
    mount_status(&server, "/v7/air/now", 500).await;
    mount_json(&server, "/v7/indices/1d", json!({ "code": "403" })).await;

    let dir = tempfile::tempdir().unwrap();
    let provider = QWeatherProvider::new(&secrets(&server), settings(dir.path())).unwrap();

    let record = provider.today("深圳市南山区").await.unwrap();

    assert_eq!(record.temp_max_c, Some(29.0));
    assert_eq!(record.aqi, None);
    assert_eq!(record.aqi_desc, None);
    assert_eq!(record.clothing_advice, None);
    assert_eq!(record.uv_desc.as_deref(), Some("9（高）"));
}

#[tokio::test]
async fn provider_fails_when_required_endpoint_fails() {
    let server = MockServer::start().await;
    mount_json(&server, "/geo/v2/city/lookup", nanshan_lookup()).await;
    mount_json(&server, "/v7/weather/now", json!({ "code": "200", "now": {} })).await;
    mount_status(&server, "/v7/weather/3d", 502).await;

    let dir = tempfile::tempdir().unwrap();
    let provider = QWeatherProvider::new(&secrets(&server), settings(dir.path())).unwrap();

    let err = provider.today("深圳市南山区").await.unwrap_err();
    assert!(err.to_string().contains("HTTP 502"));
}

#[tokio::test]
async fn provider_locate_uses_resolver() {
    let server = MockServer::start().await;
    mount_json(&server, "/geo/v2/city/lookup", nanshan_lookup()).await;

    let dir = tempfile::tempdir().unwrap();
    let provider = QWeatherProvider::new(&secrets(&server), settings(dir.path())).unwrap();

    let location = provider.locate("深圳市南山区").await.unwrap();
    assert_eq!(location.name, "南山");
    assert_eq!(location.tz.as_deref(), Some("Asia/Shanghai"));
}
