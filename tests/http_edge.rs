mod support;

#[tokio::test]
async fn when_route_is_unknown_then_returns_404_json_with_edge_headers() {
    let res = reqwest::get(support::http_url("/does-not-exist"))
        .await
        .expect("request should succeed");

    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    let headers = res.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-xss-protection"], "1; mode=block");
    assert_eq!(headers["surrogate-control"], "no-store");
    assert_eq!(headers["pragma"], "no-cache");
    assert_eq!(headers["expires"], "0");
    assert_eq!(headers["x-powered-by"], "PHP 7.4.3");
    assert!(
        headers["cache-control"]
            .to_str()
            .expect("ascii header")
            .contains("no-store")
    );

    let body: serde_json::Value = res.json().await.expect("json body");
    assert_eq!(body["error"], "not found");
}

#[tokio::test]
async fn when_ws_route_is_hit_without_upgrade_then_request_is_rejected() {
    let res = reqwest::get(support::http_url("/ws"))
        .await
        .expect("request should succeed");

    assert!(res.status().is_client_error());
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
}
