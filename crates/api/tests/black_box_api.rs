use std::time::Duration;

use aesthetica_infra::CatalogConfig;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory backends, ephemeral port.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let config = CatalogConfig {
            public_base_url: format!("{base_url}/files"),
            ..CatalogConfig::default()
        };
        let app = aesthetica_api::app::build_app(&config)
            .await
            .expect("failed to build app");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn product(name: &str, sku: &str, category: &str, stock: i64) -> Value {
    json!({
        "name": name,
        "slug": name.to_lowercase().replace(' ', "-"),
        "sku": sku,
        "category": category,
        "description": format!("{name} for professional use"),
        "price": 100.0,
        "stock": stock,
        "isActive": true,
    })
}

async fn create(client: &reqwest::Client, srv: &TestServer, path: &str, body: Value) -> String {
    let res = client.post(srv.url(path)).json(&body).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn names(client: &reqwest::Client, url: String) -> Vec<String> {
    let res = client.get(url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Vec<Value> = res.json().await.unwrap();
    body.iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_reports_wired_backends() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn product_lifecycle_create_patch_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let id = create(&client, &srv, "/products", product("Profhilo Structura", "PRF-01", "fillers", 12)).await;

    let res = client.get(srv.url(&format!("/products/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["sku"], "PRF-01");
    assert!(body["createdAt"].is_string());

    let res = client
        .patch(srv.url(&format!("/products/{id}")))
        .json(&json!({ "price": 149.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(srv.url("/products/slug/profhilo-structura"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["price"], 149.5);
    assert_eq!(body["name"], "Profhilo Structura");

    let res = client.delete(srv.url(&format!("/products/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.get(srv.url(&format!("/products/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn all_slug_and_bad_ids_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/products/slug/all")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(srv.url("/products/%20")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn cached_listing_lags_writes_until_fresh_read() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create(&client, &srv, "/products", product("Sunekos 200", "SUN-200", "boosters", 30)).await;
    assert_eq!(names(&client, srv.url("/products")).await, vec!["Sunekos 200"]);

    create(&client, &srv, "/products", product("Jalupro HMW", "JAL-01", "boosters", 30)).await;

    // The default policy keeps serving the cached listing.
    assert_eq!(names(&client, srv.url("/products")).await, vec!["Sunekos 200"]);
    assert_eq!(
        names(&client, srv.url("/products?fresh=true")).await,
        vec!["Jalupro HMW", "Sunekos 200"]
    );
}

#[tokio::test]
async fn storefront_queries_and_stats() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut featured = product("Lumi Eyes", "LUM-01", "peels", 4);
    featured["featured"] = json!(true);
    create(&client, &srv, "/products", featured).await;
    create(&client, &srv, "/products", product("Hydro Peel", "HYD-01", "peels", 50)).await;
    let mut hidden = product("Old Serum", "OLD-01", "serums", 0);
    hidden["isActive"] = json!(false);
    create(&client, &srv, "/products", hidden).await;

    assert_eq!(names(&client, srv.url("/products/featured?limit=5")).await, vec!["Lumi Eyes"]);
    assert_eq!(
        names(&client, srv.url("/products/category/peels")).await,
        vec!["Hydro Peel", "Lumi Eyes"]
    );
    assert_eq!(
        names(&client, srv.url("/products/low-stock?threshold=5")).await,
        vec!["Old Serum", "Lumi Eyes"]
    );
    assert_eq!(names(&client, srv.url("/products/search?q=PEEL")).await.len(), 2);
    assert!(names(&client, srv.url("/products/search?q=serum")).await.is_empty());

    let stats: Value = client
        .get(srv.url("/products/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["active"], 2);
    assert_eq!(stats["inactive"], 1);
    assert_eq!(stats["featured"], 1);
    assert_eq!(stats["outOfStock"], 1);
    assert_eq!(stats["byCategory"]["peels"], 2);
}

#[tokio::test]
async fn bulk_update_and_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let a = create(&client, &srv, "/products", product("Mesoline A", "MES-A", "meso", 10)).await;
    let b = create(&client, &srv, "/products", product("Mesoline B", "MES-B", "meso", 10)).await;

    let res = client
        .post(srv.url("/products/bulk/update"))
        .json(&json!({ "ids": [a, b], "patch": { "isActive": false } }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["processed"], 2);
    assert!(names(&client, srv.url("/products/category/meso")).await.is_empty());

    for bad in ["", "products/x"] {
        let res = client
            .post(srv.url("/products/bulk/delete"))
            .json(&json!({ "ids": [a, bad] }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "invalid_id");
    }
    assert_eq!(names(&client, srv.url("/products?fresh=true")).await.len(), 2);

    let res = client
        .post(srv.url("/products/bulk/delete"))
        .json(&json!({ "ids": [a, b] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(names(&client, srv.url("/products?fresh=true")).await.is_empty());
}

#[tokio::test]
async fn product_image_upload_serve_and_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let id = create(&client, &srv, "/products", product("Ejal40", "EJA-40", "boosters", 8)).await;

    let res = client
        .post(srv.url(&format!("/products/{id}/images?fileName=front%20view.png")))
        .body(b"\x89PNG fake".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    let url = body["url"].as_str().unwrap().to_string();
    assert_eq!(url, srv.url(&format!("/files/products/{id}/front_view.png")));

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "image/png");
    assert_eq!(res.bytes().await.unwrap().as_ref(), b"\x89PNG fake");

    let res = client
        .delete(srv.url("/products/images"))
        .query(&[("url", url.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_size_photos_upload_past_the_default_body_limit() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let id = create(&client, &srv, "/products", product("Lift Kit", "LFT-1", "threads", 3)).await;

    let photo = vec![0u8; 6 * 1024 * 1024];
    let res = client
        .post(srv.url(&format!("/products/{id}/images?fileName=hero.jpg")))
        .header("content-type", "image/jpeg")
        .body(photo.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();

    let res = client.get(body["url"].as_str().unwrap()).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.bytes().await.unwrap().len(), photo.len());
}

#[tokio::test]
async fn served_files_ignore_the_declared_content_type() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let id = create(&client, &srv, "/products", product("Peel Kit", "PEL-1", "peels", 3)).await;

    let res = client
        .post(srv.url(&format!("/products/{id}/images?fileName=page.png")))
        .header("content-type", "text/html")
        .body("<script>alert(1)</script>")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();

    let res = client.get(body["url"].as_str().unwrap()).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "image/png");
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");

    let res = client
        .post(srv.url(&format!("/products/{id}/images?fileName=page.html")))
        .header("content-type", "text/html")
        .body("<script>alert(1)</script>")
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let res = client.get(body["url"].as_str().unwrap()).send().await.unwrap();
    assert_eq!(res.headers()["content-type"], "application/octet-stream");
}

#[tokio::test]
async fn event_registration_stops_at_capacity() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let id = create(
        &client,
        &srv,
        "/events",
        json!({
            "title": "Advanced Threads Workshop",
            "slug": "advanced-threads-workshop",
            "startsAt": (Utc::now() + ChronoDuration::days(14)).to_rfc3339(),
            "capacity": 1,
            "isActive": true,
        }),
    )
    .await;

    let upcoming: Vec<Value> = client
        .get(srv.url("/events/upcoming"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(upcoming.len(), 1);

    let res = client.post(srv.url(&format!("/events/{id}/register"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["registeredCount"], 1);

    let res = client.post(srv.url(&format!("/events/{id}/register"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn brands_crud_and_active_ordering() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let second = create(&client, &srv, "/brands", json!({ "name": "Croma", "slug": "croma", "isActive": true, "order": 2 })).await;
    create(&client, &srv, "/brands", json!({ "name": "IBSA", "slug": "ibsa", "isActive": true, "order": 1 })).await;

    assert_eq!(names(&client, srv.url("/brands/active")).await, vec!["IBSA", "Croma"]);

    let res = client
        .patch(srv.url(&format!("/brands/{second}")))
        .json(&json!({ "isActive": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(names(&client, srv.url("/brands/active")).await, vec!["IBSA"]);

    let res = client.get(srv.url("/brands/slug/croma")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.delete(srv.url(&format!("/brands/{second}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = client.get(srv.url(&format!("/brands/{second}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn media_upload_list_and_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/media?fileName=hero.jpg&folder=homepage&alt=Clinic"))
        .body(b"jpeg bytes".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let asset: Value = res.json().await.unwrap();
    assert_eq!(asset["folder"], "homepage");
    assert_eq!(asset["alt"], "Clinic");
    assert_eq!(asset["contentType"], "image/jpeg");
    let id = asset["id"].as_str().unwrap().to_string();
    let url = asset["url"].as_str().unwrap().to_string();

    let listed: Vec<Value> = client
        .get(srv.url("/media?folder=homepage"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let res = client.delete(srv.url(&format!("/media/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(client.get(&url).send().await.unwrap().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_stream_pushes_listing_on_change() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut stream = client
        .get(srv.url("/products/stream?category=lasers"))
        .send()
        .await
        .unwrap();
    assert_eq!(stream.status(), StatusCode::OK);

    let mut seen = String::new();
    read_until(&mut stream, &mut seen, "event: products").await;

    create(&client, &srv, "/products", product("Fractional Tip", "LAS-01", "lasers", 3)).await;
    read_until(&mut stream, &mut seen, "Fractional Tip").await;
}

async fn read_until(res: &mut reqwest::Response, seen: &mut String, needle: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !seen.contains(needle) {
            let chunk = res.chunk().await.unwrap().expect("stream ended");
            seen.push_str(&String::from_utf8_lossy(&chunk));
        }
    })
    .await
    .expect("timed out waiting for stream data");
}
