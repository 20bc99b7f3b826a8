//! End-to-end over a real listener.

mod common;

use common::{shell, Fixture};
use page_router::config::Mode;
use page_router::lifecycle::{self, Shutdown};
use page_router::{page_fn, PageRegistry, Pages, RenderContext};
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::test]
async fn test_serve_production_until_shutdown() {
    let fixture = Fixture::new(Mode::Production);
    fixture
        .route("index.tsx", "x")
        .route("user/_id.tsx", "x")
        .output("app.js", b"export const answer = 42; export const question = 'unknown';");

    let pages = Pages::new(
        PageRegistry::new().with(
            "UserId",
            page_fn(|ctx: &RenderContext| {
                Ok(shell("User", &format!("user {}", ctx.params.get("id").unwrap_or_default())))
            }),
        ),
        PageRegistry::new(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = tokio::spawn(lifecycle::serve(fixture.config.clone(), pages, listener, shutdown.clone()));

    let client = reqwest::Client::new();

    let response = client.get(format!("http://{}/user/123", addr)).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/html; charset=utf-8");
    assert!(response.text().await.unwrap().contains("user 123"));

    let response = client
        .get(format!("http://{}/app.js", addr))
        .header("accept-encoding", "identity")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers()["etag"].to_str().unwrap().starts_with("W/\""));
    assert_eq!(
        response.text().await.unwrap(),
        "export const answer = 42; export const question = 'unknown';"
    );

    let response = client.get(format!("http://{}/nope", addr)).send().await.unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(response.text().await.unwrap(), "404 Not Found");

    assert!(fixture.dir.path().join("dist/routes.server.json").exists());

    drop(client);
    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(10), server)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
