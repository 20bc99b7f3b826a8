//! Request dispatch through the full middleware stack.

mod common;

use axum::http::{header, StatusCode};
use common::{get, get_with, send, shell, text, Fixture};
use page_router::config::Mode;
use page_router::render::{HYDRATION_SCRIPT, SHELL_SEAM};
use page_router::{page_fn, PageRegistry, Pages, RenderContext, RenderError};

fn site_pages() -> Pages {
    let server = PageRegistry::new()
        .with("Index", page_fn(|_: &RenderContext| Ok(shell("Home", "<main>home</main>"))))
        .with(
            "UserId",
            page_fn(|ctx: &RenderContext| {
                let id = ctx.params.get("id").unwrap_or_default();
                Ok(shell("User", &format!("<p>user {}</p>", id)))
            }),
        )
        .with("_404", page_fn(|_: &RenderContext| Ok(shell("Missing", "<h1>not here</h1>"))));
    let client = PageRegistry::new().with(
        "Index",
        page_fn(|_: &RenderContext| Ok("<div>client home</div>".to_string())),
    );
    Pages::new(server, client)
}

fn site(mode: Mode) -> Fixture {
    let fixture = Fixture::new(mode);
    fixture
        .route("index.tsx", "export default () => null;")
        .route("index.client.tsx", "export default () => null;")
        .route("user/_id.tsx", "export default () => null;")
        .route("404.tsx", "export default () => null;");
    fixture
}

#[tokio::test]
async fn test_static_route_renders_spliced_document() {
    let app = site(Mode::Development).app(site_pages());

    let (status, headers, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");

    let html = text(&body);
    assert!(html.starts_with("<!DOCTYPE html><html><head><title>Home</title>"));
    assert!(html.contains(&format!("<main>home</main><div>client home</div>{}", HYDRATION_SCRIPT)));
    assert!(html.ends_with(SHELL_SEAM));
}

#[tokio::test]
async fn test_dynamic_route_binds_params() {
    let app = site(Mode::Development).app(site_pages());

    let (status, _, body) = send(&app, get("/user/123")).await;
    assert_eq!(status, StatusCode::OK);
    let html = text(&body);
    assert!(html.contains("<p>user 123</p>"));
    // no client route for this path, so only the bootstrap is spliced in
    assert!(html.contains(&format!("<p>user 123</p>{}{}", HYDRATION_SCRIPT, SHELL_SEAM)));
}

#[tokio::test]
async fn test_unknown_path_renders_error_route() {
    let app = site(Mode::Development).app(site_pages());

    let (status, headers, body) = send(&app, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
    assert!(text(&body).contains("<h1>not here</h1>"));
}

#[tokio::test]
async fn test_unknown_path_without_error_route() {
    let fixture = Fixture::new(Mode::Development);
    fixture.route("index.tsx", "x");
    let app = fixture.app(Pages::default());

    let (status, _, body) = send(&app, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text(&body), "404 Not Found");
}

#[tokio::test]
async fn test_malformed_target_is_not_found() {
    let app = site(Mode::Development).app(site_pages());

    let (status, _, body) = send(&app, get("/user/1?tab=posts")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(text(&body).contains("<h1>not here</h1>"));
}

#[tokio::test]
async fn test_unregistered_route_uses_placeholder() {
    let fixture = Fixture::new(Mode::Development);
    fixture.route("about.tsx", "x");
    let app = fixture.app(Pages::default());

    let (status, _, body) = send(&app, get("/about")).await;
    assert_eq!(status, StatusCode::OK);
    let html = text(&body);
    assert!(html.contains("<title>About</title>"));
    assert!(html.ends_with(SHELL_SEAM));
}

#[tokio::test]
async fn test_raised_status_reaches_its_error_route() {
    let fixture = Fixture::new(Mode::Development);
    fixture.route("gone.tsx", "x").route("410.tsx", "x");
    let pages = Pages::new(
        PageRegistry::new()
            .with("Gone", page_fn(|_: &RenderContext| Err(RenderError::Status(410))))
            .with("_410", page_fn(|_: &RenderContext| Ok("<p>gone for good</p>".to_string()))),
        PageRegistry::new(),
    );
    let app = fixture.app(pages);

    let (status, _, body) = send(&app, get("/gone")).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(text(&body), "<p>gone for good</p>");
}

#[tokio::test]
async fn test_raised_status_without_error_route() {
    let fixture = Fixture::new(Mode::Development);
    fixture.route("gone.tsx", "x");
    let pages = Pages::new(
        PageRegistry::new().with("Gone", page_fn(|_: &RenderContext| Err(RenderError::Status(410)))),
        PageRegistry::new(),
    );
    let app = fixture.app(pages);

    let (status, _, body) = send(&app, get("/gone")).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(text(&body), "410 Gone");
}

#[tokio::test]
async fn test_panicking_page_renders_500_route() {
    let fixture = Fixture::new(Mode::Development);
    fixture.route("boom.tsx", "x").route("500.tsx", "x");
    let pages = Pages::new(
        PageRegistry::new()
            .with("Boom", page_fn(|_: &RenderContext| -> Result<String, RenderError> { panic!("boom") }))
            .with("_500", page_fn(|_: &RenderContext| Ok("<p>sorry</p>".to_string()))),
        PageRegistry::new(),
    );
    let app = fixture.app(pages);

    let (status, _, body) = send(&app, get("/boom")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(text(&body), "<p>sorry</p>");
}

#[tokio::test]
async fn test_failing_error_route_degrades_to_plain_500() {
    let fixture = Fixture::new(Mode::Development);
    fixture.route("boom.tsx", "x").route("500.tsx", "x");
    let pages = Pages::new(
        PageRegistry::new()
            .with("Boom", page_fn(|_: &RenderContext| Err(RenderError::Failed("db down".into()))))
            .with("_500", page_fn(|_: &RenderContext| Err(RenderError::Failed("still down".into())))),
        PageRegistry::new(),
    );
    let app = fixture.app(pages);

    let (status, _, body) = send(&app, get("/boom")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(text(&body), "500 Internal Server Error");
}

#[tokio::test]
async fn test_head_without_seam_is_a_render_failure() {
    let fixture = Fixture::new(Mode::Development);
    fixture.route("index.tsx", "x");
    let pages = Pages::new(
        PageRegistry::new().with("Index", page_fn(|_: &RenderContext| Ok("<div>no shell</div>".to_string()))),
        PageRegistry::new(),
    );
    let app = fixture.app(pages);

    let (status, _, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(text(&body), "500 Internal Server Error");
}

#[tokio::test]
async fn test_development_passthrough() {
    let fixture = site(Mode::Development);
    fixture.output("index.js", b"console.log(1)").output("index.css", b"body{}");
    let app = fixture.app(site_pages());

    let (status, headers, body) = send(&app, get("/index.js")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/javascript; charset=utf-8");
    assert_eq!(&body[..], b"console.log(1)");

    let (status, headers, _) = send(&app, get("/index.css")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/css");

    let (status, _, body) = send(&app, get("/missing.js")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(text(&body).contains("<h1>not here</h1>"));
}

#[tokio::test]
async fn test_production_has_no_passthrough() {
    let fixture = Fixture::new(Mode::Production);
    let app = fixture.app(Pages::default());

    // not in the asset table, so it falls through to routing
    let (status, _, body) = send(&app, get("/missing.js")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text(&body), "404 Not Found");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = site(Mode::Development).app(site_pages());

    let (_, headers, _) = send(&app, get_with("/", &[("x-request-id", "abc-123")])).await;
    assert_eq!(headers["x-request-id"], "abc-123");

    let (_, headers, _) = send(&app, get("/")).await;
    assert!(headers.contains_key("x-request-id"));
}
