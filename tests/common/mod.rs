//! Shared fixtures for integration tests.

#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;

use page_router::assets::AssetRouteTable;
use page_router::compiler::CompilePass;
use page_router::config::{Mode, RouterConfig};
use page_router::http::{AppState, HttpServer};
use page_router::routing::SnapshotStore;
use page_router::Pages;

/// A project directory with a routes root and a build output directory.
pub struct Fixture {
    pub dir: TempDir,
    pub config: RouterConfig,
}

impl Fixture {
    pub fn new(mode: Mode) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        let mut config = RouterConfig::default();
        config.mode = mode;
        config.build.out_dir = root.join("dist/client");
        for tree in [&mut config.routes.server, &mut config.routes.client] {
            tree.routes_dir = root.join("src/routes");
        }
        config.routes.server.router_module = root.join("src/components/Router.tsx");
        config.routes.server.manifest = root.join("dist/routes.server.json");
        config.routes.client.router_module = root.join("src/components/Router.client.tsx");
        config.routes.client.manifest = root.join("dist/routes.client.json");

        fs::create_dir_all(root.join("src/routes")).unwrap();
        fs::create_dir_all(root.join("dist/client")).unwrap();

        Self { dir, config }
    }

    /// Write a route file relative to the routes root.
    pub fn route(&self, relative: &str, content: &str) -> &Self {
        self.write(self.config.routes.server.routes_dir.join(relative), content.as_bytes())
    }

    /// Write a build output file relative to the output directory.
    pub fn output(&self, relative: &str, content: &[u8]) -> &Self {
        self.write(self.config.build.out_dir.join(relative), content)
    }

    fn write(&self, path: PathBuf, content: &[u8]) -> &Self {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        self
    }

    /// Compile the routes and build the router the server would run.
    pub fn app(&self, pages: Pages) -> axum::Router {
        let snapshot = CompilePass::new(&self.config.routes, pages).run().unwrap();
        let assets = if self.config.mode.is_production() {
            AssetRouteTable::from_out_dir(&self.config.build.out_dir, &self.config.assets.cache_control)
                .unwrap()
        } else {
            AssetRouteTable::new()
        };

        let state = AppState::new(&self.config, SnapshotStore::new(snapshot), assets).unwrap();
        HttpServer::new(&self.config, state).router()
    }
}

/// Document shell whose body container closes with the splice seam.
pub fn shell(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body><div id=\"root\">{}</div></body></html>",
        title, body
    )
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

/// Drive one request through `app`.
pub async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body)
}

pub fn text(body: &Bytes) -> String {
    String::from_utf8(body.to_vec()).unwrap()
}
