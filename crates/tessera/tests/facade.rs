use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tessera::domain::config::AppConfig;
use tessera::prelude::*;
use tower::ServiceExt;

#[test]
fn compiled_in_subapps_are_registered_in_order() {
    let registry = tessera::registry().unwrap();
    assert_eq!(registry.subapps(), tessera::subapps::ENABLED);
    assert!(tessera::subapps::is_enabled("site"));
    assert!(!tessera::subapps::is_enabled("blog"));
}

#[test]
fn custom_namespace_root_flows_into_module_paths() {
    let registry = tessera::registry_with(ModuleResolver::new("shop")).unwrap();
    let mut host = HostApp::new();
    let autoloader = Autoloader::builder(registry).mode(Mode::Serve).build(&mut host).unwrap();

    assert_eq!(autoloader.report().mounted().collect::<Vec<_>>(), ["shop.site.route"]);
    assert_eq!(autoloader.context().module_name("site", Some("config")).to_string(), "shop.site.config");
}

#[tokio::test]
async fn serve_mode_end_to_end() {
    let config = AppConfig::default();
    let mut host = HostApp::new();
    let autoloader = Autoloader::builder(tessera::registry().unwrap())
        .main_subapp(config.autoload.main_subapp.clone())
        .mode(Mode::Serve)
        .build(&mut host)
        .unwrap();
    host.startup().await.unwrap();

    let state = HostState::builder()
        .config(config.clone())
        .context(autoloader.context().clone())
        .build()
        .unwrap();
    let router = host.build_router(state, &config.docs);

    for uri in ["/", "/health", "/api"] {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    }

    let response =
        router.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&bytes).contains("\"project_name\":\"starter\""));

    host.shutdown().await;
}
