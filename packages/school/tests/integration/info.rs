use crate::common::{TestApp, routes};

#[tokio::test]
async fn port_reports_configured_port_and_profile() {
    let app = TestApp::spawn().await;
    let res = app.get(routes::PORT).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["port"], "8080");
    assert_eq!(res.body["profile"], "test");
}

#[tokio::test]
async fn openapi_document_lists_avatar_routes() {
    let app = TestApp::spawn().await;
    let res = app.get("/api-docs/openapi.json").await;

    assert_eq!(res.status, 200);
    let paths = &res.body["paths"];
    assert!(paths["/student/{id}/avatar"]["post"].is_object());
    assert!(paths["/student/avatar/all"]["get"].is_object());
    assert!(paths["/faculty/longest-name"]["get"].is_object());
}
