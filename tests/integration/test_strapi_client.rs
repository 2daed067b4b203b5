//! Strapi client tests against an in-process stub CMS.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use alumni_hub::acl::Principal;
use alumni_hub::config::CmsConfig;
use alumni_hub::{
    AlumniError, BatchmateBackend, BatchmateData, BatchmatePatch, CmsError, CmsFilters,
    CriteriaKey, Directory, EngineeringField, FilterCriteria, StrapiClient, UserBackend,
};

const TOKEN: &str = "cms-api-token";

/// One request as seen by the stub.
#[derive(Debug, Clone)]
struct Captured {
    path: String,
    query: HashMap<String, String>,
    authorization: Option<String>,
}

#[derive(Clone, Default)]
struct Stub {
    requests: Arc<Mutex<Vec<Captured>>>,
}

impl Stub {
    fn record(&self, path: &str, headers: &HeaderMap, query: HashMap<String, String>) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(Captured {
            path: path.to_string(),
            query,
            authorization,
        });
    }

    fn requests(&self) -> Vec<Captured> {
        self.requests.lock().unwrap().clone()
    }
}

fn flat(id: u64, calling: &str, field: &str, country: &str) -> Value {
    json!({
        "id": id,
        "documentId": format!("doc{}", id),
        "callingName": calling,
        "fullName": format!("{} Tester", calling),
        "email": format!("{}@alumni.test", calling.to_lowercase()),
        "whatsappMobile": "+94 77 123 4567",
        "field": field,
        "country": country,
        "currentPhoto": { "url": format!("/uploads/{}.jpg", id) },
        "createdAt": "2024-03-01T10:00:00.000Z",
        "updatedAt": "2024-03-02T10:00:00.000Z"
    })
}

fn wrapped(id: u64, calling: &str, field: &str) -> Value {
    json!({
        "id": id,
        "attributes": {
            "callingName": calling,
            "fullName": format!("{} Wrapped", calling),
            "email": format!("{}@alumni.test", calling.to_lowercase()),
            "whatsappMobile": "+94 71 000 0000",
            "field": field,
            "universityPhoto": { "data": { "attributes": { "url": "/uploads/uni.png" } } },
            "currentPhoto": { "data": null },
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }
    })
}

async fn list_batchmates(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let page = query
        .get("pagination[page]")
        .cloned()
        .unwrap_or_else(|| "1".to_string());
    stub.record("/batchmates", &headers, query);

    let data = if page == "1" {
        json!([flat(1, "Ann", "Computer", "USA"), wrapped(2, "Ben", "Civil")])
    } else {
        json!([
            { "id": 3, "attributes": { "callingName": "Bad", "field": "Underwater" } },
            flat(4, "Cara", "Civil", "UK")
        ])
    };
    Json(json!({
        "data": data,
        "meta": { "pagination": { "page": page.parse::<u64>().unwrap_or(1), "pageSize": 2, "pageCount": 2, "total": 4 } }
    }))
}

async fn get_batchmate(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    stub.record(&format!("/batchmates/{}", id), &headers, HashMap::new());
    match id.as_str() {
        "1" | "doc1" => Json(json!({ "data": flat(1, "Ann", "Computer", "USA") })).into_response(),
        "4" | "doc4" => Json(json!({ "data": flat(4, "Cara", "Civil", "UK") })).into_response(),
        "500" => (StatusCode::INTERNAL_SERVER_ERROR, "<html>upstream down</html>").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "data": null,
                "error": { "status": 404, "name": "NotFoundError", "message": "Not Found", "details": {} }
            })),
        )
            .into_response(),
    }
}

async fn create_batchmate(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    stub.record("/batchmates", &headers, HashMap::new());
    let data = &body["data"];
    if data["email"] == "taken@alumni.test" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "data": null,
                "error": {
                    "status": 400,
                    "name": "ValidationError",
                    "message": "1 error occurred",
                    "details": { "errors": [{ "path": ["email"], "message": "This attribute must be unique" }] }
                }
            })),
        )
            .into_response();
    }

    let mut record = data.clone();
    record["id"] = json!(10);
    record["documentId"] = json!("doc10");
    record["createdAt"] = json!("2024-05-01T00:00:00.000Z");
    record["updatedAt"] = json!("2024-05-01T00:00:00.000Z");
    (StatusCode::OK, Json(json!({ "data": record }))).into_response()
}

async fn update_batchmate(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    stub.record(&format!("/batchmates/{}", id), &headers, HashMap::new());
    let mut record = flat(4, "Cara", "Civil", "UK");
    if let Some(place) = body["data"]["workingPlace"].as_str() {
        record["workingPlace"] = json!(place);
    }
    Json(json!({ "data": record }))
}

async fn delete_batchmate(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> StatusCode {
    stub.record(&format!("/batchmates/{}", id), &headers, HashMap::new());
    StatusCode::NO_CONTENT
}

fn user(id: u64, username: &str, role_type: &str, field: Option<&str>) -> Value {
    let role_id = if role_type == "super_admin" { 3 } else { 4 };
    let mut value = json!({
        "id": id,
        "username": username,
        "email": format!("{}@alumni.edu", username),
        "provider": "local",
        "confirmed": true,
        "blocked": false,
        "createdAt": "2024-01-15T00:00:00.000Z",
        "updatedAt": "2024-01-15T00:00:00.000Z",
        "role": { "id": role_id, "name": role_type, "type": role_type }
    });
    if let Some(field) = field {
        value["assignedField"] = json!(field);
    }
    value
}

async fn list_users(State(stub): State<Stub>, headers: HeaderMap) -> Json<Value> {
    stub.record("/user-management/all", &headers, HashMap::new());
    Json(json!([
        user(1, "superadmin", "super_admin", None),
        user(2, "civiladmin", "field_admin", Some("Civil"))
    ]))
}

async fn list_roles(State(stub): State<Stub>, headers: HeaderMap) -> Json<Value> {
    stub.record("/user-management/roles", &headers, HashMap::new());
    Json(json!({
        "roles": [
            { "id": 3, "name": "Super Admin", "type": "super_admin" },
            { "id": 4, "name": "Field Admin", "type": "field_admin" }
        ]
    }))
}

async fn spawn_stub() -> (String, Stub) {
    let stub = Stub::default();
    let app = Router::new()
        .route(
            "/api/batchmates",
            get(list_batchmates).post(create_batchmate),
        )
        .route(
            "/api/batchmates/:id",
            get(get_batchmate)
                .put(update_batchmate)
                .delete(delete_batchmate),
        )
        .route("/api/user-management/all", get(list_users))
        .route("/api/user-management/roles", get(list_roles))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api/", addr), stub)
}

fn client(base_url: &str) -> StrapiClient {
    StrapiClient::from_config(&CmsConfig {
        base_url: base_url.to_string(),
        api_token: Some(TOKEN.to_string()),
        timeout_secs: 5,
        page_size: 2,
    })
    .unwrap()
}

#[tokio::test]
async fn test_list_walks_pages_and_skips_malformed() {
    let (base, stub) = spawn_stub().await;
    let client = client(&base);
    assert!(!client.base_url().ends_with('/'));

    let records = client.list(&CmsFilters::default()).await.unwrap();
    let names: Vec<&str> = records.iter().map(|r| r.calling_name.as_str()).collect();
    assert_eq!(names, vec!["Ann", "Ben", "Cara"]);

    let ben = &records[1];
    assert_eq!(ben.field, EngineeringField::Civil);
    assert_eq!(ben.university_photo.as_deref(), Some("/uploads/uni.png"));
    assert_eq!(ben.current_photo, None);
    assert_eq!(records[0].current_photo.as_deref(), Some("/uploads/1.jpg"));
    assert_eq!(records[0].key(), "doc1");

    let requests = stub.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].query.get("pagination[page]").unwrap(), "1");
    assert_eq!(requests[1].query.get("pagination[page]").unwrap(), "2");
    assert_eq!(requests[0].query.get("pagination[pageSize]").unwrap(), "2");
    assert_eq!(
        requests[0].query.get("populate[0]").unwrap(),
        "universityPhoto"
    );
    assert!(requests
        .iter()
        .all(|r| r.authorization.as_deref() == Some("Bearer cms-api-token")));
}

#[tokio::test]
async fn test_filters_are_sent_as_query_operators() {
    let (base, stub) = spawn_stub().await;
    let client = client(&base);

    let criteria = FilterCriteria::new()
        .with(CriteriaKey::FullName, "Tester")
        .with(CriteriaKey::WhatsappMobile, "077")
        .with_country("all");
    client.list(&CmsFilters::new(criteria)).await.unwrap();

    let query = &stub.requests()[0].query;
    assert_eq!(query.get("filters[fullName][$containsi]").unwrap(), "Tester");
    assert_eq!(query.get("filters[whatsappMobile][$containsi]").unwrap(), "077");
    assert!(!query.keys().any(|k| k.starts_with("filters[country]")));
}

#[tokio::test]
async fn test_directory_pushes_scope_down_and_rechecks() {
    let (base, stub) = spawn_stub().await;
    let directory = Directory::new(Arc::new(client(&base)));
    let principal = Principal::field_admin(EngineeringField::Civil);

    // The stub ignores filters, so the in-memory pass must drop Ann.
    let records = directory
        .search(Some(&principal), &FilterCriteria::default(), None)
        .await
        .unwrap();
    let names: Vec<&str> = records.iter().map(|r| r.calling_name.as_str()).collect();
    assert_eq!(names, vec!["Ben", "Cara"]);

    let query = &stub.requests()[0].query;
    assert_eq!(query.get("filters[field][$eq]").unwrap(), "Civil");
}

#[tokio::test]
async fn test_get_and_not_found() {
    let (base, _stub) = spawn_stub().await;
    let client = client(&base);

    let ann = client.get("doc1").await.unwrap();
    assert_eq!(ann.id, "1");
    assert_eq!(ann.document_id.as_deref(), Some("doc1"));

    let err = client.get("99").await.unwrap_err();
    assert!(matches!(err, AlumniError::Cms(CmsError::NotFound(_))));
}

#[tokio::test]
async fn test_non_json_error_body() {
    let (base, _stub) = spawn_stub().await;
    let err = client(&base).get("500").await.unwrap_err();
    match err {
        AlumniError::Cms(CmsError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "An error occurred");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_create_update_delete() {
    let (base, stub) = spawn_stub().await;
    let client = client(&base);

    let data = BatchmateData::new(
        "Ivy",
        "Ivy Perera",
        "ivy@alumni.test",
        "+94 77 555 0000",
        EngineeringField::Civil,
    )
    .with_country("Japan");
    let created = client.create(&data).await.unwrap();
    assert_eq!(created.id, "10");
    assert_eq!(created.country.as_deref(), Some("Japan"));

    let patch = BatchmatePatch {
        working_place: Some("Harbour Works".to_string()),
        ..Default::default()
    };
    let updated = client.update("doc4", &patch).await.unwrap();
    assert_eq!(updated.working_place.as_deref(), Some("Harbour Works"));

    client.delete("doc4").await.unwrap();

    let paths: Vec<String> = stub.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec!["/batchmates", "/batchmates/doc4", "/batchmates/doc4"]
    );
}

#[tokio::test]
async fn test_cms_validation_errors_surface() {
    let (base, _stub) = spawn_stub().await;
    let data = BatchmateData::new(
        "Dup",
        "Dup Licate",
        "taken@alumni.test",
        "+94 77 555 0002",
        EngineeringField::Civil,
    );
    match client(&base).create(&data).await.unwrap_err() {
        AlumniError::Cms(CmsError::Validation(messages)) => {
            assert_eq!(messages, vec!["This attribute must be unique".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_user_management_endpoints() {
    let (base, _stub) = spawn_stub().await;
    let client = client(&base);

    let users = client.list_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].assigned_field, Some(EngineeringField::Civil));
    assert!(users[1].is_field_admin());

    let roles = client.roles().await.unwrap();
    assert_eq!(roles.len(), 2);
    assert_eq!(roles[0].role_type, "super_admin");
}
