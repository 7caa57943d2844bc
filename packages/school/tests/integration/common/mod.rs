use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use ::common::storage::FilesystemFileStore;
use reqwest::Client;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;

use school::config::{
    AppConfig, AvatarConfig, CorsConfig, DatabaseConfig, DEFAULT_AVATAR_MAX_UPLOAD_SIZE,
    ServerConfig,
};
use school::services::UploadLocks;
use school::state::AppState;

pub mod routes {
    pub const STUDENTS: &str = "/student";
    pub const STUDENT_COUNT: &str = "/student/count";
    pub const STUDENT_AGE_AVG: &str = "/student/age/avg";
    pub const STUDENT_LAST: &str = "/student/last";
    pub const STUDENT_NAMES: &str = "/student/names";
    pub const FACULTIES: &str = "/faculty";
    pub const FACULTY_LONGEST_NAME: &str = "/faculty/longest-name";
    pub const PORT: &str = "/port";

    pub fn student(id: i32) -> String {
        format!("/student/{id}")
    }

    pub fn students_by_age(age: i32) -> String {
        format!("/student/age/{age}")
    }

    pub fn students_by_age_range(min: i32, max: i32) -> String {
        format!("/student/agebetween/{min}-{max}")
    }

    pub fn faculty_of_student(id: i32) -> String {
        format!("/student/faculty/{id}")
    }

    pub fn faculty(id: i32) -> String {
        format!("/faculty/{id}")
    }

    pub fn faculty_students(id: i32) -> String {
        format!("/faculty/students/{id}")
    }

    pub fn avatar(student_id: i32) -> String {
        format!("/student/{student_id}/avatar")
    }

    pub fn avatar_preview(student_id: i32) -> String {
        format!("/student/{student_id}/avatar/preview")
    }

    pub fn avatars(page: i64, size: i64) -> String {
        format!("/student/avatar/all?page={page}&size={size}")
    }
}

/// A running test server backed by a throwaway SQLite file and avatar directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub avatar_dir: PathBuf,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    pub headers: reqwest::header::HeaderMap,
    pub bytes: Vec<u8>,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("school.db").display());
        let db = school::database::init_db(&db_url)
            .await
            .expect("Failed to initialize test database");

        let avatar_dir = dir.path().join("avatars");
        let avatar_store = FilesystemFileStore::new(avatar_dir.clone())
            .await
            .expect("Failed to create avatar store");

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                profile: "test".to_string(),
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig { url: db_url },
            avatar: AvatarConfig {
                directory: avatar_dir.clone(),
                max_upload_size: DEFAULT_AVATAR_MAX_UPLOAD_SIZE,
            },
        };

        let state = AppState {
            db: db.clone(),
            config: Arc::new(config),
            avatar_store: Arc::new(avatar_store),
            upload_locks: Arc::new(UploadLocks::new()),
        };
        let app = school::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            avatar_dir,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");
        TestResponse::from_response(res).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");
        TestResponse::from_response(res).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");
        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");
        TestResponse::from_response(res).await
    }

    /// Upload `file_bytes` as the `avatar` part. `mime` of `None` sends no part content type.
    pub async fn upload_avatar(
        &self,
        student_id: i32,
        file_name: &str,
        file_bytes: Vec<u8>,
        mime: Option<&str>,
    ) -> TestResponse {
        let mut part = reqwest::multipart::Part::bytes(file_bytes).file_name(file_name.to_string());
        if let Some(mime) = mime {
            part = part.mime_str(mime).expect("Failed to set MIME type");
        }
        let form = reqwest::multipart::Form::new().part("avatar", part);

        let res = self
            .client
            .post(self.url(&routes::avatar(student_id)))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");
        TestResponse::from_response(res).await
    }

    /// Create a faculty via the API and return its `id`.
    pub async fn create_faculty(&self, name: &str, color: &str) -> i32 {
        let res = self
            .post(
                routes::FACULTIES,
                &serde_json::json!({ "name": name, "color": color }),
            )
            .await;
        assert_eq!(res.status, 200, "create_faculty failed: {}", res.text);
        res.id()
    }

    /// Create a student via the API and return its `id`.
    pub async fn create_student(&self, name: &str, age: i32, faculty_id: Option<i32>) -> i32 {
        let res = self
            .post(
                routes::STUDENTS,
                &serde_json::json!({ "name": name, "age": age, "faculty_id": faculty_id }),
            )
            .await;
        assert_eq!(res.status, 200, "create_student failed: {}", res.text);
        res.id()
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let bytes = res.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Self {
            status,
            headers,
            bytes,
            text,
            body,
        }
    }

    pub fn id(&self) -> i32 {
        self.body["id"]
            .as_i64()
            .expect("response body should contain 'id'") as i32
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}
