use partcat_common::{Part, PartPatch, ValidationError};
use partcat_kernel::{StoreError, VersionedStore};
use serde::Serialize;
use std::sync::Arc;

use crate::config::CorsConfig;
use crate::route::{Route, RouteError};

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// A transport-neutral request.
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    pub method: String,
    /// Path plus optional query, as sent by the client.
    pub target: String,
    pub body: Vec<u8>,
}

impl ApiRequest {
    pub fn new(method: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// A transport-neutral response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self::empty(status)
            .with_header("Content-Type", TEXT)
            .with_body(body.as_bytes())
    }

    pub fn json<T: Serialize + ?Sized>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::empty(status)
                .with_header("Content-Type", JSON)
                .with_body(body),
            Err(err) => Self::error(500, &format!("could not encode response: {err}")),
        }
    }

    /// `{"error": message}` with the given status.
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::empty(status)
            .with_header("Content-Type", JSON)
            .with_body(body)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as JSON. Test and client convenience.
    pub fn json_body(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

impl From<RouteError> for ApiResponse {
    fn from(err: RouteError) -> Self {
        let status = match err {
            RouteError::NotFound => 404,
            RouteError::MethodNotAllowed(_) => 405,
            RouteError::BadVersion(_) => 400,
        };
        Self::error(status, &err.to_string())
    }
}

impl From<ValidationError> for ApiResponse {
    fn from(err: ValidationError) -> Self {
        Self::error(400, &err.to_string())
    }
}

impl From<StoreError> for ApiResponse {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::Validation(_) => 400,
            StoreError::NotFound(_) | StoreError::VersionNotFound { .. } => 404,
            StoreError::Conflict(_) => 409,
            StoreError::Storage(_) | StoreError::Replay(_) => 500,
        };
        if status == 500 {
            tracing::error!(%err, "store failure");
        }
        Self::error(status, &err.to_string())
    }
}

/// Maps requests onto catalog operations.
#[derive(Debug, Clone)]
pub struct CatalogService {
    store: Arc<VersionedStore>,
    cors: CorsConfig,
}

impl CatalogService {
    pub fn new(store: Arc<VersionedStore>, cors: CorsConfig) -> Self {
        Self { store, cors }
    }

    pub fn store(&self) -> &VersionedStore {
        &self.store
    }

    /// Answer one request. Every response carries the CORS headers.
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let _span =
            tracing::info_span!("request", method = %request.method, target = %request.target)
                .entered();
        let response = match Route::parse(&request.method, &request.target) {
            Ok(route) => self.dispatch(route, &request.body),
            Err(err) => err.into(),
        };
        tracing::debug!(status = response.status, "request handled");
        self.with_cors(response)
    }

    fn dispatch(&self, route: Route, body: &[u8]) -> ApiResponse {
        let result = match route {
            Route::Health => Ok(ApiResponse::text(200, "OK")),
            Route::Preflight => Ok(ApiResponse::empty(204)),
            Route::ListParts => Ok(ApiResponse::json(200, &self.store.list_current())),
            Route::CreatePart => return self.create(body),
            Route::GetPart(id) => self.store.get(&id).map(|part| ApiResponse::json(200, &part)),
            Route::UpdatePart(id) => match Part::from_json(body) {
                Ok(part) => self.store.update(&id, part).map(|()| ApiResponse::empty(204)),
                Err(err) => return err.into(),
            },
            Route::PatchPart(id) => match PartPatch::from_json(body) {
                Ok(patch) => self.store.patch(&id, patch).map(|()| ApiResponse::empty(204)),
                Err(err) => return err.into(),
            },
            Route::DeletePart(id) => self.store.delete(&id).map(|()| ApiResponse::empty(204)),
            Route::GetVersion(id, version) => self
                .store
                .get_version(&id, version)
                .map(|part| ApiResponse::json(200, &part)),
            Route::ListVersions(id) => self
                .store
                .list_versions(&id)
                .map(|versions| ApiResponse::json(200, &versions)),
            Route::Search(needle) => Ok(ApiResponse::json(200, &self.store.search_by_name(&needle))),
        };
        result.unwrap_or_else(ApiResponse::from)
    }

    fn create(&self, body: &[u8]) -> ApiResponse {
        let part = match Part::from_json(body) {
            Ok(part) => part,
            Err(err) => return err.into(),
        };
        match self.store.create_part(part) {
            Ok(part) => ApiResponse::json(201, &part),
            Err(err) => err.into(),
        }
    }

    fn with_cors(&self, response: ApiResponse) -> ApiResponse {
        response
            .with_header("Access-Control-Allow-Origin", &self.cors.allowed_origins)
            .with_header("Access-Control-Allow-Methods", &self.cors.allowed_methods)
            .with_header("Access-Control-Allow-Headers", &self.cors.allowed_headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partcat_kernel::{CatalogEvent, ConflictPolicy, Journal, JournalError};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn service(policy: ConflictPolicy) -> CatalogService {
        CatalogService::new(
            Arc::new(VersionedStore::in_memory(policy)),
            CorsConfig::default(),
        )
    }

    fn send(svc: &CatalogService, method: &str, target: &str, body: Value) -> ApiResponse {
        let request = ApiRequest::new(method, target);
        let request = if body.is_null() {
            request
        } else {
            request.with_body(body.to_string())
        };
        svc.handle(&request)
    }

    fn brake_pad() -> Value {
        json!({"name": "Brake Pad", "sku": "BP100", "price": 29.99})
    }

    #[test]
    fn create_returns_populated_part() {
        let svc = service(ConflictPolicy::Merge);
        let resp = send(&svc, "POST", "/parts", brake_pad());
        assert_eq!(resp.status, 201);
        let body = resp.json_body().unwrap();
        assert_eq!(body["id"], "P0001");
        assert_eq!(body["price"], 29.99);
        assert_eq!(resp.header("content-type"), Some(JSON));
    }

    #[test]
    fn create_rejects_bad_payloads() {
        let svc = service(ConflictPolicy::Merge);
        let resp = svc.handle(&ApiRequest::new("POST", "/parts").with_body("{not json"));
        assert_eq!(resp.status, 400);
        assert!(resp.json_body().unwrap()["error"].is_string());

        let resp = send(&svc, "POST", "/parts", json!({"name": "Pad", "price": -1.0}));
        assert_eq!(resp.status, 400);
        let resp = send(&svc, "POST", "/parts", json!({"name": "Pad", "price": "cheap"}));
        assert_eq!(resp.status, 400);
        assert_eq!(send(&svc, "GET", "/parts", Value::Null).json_body().unwrap(), json!([]));
    }

    #[test]
    fn reject_policy_maps_to_conflict() {
        let svc = service(ConflictPolicy::RejectDuplicate);
        assert_eq!(send(&svc, "POST", "/parts", brake_pad()).status, 201);
        let resp = send(&svc, "POST", "/parts", brake_pad());
        assert_eq!(resp.status, 409);
    }

    #[test]
    fn version_history_over_http() {
        let svc = service(ConflictPolicy::Merge);
        send(&svc, "POST", "/parts", brake_pad());

        let resp = send(&svc, "PATCH", "/parts/P0001", json!({"price": 24.99}));
        assert_eq!(resp.status, 204);
        assert!(resp.body.is_empty());

        let current = send(&svc, "GET", "/parts/P0001", Value::Null).json_body().unwrap();
        assert_eq!(current["price"], 24.99);
        assert_eq!(current["name"], "Brake Pad");

        let first = send(&svc, "GET", "/parts/P0001/version/1", Value::Null);
        assert_eq!(first.status, 200);
        assert_eq!(first.json_body().unwrap()["price"], 29.99);

        let versions = send(&svc, "GET", "/parts/P0001/versions", Value::Null).json_body().unwrap();
        let versions = versions.as_array().unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[1]["version"], 2);
        assert!(versions[0]["timestamp"].is_string());
        assert!(versions[0].get("part").is_none());

        assert_eq!(send(&svc, "GET", "/parts/P0001/version/3", Value::Null).status, 404);
        assert_eq!(send(&svc, "GET", "/parts/P0001/version/x", Value::Null).status, 400);
    }

    #[test]
    fn put_replaces_whole_payload() {
        let svc = service(ConflictPolicy::Merge);
        send(&svc, "POST", "/parts", brake_pad());
        let resp = send(
            &svc,
            "PUT",
            "/parts/P0001",
            json!({"id": "P0999", "name": "Ceramic Pad", "sku": "BP100", "price": 31.0}),
        );
        assert_eq!(resp.status, 204);
        let current = send(&svc, "GET", "/parts/P0001", Value::Null).json_body().unwrap();
        assert_eq!(current["id"], "P0001");
        assert_eq!(current["name"], "Ceramic Pad");

        assert_eq!(send(&svc, "PUT", "/parts/P0404", brake_pad()).status, 404);
        assert_eq!(send(&svc, "PATCH", "/parts/P0404", json!({})).status, 404);
    }

    #[test]
    fn delete_and_not_found() {
        let svc = service(ConflictPolicy::Merge);
        send(&svc, "POST", "/parts", brake_pad());
        assert_eq!(send(&svc, "DELETE", "/parts/P0001", Value::Null).status, 204);
        assert_eq!(send(&svc, "GET", "/parts/P0001", Value::Null).status, 404);
        assert_eq!(send(&svc, "GET", "/parts/P0001/versions", Value::Null).status, 404);

        let resp = send(&svc, "DELETE", "/parts/P9999", Value::Null);
        assert_eq!(resp.status, 404);
        assert!(resp.json_body().unwrap()["error"]
            .as_str()
            .unwrap()
            .contains("P9999"));
    }

    #[test]
    fn search_by_name_substring() {
        let svc = service(ConflictPolicy::Merge);
        send(&svc, "POST", "/parts", brake_pad());
        send(&svc, "POST", "/parts", json!({"name": "Oil Filter", "sku": "OF1", "price": 8.0}));

        let hits = send(&svc, "GET", "/search?name=BRAKE", Value::Null).json_body().unwrap();
        assert_eq!(hits.as_array().unwrap().len(), 1);
        let hits = send(&svc, "GET", "/parts/search?name=oil+filter", Value::Null)
            .json_body()
            .unwrap();
        assert_eq!(hits[0]["sku"], "OF1");
        let all = send(&svc, "GET", "/search?name=", Value::Null).json_body().unwrap();
        assert_eq!(all.as_array().unwrap().len(), 2);
    }

    #[test]
    fn cors_and_protocol_routes() {
        let svc = service(ConflictPolicy::Merge);
        let resp = send(&svc, "OPTIONS", "/parts/P0001", Value::Null);
        assert_eq!(resp.status, 204);
        assert_eq!(resp.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(
            resp.header("Access-Control-Allow-Methods"),
            Some("GET, HEAD, POST, PUT, OPTIONS, DELETE, PATCH")
        );

        let health = send(&svc, "GET", "/health", Value::Null);
        assert_eq!((health.status, health.body.as_slice()), (200, b"OK".as_slice()));

        let missing = send(&svc, "GET", "/nowhere", Value::Null);
        assert_eq!(missing.status, 404);
        assert!(missing.header("Access-Control-Allow-Headers").is_some());
        assert_eq!(send(&svc, "DELETE", "/parts", Value::Null).status, 405);
    }

    #[test]
    fn create_answers_201_while_parts_are_deleted() {
        let svc = service(ConflictPolicy::Merge);
        let stop = Arc::new(AtomicBool::new(false));
        let deleter = {
            let store = Arc::clone(&svc.store);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    for part in store.list_current() {
                        let _ = store.delete(&part.id);
                    }
                }
            })
        };

        let mut not_created = 0;
        for i in 0..2000 {
            let resp = send(
                &svc,
                "POST",
                "/parts",
                json!({"name": "Clip", "sku": format!("C{i}"), "price": 0.5}),
            );
            if resp.status != 201 || resp.json_body().unwrap()["sku"] != format!("C{i}") {
                not_created += 1;
            }
        }
        stop.store(true, Ordering::Relaxed);
        deleter.join().unwrap();
        assert_eq!(not_created, 0);
    }

    struct BrokenJournal;

    impl Journal for BrokenJournal {
        fn record(&mut self, _events: &[CatalogEvent]) -> Result<(), JournalError> {
            Err("disk unplugged".into())
        }
    }

    #[test]
    fn storage_failure_maps_to_500() {
        let store = VersionedStore::with_journal(ConflictPolicy::Merge, Box::new(BrokenJournal));
        let svc = CatalogService::new(Arc::new(store), CorsConfig::default());
        let resp = send(&svc, "POST", "/parts", brake_pad());
        assert_eq!(resp.status, 500);
        assert_eq!(send(&svc, "GET", "/parts", Value::Null).json_body().unwrap(), json!([]));
    }
}
