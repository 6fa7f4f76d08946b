//! In-process fake of the MediTrack backend.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const PASSWORD: &str = "secret";

/// A multipart prescription upload as the backend saw it.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub fields: HashMap<String, String>,
    pub file_name: Option<String>,
    pub file_bytes: Vec<u8>,
}

#[derive(Default)]
pub struct Backend {
    pub medicines: Mutex<Vec<Value>>,
    pub prescriptions: Mutex<Vec<Value>>,
    pub uploads: Mutex<Vec<Upload>>,
    pub requests: AtomicUsize,
    pub slow_medicines: Mutex<Option<Duration>>,
    pub fail_medicines: AtomicBool,
    next_id: AtomicUsize,
}

impl Backend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_medicines(self: Arc<Self>, medicines: Vec<Value>) -> Arc<Self> {
        *self.medicines.lock().unwrap() = medicines;
        self
    }

    pub fn with_prescriptions(self: Arc<Self>, prescriptions: Vec<Value>) -> Arc<Self> {
        *self.prescriptions.lock().unwrap() = prescriptions;
        self
    }

    /// Make `GET /api/medicines` answer 500 from now on.
    pub fn fail_medicine_listing(self: Arc<Self>) -> Arc<Self> {
        self.fail_medicines.store(true, Ordering::SeqCst);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Serve `backend` on an ephemeral port and return its base URL.
pub async fn spawn(backend: Arc<Backend>) -> String {
    let app = Router::new()
        .route("/api/users/login", post(login))
        .route("/api/users/signup", post(signup))
        .route(
            "/api/prescriptions",
            get(list_prescriptions).post(create_prescription),
        )
        .route("/api/medicines", get(list_medicines).post(add_medicine))
        .route("/api/medicines/:id", delete(delete_medicine))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn doctor_ref() -> Value {
    json!({"_id": "d1", "name": "Dr. Meera Rao"})
}

pub fn prescription(id: &str, patient: &str, medicine: &str, created_at: &str) -> Value {
    json!({
        "_id": id,
        "doctorId": doctor_ref(),
        "patientName": patient,
        "medicines": [{"name": medicine, "dosage": "1 tablet", "instructions": "after food"}],
        "createdAt": created_at,
    })
}

pub fn medicine(id: &str, name: &str, quantity: i64) -> Value {
    json!({"_id": id, "name": name, "manufacturer": "Acme", "price": 10.0, "quantity": quantity})
}

async fn login(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.hit();
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let user = match email {
        "doctor@example.com" => json!({"_id": "d1", "name": "Dr. Meera Rao", "role": "doctor"}),
        "patient@example.com" => json!({"_id": "p1", "name": "Asha Kumar", "role": "patient"}),
        "pharmacy@example.com" => json!({"_id": "ph1", "name": "City Pharmacy", "role": "pharmacy"}),
        "nurse@example.com" => json!({"_id": "n1", "name": "Nurse", "role": "nurse"}),
        _ => Value::Null,
    };
    if user.is_null() || password != PASSWORD {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid credentials"})),
        )
            .into_response();
    }
    Json(user).into_response()
}

async fn signup(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.hit();
    if body["role"].as_str().is_none() {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "Role required"}))).into_response();
    }
    Json(json!({"message": "User registered successfully"})).into_response()
}

async fn list_prescriptions(
    State(backend): State<Arc<Backend>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    backend.hit();
    let all = backend.prescriptions.lock().unwrap().clone();
    let filtered = match params.get("doctorId") {
        Some(id) => all
            .into_iter()
            .filter(|p| p["doctorId"]["_id"].as_str() == Some(id.as_str()))
            .collect(),
        None => all,
    };
    Json(filtered)
}

async fn create_prescription(
    State(backend): State<Arc<Backend>>,
    mut multipart: Multipart,
) -> Response {
    backend.hit();
    let mut upload = Upload::default();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            upload.file_name = field.file_name().map(str::to_string);
            upload.file_bytes = field.bytes().await.unwrap().to_vec();
        } else {
            upload.fields.insert(name, field.text().await.unwrap());
        }
    }
    backend.uploads.lock().unwrap().push(upload.clone());

    let patient_name = upload.fields.get("patientName").cloned().unwrap_or_default();
    if patient_name == "Rejected Patient" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Prescription could not be saved"})),
        )
            .into_response();
    }
    if patient_name == "Silent Patient" {
        return Json(json!({"ok": true})).into_response();
    }

    let medicines: Value = upload
        .fields
        .get("medicines")
        .and_then(|m| serde_json::from_str(m).ok())
        .unwrap_or(Value::Null);
    let id = backend.next_id("rx");
    let record = json!({
        "_id": id,
        "doctorId": doctor_ref(),
        "patientName": patient_name,
        "medicines": medicines,
        "uploadedFile": upload.file_name.as_ref().map(|n| format!("uploads/{}", n)),
        "createdAt": "2024-04-01T12:00:00.000Z",
    });
    backend.prescriptions.lock().unwrap().push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn list_medicines(State(backend): State<Arc<Backend>>) -> Response {
    backend.hit();
    let delay = *backend.slow_medicines.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if backend.fail_medicines.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Inventory unavailable"})),
        )
            .into_response();
    }
    let medicines = backend.medicines.lock().unwrap().clone();
    Json(medicines).into_response()
}

async fn add_medicine(State(backend): State<Arc<Backend>>, Json(mut body): Json<Value>) -> Response {
    backend.hit();
    body["_id"] = json!(backend.next_id("med"));
    backend.medicines.lock().unwrap().push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn delete_medicine(State(backend): State<Arc<Backend>>, Path(id): Path<String>) -> Response {
    backend.hit();
    let mut medicines = backend.medicines.lock().unwrap();
    let before = medicines.len();
    medicines.retain(|m| m["_id"].as_str() != Some(id.as_str()));
    if medicines.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Medicine not found"}))).into_response();
    }
    Json(json!({"message": "Deleted"})).into_response()
}
