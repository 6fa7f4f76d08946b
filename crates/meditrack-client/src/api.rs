//! REST client for the MediTrack backend.

use meditrack_core::models::{decode_records, Identity, Medicine, NewMedicine, PrescriptionRecord, Role};
use meditrack_core::PrescriptionSubmission;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Body of `POST /api/users/signup`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// `POST /api/users/login` answers either a user document or `{error}`.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    role: Option<String>,
    name: Option<String>,
    #[serde(rename = "_id", alias = "id")]
    id: Option<String>,
    error: Option<String>,
}

/// API client for communicating with the backend server.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client with a custom base URL and no timeout.
    pub fn with_base_url(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::new(&ClientConfig::default().with_api_url(base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/api/medicines/{id}` with the ID escaped as a single path segment.
    fn medicine_url(&self, id: &str) -> ClientResult<Url> {
        let invalid = || ClientError::InvalidBaseUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["api", "medicines", id]);
        Ok(url)
    }

    /// Resolve an `uploadedFile` path against the base URL. Absolute URLs
    /// are returned unchanged.
    pub fn file_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Authenticate and return the identity. Nothing is persisted here.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Identity> {
        let response = self
            .http
            .post(self.url("/api/users/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let body = read_json(response).await?;
        let login: LoginResponse = serde_json::from_value(body)?;

        let Some(role) = login.role else {
            let message = login.error.unwrap_or_else(|| "Login failed".to_string());
            warn!(%message, "login rejected");
            return Err(ClientError::Rejected(message));
        };
        let role: Role = role.parse()?;
        let id = login.id.ok_or(ClientError::MissingIdentifier)?;

        info!(%role, "login succeeded");
        Ok(Identity::new(id, login.name.unwrap_or_default(), role))
    }

    /// Register an account. Returns the server's message.
    pub async fn signup(&self, request: &SignupRequest) -> ClientResult<String> {
        let response = self
            .http
            .post(self.url("/api/users/signup"))
            .json(request)
            .send()
            .await?;
        let body = expect_success(response).await?;
        Ok(body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Signup completed")
            .to_string())
    }

    /// All prescriptions, or only those written by `doctor_id`.
    pub async fn list_prescriptions(&self, doctor_id: Option<&str>) -> ClientResult<Vec<PrescriptionRecord>> {
        let mut request = self.http.get(self.url("/api/prescriptions"));
        if let Some(id) = doctor_id {
            request = request.query(&[("doctorId", id)]);
        }
        let body = expect_success(request.send().await?).await?;
        let values: Vec<Value> = serde_json::from_value(body)?;
        debug!(count = values.len(), "fetched prescriptions");
        Ok(decode_records(values, "prescription"))
    }

    /// Submit a prescription as multipart form data. Returns the new ID.
    ///
    /// A response without `_id` is a rejection even when the status is 2xx.
    pub async fn create_prescription(&self, submission: &PrescriptionSubmission) -> ClientResult<String> {
        let mut form = Form::new()
            .text("doctorId", submission.doctor_id.clone())
            .text("patientName", submission.patient_name.clone())
            .text("medicines", submission.medicines_json()?);

        if let Some(attachment) = &submission.attachment {
            let mut part = Part::bytes(attachment.bytes.clone()).file_name(attachment.file_name.clone());
            if let Some(content_type) = &attachment.content_type {
                part = part.mime_str(content_type)?;
            }
            form = form.part("file", part);
        }

        let response = self
            .http
            .post(self.url("/api/prescriptions"))
            .multipart(form)
            .send()
            .await?;
        let body = read_json(response).await?;

        if let Some(id) = body.get("_id").and_then(Value::as_str) {
            info!(prescription_id = id, "prescription created");
            return Ok(id.to_string());
        }
        match error_message(&body) {
            Some(message) => {
                warn!(%message, "prescription rejected");
                Err(ClientError::Rejected(message))
            }
            None => Err(ClientError::MissingIdentifier),
        }
    }

    /// Full inventory.
    pub async fn list_medicines(&self) -> ClientResult<Vec<Medicine>> {
        let body = expect_success(self.http.get(self.url("/api/medicines")).send().await?).await?;
        let values: Vec<Value> = serde_json::from_value(body)?;
        debug!(count = values.len(), "fetched medicines");
        Ok(decode_records(values, "medicine"))
    }

    /// Create an inventory record. Returns the stored record when the
    /// response decodes as one.
    pub async fn add_medicine(&self, medicine: &NewMedicine) -> ClientResult<Option<Medicine>> {
        let response = self
            .http
            .post(self.url("/api/medicines"))
            .json(medicine)
            .send()
            .await?;
        let body = expect_success(response).await?;
        info!(name = %medicine.name, "medicine added");
        Ok(serde_json::from_value(body).ok())
    }

    /// Remove an inventory record.
    pub async fn delete_medicine(&self, id: &str) -> ClientResult<()> {
        let response = self
            .http
            .delete(self.medicine_url(id)?)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(rejection(status, response).await);
        }
        info!(medicine_id = id, "medicine deleted");
        Ok(())
    }
}

/// Parse the body as JSON whatever the status. A non-JSON error body becomes
/// a rejection carrying the status.
async fn read_json(response: Response) -> ClientResult<Value> {
    let status = response.status();
    let text = response.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => Ok(value),
        Err(e) if status.is_success() => Err(e.into()),
        Err(_) => Err(ClientError::Rejected(format!("HTTP {}", status))),
    }
}

/// Parse the body as JSON, failing on a non-success status.
async fn expect_success(response: Response) -> ClientResult<Value> {
    let status = response.status();
    if !status.is_success() {
        return Err(rejection(status, response).await);
    }
    read_json(response).await
}

async fn rejection(status: StatusCode, response: Response) -> ClientError {
    let message = response
        .text()
        .await
        .ok()
        .and_then(|text| serde_json::from_str::<Value>(&text).ok())
        .and_then(|body| error_message(&body))
        .unwrap_or_else(|| format!("HTTP {}", status));
    warn!(%status, %message, "request rejected");
    ClientError::Rejected(message)
}

fn error_message(body: &Value) -> Option<String> {
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
