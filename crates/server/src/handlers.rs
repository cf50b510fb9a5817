//! Route handlers
//!
//! Thin adapters between HTTP and the core pipeline: every generation
//! request parses its inputs, runs parse -> compose -> assemble -> serialize
//! on a blocking thread, and streams the resulting bytes back. Nothing is
//! kept after the response; all working data is request-scoped.

use crate::archive::zip_documents;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use overlay::{assemble, AssemblyOutput, Entry, ProcessLog, ZoneConfig};
use pdf_core::TemplatePdf;
use roster::load_entries_from_sources;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

/// Embedded single-page web UI
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// Health check - accessible without API key
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "verso",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "web": "/",
            "preview": "/preview",
            "upload": "/upload",
            "api": "/api/generate"
        }
    }))
}

/// Configuration status
pub async fn api_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "operational",
        "api_key_required": state.config.require_api_key,
        "default_template": state.config.default_template.display().to_string(),
    }))
}

/// Preview the concatenated, column-detected rows of the uploaded CSVs
pub async fn preview(multipart: Multipart) -> Result<Json<Value>, ApiError> {
    let form = read_form(multipart).await?;
    if form.csv_sources.is_empty() {
        return Err(ApiError::Validation("No CSV file provided".to_string()));
    }

    let roster = load_entries_from_sources(&form.csv_sources)?;
    let data: Vec<Value> = roster
        .entries
        .iter()
        .map(|entry| {
            json!({
                "row": entry.row,
                "name": entry.name,
                "address": entry.address,
            })
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "total": data.len(),
        "nameColumn": roster.name_column,
        "addressColumn": roster.address_column,
        "data": data,
    })))
}

/// Generate one PDF per row from uploaded CSVs + template and return a ZIP
pub async fn upload(multipart: Multipart) -> Result<Response, ApiError> {
    let mut form = read_form(multipart).await?;
    if form.csv_sources.is_empty() {
        return Err(ApiError::Validation(
            "CSV and PDF files are required".to_string(),
        ));
    }
    let template_bytes = form
        .pdf
        .take()
        .ok_or_else(|| ApiError::Validation("CSV and PDF files are required".to_string()))?;

    let roster = load_entries_from_sources(&form.csv_sources)?;
    let payload = run_pipeline(
        template_bytes,
        roster.entries,
        form.name_position,
        form.address_position,
        false,
        true,
    )
    .await?;
    Ok(payload.into_download("pdfs_with_addresses"))
}

/// JSON or multipart generation API, optionally guarded by an API key
pub async fn generate(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    check_api_key(&state, &request)?;

    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    let (entries, template_bytes, name_position, address_position, single_file) = if is_json {
        let bytes = axum::body::to_bytes(request.into_body(), 32 * 1024 * 1024)
            .await
            .map_err(|e| ApiError::Validation(format!("Unreadable body: {e}")))?;
        let payload: GenerateRequest = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Validation(format!("Invalid JSON body: {e}")))?;
        if payload.data.is_empty() {
            return Err(ApiError::Validation("The \"data\" field is required".to_string()));
        }

        let entries: Vec<Entry> = payload
            .data
            .into_iter()
            .enumerate()
            .map(|(i, row)| Entry {
                row: i + 1,
                name: row.name,
                address: row.address,
            })
            .collect();
        let template_bytes = default_template(&state).await?;
        (
            entries,
            template_bytes,
            payload.name_position,
            payload.address_position,
            payload.single_file,
        )
    } else {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {e}")))?;
        let form = read_form(multipart).await?;
        if form.csv_sources.is_empty() {
            return Err(ApiError::Validation(
                "No CSV files or data provided".to_string(),
            ));
        }

        let roster = load_entries_from_sources(&form.csv_sources)?;
        let template_bytes = match form.pdf {
            Some(bytes) => bytes,
            None => default_template(&state).await?,
        };
        (
            roster.entries,
            template_bytes,
            form.name_position,
            form.address_position,
            form.single_file,
        )
    };

    let payload = run_pipeline(
        template_bytes,
        entries,
        name_position,
        address_position,
        single_file,
        false,
    )
    .await?;
    Ok(payload.into_download("generated_pdfs"))
}

/// Parsed multipart form shared by /preview, /upload and /api/generate
#[derive(Default)]
struct GenerationForm {
    csv_sources: Vec<(String, String)>,
    pdf: Option<Vec<u8>>,
    name_position: Option<ZoneConfig>,
    address_position: Option<ZoneConfig>,
    single_file: bool,
}

async fn read_form(mut multipart: Multipart) -> Result<GenerationForm, ApiError> {
    let mut form = GenerationForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "csvFiles" => {
                let label = field
                    .file_name()
                    .unwrap_or("data.csv")
                    .to_string();
                let content = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Unreadable CSV upload: {e}")))?;
                form.csv_sources.push((label, content));
            }
            "pdfFile" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Unreadable PDF upload: {e}")))?;
                if !bytes.is_empty() {
                    form.pdf = Some(bytes.to_vec());
                }
            }
            "namePosition" => {
                form.name_position = parse_zone_param(
                    "namePosition",
                    field.text().await.ok().as_deref(),
                )?;
            }
            "addressPosition" => {
                form.address_position = parse_zone_param(
                    "addressPosition",
                    field.text().await.ok().as_deref(),
                )?;
            }
            "singleFile" => {
                form.single_file = field
                    .text()
                    .await
                    .map(|v| v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false);
            }
            other => {
                debug!(field = other, "ignoring unknown multipart field");
            }
        }
    }

    Ok(form)
}

/// Parse an optional JSON zone parameter; empty strings count as absent
fn parse_zone_param(name: &str, raw: Option<&str>) -> Result<Option<ZoneConfig>, ApiError> {
    match raw {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => serde_json::from_str(text)
            .map(Some)
            .map_err(|e| ApiError::Validation(format!("Invalid {name}: {e}"))),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(default)]
    data: Vec<GenerateEntry>,
    #[serde(default)]
    name_position: Option<ZoneConfig>,
    #[serde(default)]
    address_position: Option<ZoneConfig>,
    #[serde(default)]
    single_file: bool,
}

#[derive(Deserialize)]
struct GenerateEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    address: String,
}

/// Serialized generation result ready to stream back
enum GenerationPayload {
    Pdf(Vec<u8>),
    Zip(Vec<u8>),
}

impl GenerationPayload {
    fn into_download(self, stem: &str) -> Response {
        let (content_type, filename, bytes) = match self {
            GenerationPayload::Pdf(bytes) => ("application/pdf", "generated.pdf".to_string(), bytes),
            GenerationPayload::Zip(bytes) => ("application/zip", format!("{stem}.zip"), bytes),
        };
        (
            [
                (header::CONTENT_TYPE, content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            bytes,
        )
            .into_response()
    }
}

/// Run the blocking generation pipeline on a worker thread
async fn run_pipeline(
    template_bytes: Vec<u8>,
    entries: Vec<Entry>,
    name_position: Option<ZoneConfig>,
    address_position: Option<ZoneConfig>,
    single_file: bool,
    always_zip: bool,
) -> Result<GenerationPayload, ApiError> {
    let result = tokio::task::spawn_blocking(move || -> Result<(GenerationPayload, ProcessLog), ApiError> {
        let template = TemplatePdf::open_from_bytes(&template_bytes)?;
        let assembly = assemble(
            &template,
            &entries,
            name_position.as_ref(),
            address_position.as_ref(),
            single_file,
        )?;

        let payload = match assembly.output {
            AssemblyOutput::Combined(bytes) => GenerationPayload::Pdf(bytes),
            AssemblyOutput::PerEntry(documents) => {
                if documents.len() == 1 && !always_zip {
                    GenerationPayload::Pdf(documents.into_iter().next().expect("one document").bytes)
                } else {
                    GenerationPayload::Zip(
                        zip_documents(&documents).map_err(ApiError::Internal)?,
                    )
                }
            }
        };
        Ok((payload, assembly.log))
    })
    .await
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("generation task failed: {e}")))?;

    let (payload, log) = result?;
    info!(log = %log, "generation finished");
    Ok(payload)
}

/// Read the default template configured for JSON-mode generation
async fn default_template(state: &AppState) -> Result<Vec<u8>, ApiError> {
    let path = &state.config.default_template;
    tokio::fs::read(path).await.map_err(|e| {
        ApiError::Validation(format!(
            "No template uploaded and default template {} is unavailable: {e}",
            path.display()
        ))
    })
}

/// Enforce the optional API-key guard on /api/generate
fn check_api_key(state: &AppState, request: &Request) -> Result<(), ApiError> {
    if !state.config.require_api_key {
        return Ok(());
    }

    let provided = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| query_api_key(request.uri().query()));

    match (provided, &state.config.api_key) {
        (None, _) => Err(ApiError::Unauthorized(
            "Missing API key: set the X-API-Key header or ?api_key=".to_string(),
        )),
        (Some(provided), Some(expected)) if &provided == expected => Ok(()),
        (Some(_), _) => Err(ApiError::Forbidden("Invalid API key".to_string())),
    }
}

/// Extract `api_key` from a raw query string
fn query_api_key(query: Option<&str>) -> Option<String> {
    query?
        .split('&')
        .find_map(|pair| pair.strip_prefix("api_key="))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_health_payload() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "verso");
        assert!(body["endpoints"]["api"].is_string());
    }

    #[test]
    fn test_parse_zone_param_absent() {
        assert!(parse_zone_param("namePosition", None).unwrap().is_none());
        assert!(parse_zone_param("namePosition", Some("  "))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_parse_zone_param_valid() {
        let zone = parse_zone_param("addressPosition", Some(r#"{"left": 95, "bottom": 20}"#))
            .unwrap()
            .unwrap();
        assert_eq!(zone.left, Some(95.0));
        assert_eq!(zone.bottom, Some(20.0));
    }

    #[test]
    fn test_parse_zone_param_invalid() {
        let err = parse_zone_param("namePosition", Some("{broken")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_query_api_key() {
        assert_eq!(
            query_api_key(Some("api_key=secret&x=1")),
            Some("secret".to_string())
        );
        assert_eq!(query_api_key(Some("x=1")), None);
        assert_eq!(query_api_key(None), None);
    }

    #[test]
    fn test_generate_request_shape() {
        let payload: GenerateRequest = serde_json::from_str(
            r#"{
                "data": [{"name": "Jean Dupont", "address": "12 Rue A"}],
                "namePosition": {"left": 20, "bottom": 250, "width": 80, "height": 30},
                "singleFile": true
            }"#,
        )
        .unwrap();
        assert_eq!(payload.data.len(), 1);
        assert_eq!(payload.data[0].name, "Jean Dupont");
        assert!(payload.single_file);
        assert!(payload.name_position.is_some());
        assert!(payload.address_position.is_none());
    }
}
