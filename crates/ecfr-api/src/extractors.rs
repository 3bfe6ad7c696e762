//! # Query-String Extraction & Validation
//!
//! Every read endpoint takes its filters from the query string. Parse
//! failures become [`AppError::BadRequest`] (400); values that parse but
//! fall outside their bounds become [`AppError::Validation`] (422).

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use ecfr_core::{EntityType, UpdatedDate};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;
use crate::query::{SearchRequest, DEFAULT_LIMIT, MAX_LIMIT};
use crate::render::OutputFormat;

/// Parameter types that check bounds beyond what serde enforces.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Extract a query string, mapping deserialization errors to 400.
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a query string and validate it, 422 on a bounds failure.
pub fn extract_validated_query<T: Validate>(
    result: Result<Query<T>, QueryRejection>,
) -> Result<T, AppError> {
    let value = extract_query(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Extract a path parameter, mapping parse errors to 400.
pub fn extract_path<T>(result: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    result
        .map(|Path(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

fn check_limit(limit: Option<i64>) -> Result<(), String> {
    match limit {
        Some(n) if n < 1 || n > MAX_LIMIT as i64 => {
            Err(format!("limit must be between 1 and {MAX_LIMIT}, got {n}"))
        }
        _ => Ok(()),
    }
}

fn check_format(format: &Option<String>) -> Result<(), String> {
    match format {
        Some(f) => f.parse::<OutputFormat>().map(|_| ()),
        None => Ok(()),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn resolved_limit(limit: Option<i64>) -> usize {
    limit
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT)
}

fn resolved_format(format: &Option<String>) -> OutputFormat {
    format
        .as_deref()
        .and_then(|f| f.parse().ok())
        .unwrap_or_default()
}

/// `?format=` alone.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormatParams {
    /// `json` (default), `csv` or `html`.
    pub format: Option<String>,
}

impl Validate for FormatParams {
    fn validate(&self) -> Result<(), String> {
        check_format(&self.format)
    }
}

impl FormatParams {
    pub fn format(&self) -> OutputFormat {
        resolved_format(&self.format)
    }
}

/// `?limit=&format=` for list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Rows to return, 1 to 200. Defaults to 25.
    pub limit: Option<i64>,
    /// `json` (default), `csv` or `html`.
    pub format: Option<String>,
}

impl Validate for ListParams {
    fn validate(&self) -> Result<(), String> {
        check_limit(self.limit)?;
        check_format(&self.format)
    }
}

impl ListParams {
    pub fn limit(&self) -> usize {
        resolved_limit(self.limit)
    }

    pub fn format(&self) -> OutputFormat {
        resolved_format(&self.format)
    }
}

/// Filters for `GET /v1/search`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// `agency`, `agency_title`, `title`, `structure` or `snapshot`.
    pub entity_type: Option<String>,
    /// Restrict to the `TITLE#<n>` partition.
    #[param(value_type = Option<u32>)]
    pub title: Option<String>,
    /// Restrict to the `AGENCY#<slug>` partition.
    pub agency: Option<String>,
    /// Rows to return, 1 to 200. Defaults to 25.
    pub limit: Option<i64>,
    /// `json` (default), `csv` or `html`.
    pub format: Option<String>,
}

impl Validate for SearchParams {
    fn validate(&self) -> Result<(), String> {
        check_limit(self.limit)?;
        check_format(&self.format)?;
        if let Some(t) = non_blank(&self.entity_type) {
            t.parse::<EntityType>().map_err(|e| e.to_string())?;
        }
        if let Some(n) = non_blank(&self.title) {
            n.parse::<u32>()
                .map_err(|_| format!("title must be a positive integer, got {n:?}"))?;
        }
        Ok(())
    }
}

impl SearchParams {
    pub fn format(&self) -> OutputFormat {
        resolved_format(&self.format)
    }

    /// The store-level request. Blank values, as submitted by an empty
    /// HTML form field, count as absent.
    pub fn to_request(&self) -> SearchRequest {
        SearchRequest {
            entity_type: non_blank(&self.entity_type).and_then(|t| t.parse().ok()),
            title: non_blank(&self.title).and_then(|n| n.parse().ok()),
            agency: non_blank(&self.agency).map(str::to_string),
            limit: resolved_limit(self.limit),
        }
    }
}

/// `?from=&format=` for snapshot history.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryParams {
    /// Earliest snapshot date to include, `YYYY-MM-DD`.
    pub from: Option<String>,
    /// `json` (default), `csv` or `html`.
    pub format: Option<String>,
}

impl Validate for HistoryParams {
    fn validate(&self) -> Result<(), String> {
        check_format(&self.format)?;
        if let Some(from) = non_blank(&self.from) {
            UpdatedDate::parse(from).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

impl HistoryParams {
    pub fn format(&self) -> OutputFormat {
        resolved_format(&self.format)
    }

    pub fn from_date(&self) -> Option<UpdatedDate> {
        non_blank(&self.from).and_then(|f| UpdatedDate::parse(f).ok())
    }
}
