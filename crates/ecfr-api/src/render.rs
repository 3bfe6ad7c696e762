//! # Output Formats
//!
//! Every read endpoint builds one [`View`] and renders it in the format the
//! caller asked for with `?format=`:
//!
//! - `json` (default): the view's data, serialized with serde.
//! - `csv`: the view's [`Table`], header row first.
//! - `html`: a server-rendered page in the shared shell. No scripts; all
//!   text passes through [`escape_html`].
//!
//! The three serializers are independent and see the same query result.

use axum::http::{header, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::Datelike;
use ecfr_core::{
    AgencyRecord, AgencyTitleRecord, Record, SnapshotRecord, StructureNodeRecord, TitleRecord,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Response format selected by `?format=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Html,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "html" => Ok(Self::Html),
            other => Err(format!("unknown format {other:?}, expected json, csv or html")),
        }
    }
}

/// Rows that can be laid out as a flat table.
pub trait ToTable {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

fn opt(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

impl ToTable for AgencyRecord {
    fn headers() -> &'static [&'static str] {
        &["Slug", "Name", "Short Name", "CFR References", "Updated", "Checksum"]
    }

    fn row(&self) -> Vec<String> {
        let refs = self
            .cfr_references
            .iter()
            .map(|r| match &r.chapter {
                Some(ch) => format!("{} ch. {ch}", r.title),
                None => r.title.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        vec![
            self.slug.clone(),
            self.name.clone(),
            opt(&self.short_name),
            refs,
            self.updated_date.to_string(),
            self.checksum.clone(),
        ]
    }
}

impl ToTable for AgencyTitleRecord {
    fn headers() -> &'static [&'static str] {
        &["Agency", "Title", "Chapter", "Updated"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.agency_slug.clone(),
            self.title_number.to_string(),
            opt(&self.chapter),
            self.updated_date.to_string(),
        ]
    }
}

impl ToTable for TitleRecord {
    fn headers() -> &'static [&'static str] {
        &[
            "Number",
            "Name",
            "Latest Amended",
            "Latest Issue",
            "Up To Date As Of",
            "Reserved",
            "Checksum",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.number.to_string(),
            self.name.clone(),
            opt(&self.latest_amended_on),
            opt(&self.latest_issue_date),
            opt(&self.up_to_date_as_of),
            self.reserved.to_string(),
            self.checksum.clone(),
        ]
    }
}

impl ToTable for StructureNodeRecord {
    fn headers() -> &'static [&'static str] {
        &["Type", "Identifier", "Label", "Path", "Checksum"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.node_type.clone(),
            self.identifier.clone(),
            opt(&self.label),
            self.path.clone(),
            self.checksum.clone(),
        ]
    }
}

impl ToTable for SnapshotRecord {
    fn headers() -> &'static [&'static str] {
        &["Agency", "Date", "Word Count", "Checksum"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.agency.clone(),
            self.date.to_string(),
            self.word_count.to_string(),
            self.checksum.clone(),
        ]
    }
}

impl ToTable for Record {
    fn headers() -> &'static [&'static str] {
        &["Entity Type", "PK", "SK", "Name"]
    }

    fn row(&self) -> Vec<String> {
        let name = match self {
            Record::Agency(r) => r.name.clone(),
            Record::AgencyTitle(r) => r.agency_name.clone(),
            Record::Title(r) => r.name.clone(),
            Record::Structure(r) => r.label.clone().unwrap_or_else(|| r.identifier.clone()),
            Record::Snapshot(r) => r.agency.clone(),
        };
        vec![
            self.entity_type().to_string(),
            self.pk().to_string(),
            self.sk().to_string(),
            name,
        ]
    }
}

/// Header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_rows<R: ToTable>(rows: &[R]) -> Self {
        Self {
            headers: R::headers().to_vec(),
            rows: rows.iter().map(ToTable::row).collect(),
        }
    }

    /// Serialize as CSV, header row first.
    pub fn to_csv(&self) -> Result<String, AppError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.headers)
            .map_err(|e| AppError::Internal(format!("csv header: {e}")))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| AppError::Internal(format!("csv row: {e}")))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("csv flush: {e}")))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("csv encoding: {e}")))
    }

    /// Render as an HTML `<table>`; an empty table renders a placeholder.
    pub fn to_html(&self) -> String {
        if self.rows.is_empty() {
            return "<p class=\"empty\">No data.</p>".to_string();
        }
        let mut out = String::from("<table>\n<thead><tr>");
        for h in &self.headers {
            out.push_str(&format!("<th>{}</th>", escape_html(h)));
        }
        out.push_str("</tr></thead>\n<tbody>\n");
        for row in &self.rows {
            out.push_str("<tr>");
            for cell in row {
                out.push_str(&format!("<td>{}</td>", escape_html(cell)));
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n</table>");
        out
    }
}

/// A query result ready for any output format.
#[derive(Debug, Clone)]
pub struct View<T> {
    /// Page heading in HTML.
    pub heading: String,
    /// JSON body.
    pub data: T,
    /// CSV body and HTML table.
    pub table: Table,
    /// Label/value lines shown above the HTML table.
    pub summary: Vec<(String, String)>,
    /// `Content-Disposition` filename for CSV downloads.
    pub filename: String,
    /// Link to the CSV export of this page, shown in HTML.
    pub export_href: Option<String>,
}

impl<T: Serialize> View<T> {
    pub fn new(heading: impl Into<String>, data: T, table: Table) -> Self {
        Self {
            heading: heading.into(),
            data,
            table,
            summary: Vec::new(),
            filename: "export.csv".to_string(),
            export_href: None,
        }
    }

    pub fn summary(mut self, label: impl Into<String>, value: impl ToString) -> Self {
        self.summary.push((label.into(), value.to_string()));
        self
    }

    /// Set the CSV download name. Characters outside `[A-Za-z0-9._-]`
    /// become `_`, since the name may carry decoded path text.
    pub fn filename(mut self, name: impl AsRef<str>) -> Self {
        self.filename = safe_filename(name.as_ref());
        self
    }

    pub fn export_href(mut self, href: impl Into<String>) -> Self {
        self.export_href = Some(href.into());
        self
    }

    /// Render in `format`. `env` labels the HTML page shell.
    pub fn render(self, format: OutputFormat, env: &str) -> Result<Response, AppError> {
        match format {
            OutputFormat::Json => Ok(Json(self.data).into_response()),
            OutputFormat::Csv => {
                let body = self.table.to_csv()?;
                let disposition = HeaderValue::try_from(format!(
                    "attachment; filename=\"{}\"",
                    safe_filename(&self.filename)
                ))
                .map_err(|e| AppError::Internal(format!("content-disposition: {e}")))?;
                Ok((
                    [
                        (
                            header::CONTENT_TYPE,
                            HeaderValue::from_static("text/csv; charset=utf-8"),
                        ),
                        (header::CONTENT_DISPOSITION, disposition),
                    ],
                    body,
                )
                    .into_response())
            }
            OutputFormat::Html => {
                let mut body = format!("<h2>{}</h2>\n", escape_html(&self.heading));
                if !self.summary.is_empty() {
                    body.push_str("<div class=\"summary\"><dl>\n");
                    for (label, value) in &self.summary {
                        body.push_str(&format!(
                            "<dt>{}</dt><dd>{}</dd>\n",
                            escape_html(label),
                            escape_html(value)
                        ));
                    }
                    body.push_str("</dl>");
                    if let Some(href) = &self.export_href {
                        body.push_str(&format!(
                            "<p><a href=\"{}\">Export CSV</a></p>",
                            escape_html(href)
                        ));
                    }
                    body.push_str("</div>\n");
                }
                body.push_str(&self.table.to_html());
                Ok(Html(page_shell(env, &self.heading, &body)).into_response())
            }
        }
    }
}

/// Reduce `name` to `[A-Za-z0-9._-]` so it is safe inside a quoted header
/// parameter.
pub fn safe_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "export.csv".to_string()
    } else {
        cleaned
    }
}

/// Percent-encode one URL path segment.
pub fn path_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;color:#1d2733;background:#f6f7f9}\
header{background:#1d3557;color:#fff;padding:1rem 2rem}\
header h1{margin:0;font-size:1.4rem}\
nav{display:flex;flex-wrap:wrap;gap:1.5rem;padding:1rem 2rem;background:#e9edf2}\
nav form{display:flex;gap:.4rem;align-items:center}\
main{padding:1rem 2rem}\
table{border-collapse:collapse;width:100%;background:#fff}\
th,td{border:1px solid #d0d7de;padding:.35rem .6rem;text-align:left;font-size:.9rem}\
th{background:#f0f3f6}\
.summary dl{display:grid;grid-template-columns:max-content auto;gap:.2rem 1rem}\
.empty{color:#6a737d}\
footer{padding:1rem 2rem;color:#6a737d;font-size:.8rem}";

fn nav() -> String {
    format!(
        "<nav>\n\
<form action=\"/v1/agencies\" method=\"get\">\
<label>Agencies <input type=\"number\" name=\"limit\" value=\"{default}\" min=\"1\" max=\"{max}\"></label>\
<input type=\"hidden\" name=\"format\" value=\"html\"><button type=\"submit\">List</button></form>\n\
<form action=\"/v1/titles\" method=\"get\">\
<label>Titles <input type=\"number\" name=\"limit\" value=\"{default}\" min=\"1\" max=\"{max}\"></label>\
<input type=\"hidden\" name=\"format\" value=\"html\"><button type=\"submit\">List</button></form>\n\
<form action=\"/v1/search\" method=\"get\">\
<label>Title <input type=\"number\" name=\"title\" min=\"1\"></label>\
<label>Agency <input type=\"text\" name=\"agency\" placeholder=\"slug\"></label>\
<input type=\"hidden\" name=\"format\" value=\"html\"><button type=\"submit\">Search</button></form>\n\
</nav>",
        default = crate::query::DEFAULT_LIMIT,
        max = crate::query::MAX_LIMIT,
    )
}

/// Wrap `body` in the shared page layout.
pub fn page_shell(env: &str, heading: &str, body: &str) -> String {
    let env = escape_html(env);
    let year = chrono::Utc::now().year();
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{heading} | eCFR Analytics ({env})</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
<header><h1>eCFR Analytics ({env})</h1></header>\n{nav}\n<main>\n{body}\n</main>\n\
<footer>eCFR Analytics &middot; data from the Electronic Code of Federal Regulations &middot; {year}</footer>\n\
</body>\n</html>\n",
        heading = escape_html(heading),
        nav = nav(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecfr_core::{PartitionKey, SortKey, UpdatedDate};
    use http_body_util::BodyExt;

    fn snapshot(agency: &str, words: u64) -> SnapshotRecord {
        let date = UpdatedDate::parse("2025-08-01").unwrap();
        SnapshotRecord {
            pk: PartitionKey::agency(agency),
            sk: SortKey::snapshot(date),
            agency: agency.into(),
            date,
            checksum: "abc".into(),
            word_count: words,
        }
    }

    async fn body(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn format_parsing() {
        assert_eq!("".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!(" html ".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn csv_header_first_and_quoted() {
        let table = Table::from_rows(&[snapshot("A,B", 3)]);
        let csv = table.to_csv().unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Agency,Date,Word Count,Checksum"));
        assert_eq!(lines.next(), Some("\"A,B\",2025-08-01,3,abc"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_of_empty_table_is_header_only() {
        let csv = Table::from_rows::<SnapshotRecord>(&[]).to_csv().unwrap();
        assert_eq!(csv, "Agency,Date,Word Count,Checksum\n");
    }

    #[test]
    fn html_escapes_cells() {
        let html = Table::from_rows(&[snapshot("<script>alert('x')</script>", 1)]).to_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;"));
    }

    #[test]
    fn escape_html_handles_all_specials() {
        assert_eq!(escape_html(r#"a&b<c>"d'"#), "a&amp;b&lt;c&gt;&quot;d&#x27;");
    }

    #[test]
    fn page_shell_labels_environment() {
        let page = page_shell("prod<1>", "Agencies", "<p>x</p>");
        assert!(page.contains("eCFR Analytics (prod&lt;1&gt;)"));
        assert!(page.contains("<p>x</p>"));
        assert!(page.contains("action=\"/v1/agencies\""));
        assert!(!page.contains("<script"));
    }

    #[test]
    fn safe_filename_strips_header_metacharacters() {
        assert_eq!(safe_filename("history-A\nB.csv"), "history-A_B.csv");
        assert_eq!(safe_filename("history-A\"B.csv"), "history-A_B.csv");
        assert_eq!(
            safe_filename("coverage-environmental-protection-agency.csv"),
            "coverage-environmental-protection-agency.csv"
        );
        assert_eq!(safe_filename(""), "export.csv");
    }

    #[test]
    fn path_segment_encodes_url_metacharacters() {
        assert_eq!(path_segment("A?B&C#D"), "A%3FB%26C%23D");
        assert_eq!(path_segment("a b/c"), "a%20b%2Fc");
        assert_eq!(path_segment("PROTECTI"), "PROTECTI");
    }

    #[tokio::test]
    async fn csv_disposition_survives_control_characters() {
        let rows = vec![snapshot("A", 1)];
        let resp = View::new("History", rows.clone(), Table::from_rows(&rows))
            .filename("history-A\r\nSet-Cookie: x\".csv")
            .render(OutputFormat::Csv, "dev")
            .unwrap();
        let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert_eq!(disposition, "attachment; filename=\"history-A__Set-Cookie__x_.csv\"");
    }

    #[tokio::test]
    async fn view_renders_each_format() {
        let rows = vec![snapshot("GENERAL", 10)];
        let view = || {
            View::new("History", rows.clone(), Table::from_rows(&rows))
                .summary("Total words", 10)
                .filename("history.csv")
        };

        let json = view().render(OutputFormat::Json, "dev").unwrap();
        let value: serde_json::Value = serde_json::from_str(&body(json).await).unwrap();
        assert_eq!(value[0]["word_count"], 10);

        let csv = view().render(OutputFormat::Csv, "dev").unwrap();
        assert_eq!(
            csv.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert!(csv.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("history.csv"));
        assert!(body(csv).await.starts_with("Agency,Date"));

        let html = view().render(OutputFormat::Html, "dev").unwrap();
        let page = body(html).await;
        assert!(page.contains("<h2>History</h2>"));
        assert!(page.contains("<dt>Total words</dt><dd>10</dd>"));
    }
}
