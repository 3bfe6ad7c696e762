//! `GET /`: landing page.

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;

use crate::render::{escape_html, page_shell};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home))
}

/// GET /: HTML landing page.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "HTML landing page", content_type = "text/html")),
    tag = "pages"
)]
async fn home(State(state): State<AppState>) -> Html<String> {
    let links = [
        ("/v1/agencies?format=html", "Agencies"),
        ("/v1/titles?format=html", "Titles"),
        ("/v1/titles/40/structure?format=html", "Title 40 structure"),
        ("/v1/search?format=html", "Search"),
        ("/openapi.json", "OpenAPI document"),
    ];
    let mut body = String::from(
        "<h2>Overview</h2>\n<p>Agencies, CFR titles and title structure ingested from the \
eCFR API. Every listing is also available as JSON or CSV.</p>\n<ul>\n",
    );
    for (href, label) in links {
        body.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            escape_html(href),
            escape_html(label)
        ));
    }
    body.push_str("</ul>\n");
    body.push_str(&format!(
        "<p class=\"empty\">Store backend: {}</p>",
        escape_html(state.store.backend())
    ));
    Html(page_shell(&state.config.project_env, "Overview", &body))
}
