use std::path::Path;

use axum::response::Html;

use crate::models::Route;

/// render_page
///
/// Produces the HTML document for a route the guard let through. When the built
/// front-end is present, its `index.html` is served with the resolved route injected as
/// a `<meta name="x-route">` tag. Otherwise a minimal shell exposing the `#app` mount
/// point is returned.
pub async fn render_page(route: &Route, asset_dir: &Path) -> Html<String> {
    match tokio::fs::read_to_string(asset_dir.join("index.html")).await {
        Ok(index) => Html(inject_route_meta(&index, route)),
        Err(e) => {
            tracing::trace!(error = %e, "No built index.html, serving the fallback shell");
            Html(fallback_shell(route))
        }
    }
}

/// Inserts the route marker right before `</head>`, or prepends it when the document
/// has no head element.
pub fn inject_route_meta(index: &str, route: &Route) -> String {
    let meta = format!(
        r#"<meta name="x-route" content="{}">"#,
        escape_attr(&route.name)
    );
    match index.find("</head>") {
        Some(at) => {
            let mut document = String::with_capacity(index.len() + meta.len());
            document.push_str(&index[..at]);
            document.push_str(&meta);
            document.push_str(&index[at..]);
            document
        }
        None => format!("{meta}{index}"),
    }
}

pub fn fallback_shell(route: &Route) -> String {
    let name = escape_attr(&route.name);
    let page = escape_attr(route.page.as_str());
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta name="x-route" content="{name}">
<title>{name}</title>
</head>
<body>
<div id="app" data-route="{name}" data-page="{page}"></div>
</body>
</html>
"#
    )
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
