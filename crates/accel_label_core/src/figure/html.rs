//! Standalone HTML export of a figure.

use super::Figure;

const PLOTLY_SCRIPT_URL: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Wraps `figure` in a self-contained page that renders it with plotly.js.
pub fn render_html(figure: &Figure, title: &str) -> serde_json::Result<String> {
    // `</` would end the inline script early.
    let json = figure.to_json()?.replace("</", "<\\/");
    let title = escape_html(title);

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_SCRIPT_URL}"></script>
</head>
<body>
<div id="graph" style="height: 90vh"></div>
<script>
const figure = {json};
Plotly.newPlot("graph", figure.data, figure.layout);
</script>
</body>
</html>
"#
    ))
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}
