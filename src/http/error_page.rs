//! Diagnostic error page
//!
//! Renders a handler failure and the request that caused it as HTML.

use hyper::http::request::Parts;
use std::error::Error;
use std::fmt::Write;

/// Render the 500 page for `error` raised while serving `request`
///
/// With `show_details` off only the generic heading is rendered.
pub fn render_error_page(request: &Parts, error: &dyn Error, show_details: bool) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>500 Internal Server Error</title>\n<style>\n\
         body { font-family: -apple-system, \"Segoe UI\", Roboto, sans-serif; margin: 2em; color: #222; }\n\
         pre { background: #f6f6f6; padding: 1em; overflow-x: auto; }\n\
         table { border-collapse: collapse; }\n\
         td { border-top: 1px solid #ddd; padding: 0.25em 1em 0.25em 0; vertical-align: top; }\n\
         </style>\n</head>\n<body>\n<h1>500 Internal Server Error</h1>\n",
    );

    if show_details {
        write_details(&mut html, request, error);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn write_details(html: &mut String, request: &Parts, error: &dyn Error) {
    // Writing into a String cannot fail
    let _ = writeln!(html, "<h2>Error</h2>\n<pre>{}", escape_html(&error.to_string()));
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = writeln!(html, "caused by: {}", escape_html(&cause.to_string()));
        source = cause.source();
    }
    html.push_str("</pre>\n");

    let _ = writeln!(
        html,
        "<h2>Request</h2>\n<pre>{} {} {:?}</pre>",
        escape_html(request.method.as_str()),
        escape_html(&request.uri.to_string()),
        request.version,
    );

    html.push_str("<table>\n");
    for (name, value) in &request.headers {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape_html(name.as_str()),
            escape_html(&String::from_utf8_lossy(value.as_bytes())),
        );
    }
    html.push_str("</table>\n");
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
