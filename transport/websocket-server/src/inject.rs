//! Browser client script rendering and HTML injection

use livereload_core::ReconnectPolicy;

const CLIENT_TEMPLATE: &str = include_str!("../assets/client.js");

/// Render the browser client for `ws_path`, carrying the same reconnect
/// policy as the native client.
pub fn client_script(ws_path: &str, policy: &ReconnectPolicy) -> String {
    // JSON string literals are valid JavaScript string literals
    let path = serde_json::Value::from(ws_path).to_string();
    let max_attempts = policy
        .max_attempts()
        .map_or_else(|| "null".to_string(), |max| max.to_string());

    CLIENT_TEMPLATE
        .replace("__WS_PATH__", &path)
        .replace("__BASE_DELAY_MS__", &policy.base_delay().as_millis().to_string())
        .replace("__MAX_DELAY_MS__", &policy.max_delay().as_millis().to_string())
        .replace("__MULTIPLIER__", &policy.multiplier().to_string())
        .replace("__MAX_ATTEMPTS__", &max_attempts)
}

/// Insert `<script>` before the last `</body>`, or append it when the
/// document has no closing body tag.
pub fn inject_script(html: &str, script: &str) -> String {
    let tag = format!("<script>{}</script>", script);
    let mut out = String::with_capacity(html.len() + tag.len());

    // ASCII lowercasing keeps byte offsets intact
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(index) => {
            out.push_str(&html[..index]);
            out.push_str(&tag);
            out.push_str(&html[index..]);
        }
        None => {
            out.push_str(html);
            out.push_str(&tag);
        }
    }

    out
}
