//! Media type inference for configured content items.

pub const TEXT_HTML: &str = "text/html";
pub const TEXT_PLAIN: &str = "text/plain";
pub const APPLICATION_JSON: &str = "application/json";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Media type for a content item, by file-name suffix (case-insensitive).
pub fn media_type_for(name: &str) -> &'static str {
    let Some((_, ext)) = name.rsplit_once('.') else {
        return OCTET_STREAM;
    };
    // A dot inside a directory component is not an extension.
    if ext.contains('/') || ext.contains('\\') {
        return OCTET_STREAM;
    }

    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => TEXT_HTML,
        "txt" => TEXT_PLAIN,
        "json" => APPLICATION_JSON,
        _ => OCTET_STREAM,
    }
}
