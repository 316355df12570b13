//! Image payload encoding normalization.
//!
//! Rules, applied in order:
//!
//! 1. A data-URL whose payload is itself another data-URL (an upstream
//!    double-encoding defect) is unwrapped to the innermost payload and
//!    re-prefixed with [`CANONICAL_PREFIX`].
//! 2. Raw base64 that looks like a JPEG (`/9j/`) or PNG (`iVBOR`) gets
//!    [`CANONICAL_PREFIX`]. PNG payloads are labeled `jpeg` as well; existing
//!    consumers depend on that shape.
//! 3. Anything else is returned unchanged.

/// Prefix put in front of every payload this module rewrites.
pub const CANONICAL_PREFIX: &str = "data:image/jpeg;base64,";

const JPEG_MAGIC: &str = "/9j/";
const PNG_MAGIC: &str = "iVBOR";

/// If `s` starts with a `data:image/<subtype>;base64,` prefix, return the rest.
pub fn strip_data_url_prefix(s: &str) -> Option<&str> {
    let rest = s.strip_prefix("data:image/")?;
    let marker = rest.find(";base64,")?;
    let subtype = &rest[..marker];
    if subtype.is_empty() || subtype.contains(&[',', ';', '/'][..]) {
        return None;
    }
    Some(&rest[marker + ";base64,".len()..])
}

/// Normalize an image payload into a renderable data URI.
pub fn normalize_image_payload(payload: &str) -> String {
    if let Some(inner) = strip_data_url_prefix(payload) {
        if strip_data_url_prefix(inner).is_some() {
            let mut innermost = inner;
            while let Some(next) = strip_data_url_prefix(innermost) {
                innermost = next;
            }
            return format!("{CANONICAL_PREFIX}{innermost}");
        }
        return payload.to_string();
    }

    if payload.starts_with(JPEG_MAGIC) || payload.starts_with(PNG_MAGIC) {
        return format!("{CANONICAL_PREFIX}{payload}");
    }

    payload.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_prefix_is_collapsed() {
        assert_eq!(
            normalize_image_payload("data:image/png;base64,data:image/jpeg;base64,ABC123"),
            "data:image/jpeg;base64,ABC123"
        );
    }

    #[test]
    fn inner_prefix_is_canonicalized() {
        assert_eq!(
            normalize_image_payload("data:image/jpeg;base64,data:image/png;base64,XYZ"),
            "data:image/jpeg;base64,XYZ"
        );
    }

    #[test]
    fn triple_prefix_is_collapsed() {
        assert_eq!(
            normalize_image_payload(
                "data:image/jpeg;base64,data:image/jpeg;base64,data:image/gif;base64,R0lG"
            ),
            "data:image/jpeg;base64,R0lG"
        );
    }

    #[test]
    fn raw_jpeg_gets_prefix() {
        assert_eq!(
            normalize_image_payload("/9j/4AAQSkZJRg..."),
            "data:image/jpeg;base64,/9j/4AAQSkZJRg..."
        );
    }

    #[test]
    fn raw_png_is_labeled_jpeg() {
        assert_eq!(
            normalize_image_payload("iVBORw0KGgo="),
            "data:image/jpeg;base64,iVBORw0KGgo="
        );
    }

    #[test]
    fn single_prefix_is_unchanged() {
        let png = "data:image/png;base64,iVBORw0KGgo=";
        assert_eq!(normalize_image_payload(png), png);
    }

    #[test]
    fn unrecognized_payload_passes_through() {
        assert_eq!(normalize_image_payload("R0lGODlhAQABAAAAACw="), "R0lGODlhAQABAAAAACw=");
        assert_eq!(normalize_image_payload(""), "");
        assert_eq!(
            normalize_image_payload("https://cdn.example.org/a.jpg"),
            "https://cdn.example.org/a.jpg"
        );
    }

    #[test]
    fn prefix_detection() {
        assert_eq!(strip_data_url_prefix("data:image/webp;base64,AAA"), Some("AAA"));
        assert_eq!(strip_data_url_prefix("data:image/;base64,AAA"), None);
        assert_eq!(strip_data_url_prefix("data:text/plain;base64,AAA"), None);
        assert_eq!(strip_data_url_prefix("/9j/abc"), None);
    }
}
