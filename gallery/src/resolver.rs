//! Image-URL resolution.
//!
//! For each photo the resolver produces one deterministic fallback chain,
//! first match wins:
//!
//! 1. the Drive thumbnail link, with its size token swapped for the
//!    requested size class,
//! 2. the local proxy endpoint for the Drive file id (taken from
//!    `driveData.fileId`, or extracted from the web-view link),
//! 3. the static placeholder.
//!
//! Load failures walk the same chain one step down, never forward.

use store::PhotoRecord;

pub const PLACEHOLDER_URL: &str = "/placeholder-image.svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    Thumbnail,
    Full,
}

impl SizeClass {
    /// Pixel size substituted into the Drive thumbnail link's `=sNNN` token.
    pub fn pixel_size(&self) -> u32 {
        match self {
            SizeClass::Thumbnail => 400,
            SizeClass::Full => 1600,
        }
    }
}

/// Local proxy endpoint that streams the Drive file server-side.
pub fn proxy_url(file_id: &str) -> String {
    format!("/drive-image/{}", file_id)
}

/// Swap the `=sNNN` size token of a Drive thumbnail link.
///
/// Drive thumbnail links end in a size marker such as `=s220`; the gallery
/// requests a larger rendition by rewriting the number. A link without a
/// recognizable token is returned unchanged.
fn sized_thumbnail(link: &str, pixel_size: u32) -> String {
    if let Some(pos) = link.rfind("=s") {
        let digits_start = pos + 2;
        let digits_end = link[digits_start..]
            .find(|c: char| !c.is_ascii_digit())
            .map(|i| digits_start + i)
            .unwrap_or(link.len());
        if digits_end > digits_start {
            return format!("{}=s{}{}", &link[..pos], pixel_size, &link[digits_end..]);
        }
    }
    link.to_string()
}

/// Extract the Drive file id embedded in a web-view link.
///
/// Handles the `/file/d/<id>/view` and `?id=<id>` URL shapes.
pub fn extract_file_id(view_link: &str) -> Option<&str> {
    if let Some(rest) = view_link.split("/d/").nth(1) {
        let id = rest
            .split(|c| c == '/' || c == '?' || c == '#')
            .next()
            .unwrap_or("");
        if !id.is_empty() {
            return Some(id);
        }
    }
    if let Some(rest) = view_link.split("id=").nth(1) {
        let id = rest.split('&').next().unwrap_or("");
        if !id.is_empty() {
            return Some(id);
        }
    }
    None
}

/// The full ordered URL chain for a record, always ending in the placeholder.
pub fn fallback_chain(record: &PhotoRecord, size: SizeClass) -> Vec<String> {
    let mut chain = Vec::new();

    if let Some(drive) = &record.drive_data {
        if let Some(thumbnail) = &drive.thumbnail_link {
            chain.push(sized_thumbnail(thumbnail, size.pixel_size()));
        }
        let file_id = drive
            .file_id
            .as_deref()
            .or_else(|| drive.web_view_link.as_deref().and_then(extract_file_id));
        if let Some(file_id) = file_id {
            chain.push(proxy_url(file_id));
        }
    } else {
        // Local records are served straight from the uploads directory.
        chain.push(format!("/uploads/{}", record.filename));
    }

    chain.push(PLACEHOLDER_URL.to_string());
    chain
}

/// The single URL to attempt first for a record and size class.
pub fn resolve(record: &PhotoRecord, size: SizeClass) -> String {
    fallback_chain(record, size)
        .into_iter()
        .next()
        .expect("chain is never empty")
}
