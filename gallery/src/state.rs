//! Client-side gallery view state.

use crate::resolver::{fallback_chain, SizeClass};
use std::collections::HashMap;
use store::PhotoRecord;

/// Case-insensitive substring match on the display name. An empty filter
/// matches everything.
pub fn matches_name(record: &PhotoRecord, filter: &str) -> bool {
    filter.is_empty()
        || record
            .name
            .to_lowercase()
            .contains(&filter.to_lowercase())
}

/// Prefix match against `uploadDate`, so `2024-05-01` matches any time on
/// that day. An empty filter matches everything.
pub fn matches_date(record: &PhotoRecord, filter: &str) -> bool {
    filter.is_empty() || record.upload_date.starts_with(filter)
}

/// View state of the gallery page: the record list, both filters, the
/// modal selection and which fallback step each failed photo is on.
#[derive(Debug, Default)]
pub struct GalleryState {
    photos: Vec<PhotoRecord>,
    pub name_filter: String,
    pub date_filter: String,
    selected: Option<String>,
    loading: bool,
    // photo id -> index into its fallback chain
    failed: HashMap<String, usize>,
}

impl GalleryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record list after a sync. Error depths survive so a
    /// re-render does not retry a known-bad URL; entries for records that
    /// disappeared are dropped. The latest sync response wins.
    pub fn set_photos(&mut self, photos: Vec<PhotoRecord>) {
        self.failed
            .retain(|id, _| photos.iter().any(|p| &p.id == id));
        if let Some(selected) = &self.selected {
            if !photos.iter().any(|p| &p.id == selected) {
                self.selected = None;
            }
        }
        self.photos = photos;
    }

    pub fn photos(&self) -> &[PhotoRecord] {
        &self.photos
    }

    /// Records passing both filters, in store order.
    pub fn visible(&self) -> Vec<&PhotoRecord> {
        self.photos
            .iter()
            .filter(|p| matches_name(p, &self.name_filter) && matches_date(p, &self.date_filter))
            .collect()
    }

    pub fn select(&mut self, id: &str) {
        if self.photos.iter().any(|p| p.id == id) {
            self.selected = Some(id.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&PhotoRecord> {
        let id = self.selected.as_deref()?;
        self.photos.iter().find(|p| p.id == id)
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// URL the given photo should currently render with, honoring any
    /// remembered failures.
    pub fn current_url(&self, id: &str, size: SizeClass) -> Option<String> {
        let record = self.photos.iter().find(|p| p.id == id)?;
        let chain = fallback_chain(record, size);
        let depth = *self.failed.get(id).unwrap_or(&0);
        Some(chain[depth.min(chain.len() - 1)].clone())
    }

    /// Record a load failure and move one step down the chain, never
    /// forward. Returns the next URL to attempt; at the end of the chain it
    /// stays on the placeholder.
    pub fn mark_failed(&mut self, id: &str, size: SizeClass) -> Option<String> {
        let record = self.photos.iter().find(|p| p.id == id)?;
        let chain = fallback_chain(record, size);
        let depth = self.failed.entry(id.to_string()).or_insert(0);
        *depth = (*depth + 1).min(chain.len() - 1);
        Some(chain[*depth].clone())
    }

    /// Forget a photo's error state so the next render starts from the top
    /// of its chain again.
    pub fn retry(&mut self, id: &str) {
        self.failed.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::PLACEHOLDER_URL;
    use store::DriveData;

    fn record(id: &str, name: &str, upload_date: &str) -> PhotoRecord {
        PhotoRecord {
            id: id.into(),
            name: name.into(),
            filename: name.into(),
            upload_date: upload_date.into(),
            size: 1,
            drive_data: None,
        }
    }

    fn drive_record(id: &str) -> PhotoRecord {
        PhotoRecord {
            id: id.into(),
            name: format!("{}.jpg", id),
            filename: id.into(),
            upload_date: "2024-05-01T10:00:00Z".into(),
            size: 1,
            drive_data: Some(DriveData {
                file_id: Some(id.into()),
                web_view_link: None,
                thumbnail_link: Some("https://lh3.googleusercontent.com/x=s220".into()),
                mime_type: None,
            }),
        }
    }

    #[test]
    fn test_name_filter_case_insensitive() {
        let mut state = GalleryState::new();
        state.set_photos(vec![
            record("1", "Sunset.jpg", "2024-05-01T10:00:00Z"),
            record("2", "Beach.png", "2024-05-01T10:00:00Z"),
        ]);
        state.name_filter = "sun".into();

        let names: Vec<&str> = state.visible().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Sunset.jpg"]);
    }

    #[test]
    fn test_date_filter_is_prefix_match() {
        let photo = record("1", "a.jpg", "2024-05-01T10:00:00Z");
        assert!(matches_date(&photo, "2024-05-01"));
        assert!(!matches_date(&photo, "2024-05-02"));
        assert!(matches_date(&photo, ""));
    }

    #[test]
    fn test_filters_combine() {
        let mut state = GalleryState::new();
        state.set_photos(vec![
            record("1", "Sunset.jpg", "2024-05-01T10:00:00Z"),
            record("2", "sunrise.png", "2024-05-02T10:00:00Z"),
        ]);
        state.name_filter = "SUN".into();
        state.date_filter = "2024-05-02".into();

        let ids: Vec<&str> = state.visible().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn test_fallback_walks_chain_once_and_sticks() {
        let mut state = GalleryState::new();
        state.set_photos(vec![drive_record("d1")]);

        assert_eq!(
            state.current_url("d1", SizeClass::Thumbnail).unwrap(),
            "https://lh3.googleusercontent.com/x=s400"
        );
        assert_eq!(
            state.mark_failed("d1", SizeClass::Thumbnail).unwrap(),
            "/drive-image/d1"
        );
        assert_eq!(
            state.mark_failed("d1", SizeClass::Thumbnail).unwrap(),
            PLACEHOLDER_URL
        );
        // Never loops back past the placeholder.
        assert_eq!(
            state.mark_failed("d1", SizeClass::Thumbnail).unwrap(),
            PLACEHOLDER_URL
        );
        // Re-render keeps the remembered depth rather than retrying.
        assert_eq!(
            state.current_url("d1", SizeClass::Thumbnail).unwrap(),
            PLACEHOLDER_URL
        );
    }

    #[test]
    fn test_retry_resets_error_state() {
        let mut state = GalleryState::new();
        state.set_photos(vec![drive_record("d1")]);
        state.mark_failed("d1", SizeClass::Thumbnail);

        state.retry("d1");
        assert_eq!(
            state.current_url("d1", SizeClass::Thumbnail).unwrap(),
            "https://lh3.googleusercontent.com/x=s400"
        );
    }

    #[test]
    fn test_set_photos_drops_stale_state() {
        let mut state = GalleryState::new();
        state.set_photos(vec![drive_record("d1"), drive_record("d2")]);
        state.select("d2");
        state.mark_failed("d1", SizeClass::Thumbnail);

        state.set_photos(vec![drive_record("d1")]);
        assert!(state.selected().is_none());
        // d1's failure depth survives the refresh.
        assert_eq!(
            state.current_url("d1", SizeClass::Thumbnail).unwrap(),
            "/drive-image/d1"
        );
    }

    #[test]
    fn test_selection_roundtrip() {
        let mut state = GalleryState::new();
        state.set_photos(vec![record("1", "a.jpg", "2024-05-01T10:00:00Z")]);

        state.select("missing");
        assert!(state.selected().is_none());

        state.select("1");
        assert_eq!(state.selected().unwrap().id, "1");
        state.clear_selection();
        assert!(state.selected().is_none());
    }
}
