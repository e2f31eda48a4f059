//! Gallery view state.
//!
//! The browser gallery keeps all of its UI state in one place: the image
//! list, the search query, the current page, the lightbox position, the
//! selection, and the slideshow flag. [`GalleryState`] is that object as an
//! explicit struct with accessor methods, so the pagination, grouping, and
//! search behaviour is testable without a browser.
//!
//! All view operations work on the *filtered* list (the images matching the
//! current query, sorted newest first). Pagination is fixed-size and
//! 1-based; page 1 is always valid, even for an empty gallery.

use chrono::Datelike;
use std::collections::BTreeSet;
use std::time::Duration;

use crate::store::ImageRecord;

/// Images of one calendar month, newest month first in [`GalleryState::month_groups`].
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup {
    /// Human-readable label, e.g. "March 2026"
    pub label: String,
    pub images: Vec<ImageRecord>,
}

/// The single reactive object driving the gallery UI.
#[derive(Debug, Clone)]
pub struct GalleryState {
    images: Vec<ImageRecord>,
    query: String,
    page: usize,
    page_size: usize,
    selected: BTreeSet<String>,
    lightbox: Option<usize>,
    slideshow: bool,
    download_stagger: Duration,
}

impl GalleryState {
    pub fn new(page_size: usize, download_stagger: Duration) -> Self {
        // A zero page size would make every page empty; config validation
        // rejects it, this is a second line of defence for direct callers.
        let page_size = page_size.max(1);
        Self {
            images: Vec::new(),
            query: String::new(),
            page: 1,
            page_size,
            selected: BTreeSet::new(),
            lightbox: None,
            slideshow: false,
            download_stagger,
        }
    }

    /// Replace the image list, re-sorting descending by timestamp.
    pub fn set_images(&mut self, mut images: Vec<ImageRecord>) {
        images.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.images = images;
        self.clamp_view();
    }

    /// Apply a refresh poll result and report how many new images arrived.
    ///
    /// The count diff drives the "new arrivals" notification; the view state
    /// (page, query, selection) is kept so a background poll does not yank
    /// the user around.
    pub fn apply_refresh(&mut self, images: Vec<ImageRecord>) -> usize {
        let new_arrivals = images.len().saturating_sub(self.images.len());
        self.set_images(images);
        new_arrivals
    }

    /// Drop everything, as the gallery does when a fetch fails.
    pub fn clear(&mut self) {
        self.images.clear();
        self.page = 1;
        self.selected.clear();
        self.lightbox = None;
        self.slideshow = false;
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    // --- search ---

    /// Set the free-text filter. Changing the query resets to page 1.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
        self.lightbox = None;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    fn matches(&self, record: &ImageRecord) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let needle = self.query.to_lowercase();
        if let Some(caption) = &record.caption
            && caption.to_lowercase().contains(&needle)
        {
            return true;
        }
        formatted_date(record).to_lowercase().contains(&needle)
    }

    /// The images matching the current query, newest first.
    pub fn filtered(&self) -> Vec<&ImageRecord> {
        self.images.iter().filter(|r| self.matches(r)).collect()
    }

    // --- pagination ---

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total pages = ceil(N/P). Never 0: an empty gallery has one empty page.
    pub fn total_pages(&self) -> usize {
        self.filtered().len().div_ceil(self.page_size).max(1)
    }

    /// Current 1-based page number, always within 1..=total_pages.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.page.saturating_sub(1));
    }

    /// The fixed-size window of the filtered list for the current page.
    pub fn current_page(&self) -> Vec<ImageRecord> {
        let filtered = self.filtered();
        let start = (self.page - 1) * self.page_size;
        filtered.into_iter().skip(start).take(self.page_size).cloned().collect()
    }

    /// Group the current page by calendar month, newest month first.
    pub fn month_groups(&self) -> Vec<MonthGroup> {
        let mut groups: Vec<((i32, u32), MonthGroup)> = Vec::new();
        for image in self.current_page() {
            let key = (image.timestamp.year(), image.timestamp.month());
            match groups.last_mut() {
                Some((last_key, group)) if *last_key == key => group.images.push(image),
                _ => {
                    let label = image.timestamp.format("%B %Y").to_string();
                    groups.push((key, MonthGroup { label, images: vec![image] }));
                }
            }
        }
        groups.into_iter().map(|(_, g)| g).collect()
    }

    // --- lightbox ---

    /// Open the lightbox at an index into the filtered list.
    pub fn open_lightbox(&mut self, index: usize) {
        if index < self.filtered().len() {
            self.lightbox = Some(index);
        }
    }

    pub fn close_lightbox(&mut self) {
        self.lightbox = None;
        self.slideshow = false;
    }

    /// The image currently shown in the lightbox, if it is open.
    pub fn lightbox_image(&self) -> Option<&ImageRecord> {
        let filtered = self.filtered();
        self.lightbox.and_then(|i| filtered.get(i).copied())
    }

    /// Advance to the next image, wrapping at the end.
    pub fn next_image(&mut self) {
        let len = self.filtered().len();
        if let Some(i) = self.lightbox
            && len > 0
        {
            self.lightbox = Some((i + 1) % len);
        }
    }

    /// Step back to the previous image, wrapping at the start.
    pub fn prev_image(&mut self) {
        let len = self.filtered().len();
        if let Some(i) = self.lightbox
            && len > 0
        {
            self.lightbox = Some((i + len - 1) % len);
        }
    }

    // --- slideshow ---

    pub fn start_slideshow(&mut self) {
        if !self.filtered().is_empty() {
            self.slideshow = true;
            if self.lightbox.is_none() {
                self.lightbox = Some(0);
            }
        }
    }

    pub fn stop_slideshow(&mut self) {
        self.slideshow = false;
    }

    pub fn slideshow_running(&self) -> bool {
        self.slideshow
    }

    /// Timer tick: advance the slideshow to the next image, wrapping.
    pub fn advance_slideshow(&mut self) {
        if self.slideshow {
            self.next_image();
        }
    }

    // --- selection & batch download ---

    /// Toggle selection of an image by id. Unknown ids are ignored.
    pub fn toggle_selected(&mut self, id: &str) {
        if self.selected.remove(id) {
            return;
        }
        if self.images.iter().any(|r| r.id == id) {
            self.selected.insert(id.to_string());
        }
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Plan a staggered batch download of the selection.
    ///
    /// Returns (url, delay) pairs in display order, drawn from the filtered
    /// list - a selected image hidden by the current query is not downloaded.
    /// Each download starts one stagger interval after the previous so the
    /// browser is not asked for everything at once.
    pub fn staggered_download_plan(&self) -> Vec<(String, Duration)> {
        self.filtered()
            .into_iter()
            .filter(|r| self.selected.contains(&r.id))
            .enumerate()
            .map(|(i, r)| (r.full_url.clone(), self.download_stagger * i as u32))
            .collect()
    }

    fn clamp_view(&mut self) {
        self.page = self.page.clamp(1, self.total_pages());
        let filtered_len = self.filtered().len();
        if let Some(i) = self.lightbox
            && i >= filtered_len
        {
            self.lightbox = filtered_len.checked_sub(1);
        }
        let known: BTreeSet<&str> = self.images.iter().map(|r| r.id.as_str()).collect();
        self.selected.retain(|id| known.contains(id.as_str()));
    }
}

/// Full date as shown under an image, e.g. "07 March 2026".
///
/// Search matches against this string, so "march 2026" finds a month and
/// "07 march" a day.
pub fn formatted_date(record: &ImageRecord) -> String {
    record.timestamp.format("%d %B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{record_at, sample_record};
    use chrono::{TimeZone, Utc};

    fn state_with(count: usize, page_size: usize) -> GalleryState {
        let mut state = GalleryState::new(page_size, Duration::from_millis(300));
        let images = (0..count).map(|i| sample_record(&format!("img-{i}"), i as i64)).collect();
        state.set_images(images);
        state
    }

    #[test]
    fn test_images_sorted_descending_by_timestamp() {
        let state = state_with(5, 24);
        let page = state.current_page();
        for pair in page.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }

    #[test]
    fn test_total_pages_is_ceil_of_count_over_page_size() {
        assert_eq!(state_with(0, 24).total_pages(), 1);
        assert_eq!(state_with(24, 24).total_pages(), 1);
        assert_eq!(state_with(25, 24).total_pages(), 2);
        assert_eq!(state_with(48, 24).total_pages(), 2);
        assert_eq!(state_with(49, 24).total_pages(), 3);
    }

    #[test]
    fn test_25_images_page_2_shows_1_image() {
        let mut state = state_with(25, 24);
        assert_eq!(state.total_pages(), 2);
        assert_eq!(state.current_page().len(), 24);

        state.next_page();
        assert_eq!(state.page(), 2);
        assert_eq!(state.current_page().len(), 1);

        // Past the end clamps to the last page.
        state.next_page();
        assert_eq!(state.page(), 2);
    }

    #[test]
    fn test_page_1_always_valid_when_empty() {
        let state = state_with(0, 24);
        assert_eq!(state.page(), 1);
        assert!(state.current_page().is_empty());
        assert!(state.is_empty());
    }

    #[test]
    fn test_search_is_subset_and_case_insensitive() {
        let mut state = GalleryState::new(24, Duration::ZERO);
        let mut a = sample_record("a", 1);
        a.caption = Some("Beautiful Landscape".to_string());
        let mut b = sample_record("b", 2);
        b.caption = Some("city skyline".to_string());
        let c = sample_record("c", 3);
        state.set_images(vec![a, b, c]);

        state.set_query("LANDSCAPE");
        let hits = state.filtered();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");

        // Every hit is present in the unfiltered list.
        state.set_query("sky");
        for hit in state.filtered() {
            assert!(state.image_count() >= 1);
            assert!(["a", "b", "c"].contains(&hit.id.as_str()));
        }

        state.set_query("");
        assert_eq!(state.filtered().len(), 3);
    }

    #[test]
    fn test_search_matches_formatted_date() {
        let mut state = GalleryState::new(24, Duration::ZERO);
        state.set_images(vec![
            record_at("mar", Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap()),
            record_at("apr", Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap()),
        ]);

        state.set_query("march 2026");
        let hits = state.filtered();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "mar");
    }

    #[test]
    fn test_query_change_resets_to_page_1() {
        let mut state = state_with(50, 24);
        state.go_to_page(3);
        assert_eq!(state.page(), 3);

        state.set_query("nothing matches this");
        assert_eq!(state.page(), 1);
        assert_eq!(state.total_pages(), 1);
    }

    #[test]
    fn test_month_groups_newest_first() {
        let mut state = GalleryState::new(24, Duration::ZERO);
        state.set_images(vec![
            record_at("feb-1", Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap()),
            record_at("mar-1", Utc.with_ymd_and_hms(2026, 3, 7, 0, 0, 0).unwrap()),
            record_at("mar-2", Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap()),
        ]);

        let groups = state.month_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "March 2026");
        assert_eq!(groups[0].images.len(), 2);
        assert_eq!(groups[1].label, "February 2026");
    }

    #[test]
    fn test_lightbox_navigation_wraps() {
        let mut state = state_with(3, 24);
        state.open_lightbox(2);
        state.next_image();
        assert_eq!(state.lightbox_image().unwrap().id, state.filtered()[0].id);

        state.prev_image();
        assert_eq!(state.lightbox_image().unwrap().id, state.filtered()[2].id);
    }

    #[test]
    fn test_lightbox_out_of_range_ignored() {
        let mut state = state_with(2, 24);
        state.open_lightbox(5);
        assert!(state.lightbox_image().is_none());
    }

    #[test]
    fn test_slideshow_advances_and_stops_on_close() {
        let mut state = state_with(2, 24);
        state.start_slideshow();
        assert!(state.slideshow_running());
        let first = state.lightbox_image().unwrap().id.clone();

        state.advance_slideshow();
        assert_ne!(state.lightbox_image().unwrap().id, first);

        state.close_lightbox();
        assert!(!state.slideshow_running());
        assert!(state.lightbox_image().is_none());
    }

    #[test]
    fn test_selection_toggle_and_staggered_plan() {
        let mut state = state_with(3, 24);
        let ids: Vec<String> = state.filtered().iter().map(|r| r.id.clone()).collect();

        state.toggle_selected(&ids[0]);
        state.toggle_selected(&ids[2]);
        state.toggle_selected("unknown-id");
        assert_eq!(state.selected_count(), 2);

        let plan = state.staggered_download_plan();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].1, Duration::ZERO);
        assert_eq!(plan[1].1, Duration::from_millis(300));

        state.toggle_selected(&ids[0]);
        assert_eq!(state.selected_count(), 1);
        state.clear_selection();
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_download_plan_excludes_images_hidden_by_search() {
        let mut state = GalleryState::new(24, Duration::from_millis(300));
        let mut a = sample_record("a", 1);
        a.caption = Some("mountain sunrise".to_string());
        let b = sample_record("b", 2);
        state.set_images(vec![a, b]);

        state.toggle_selected("a");
        state.toggle_selected("b");
        assert_eq!(state.staggered_download_plan().len(), 2);

        state.set_query("mountain");
        let plan = state.staggered_download_plan();
        assert_eq!(plan.len(), 1);
        assert!(plan[0].0.contains("/a.jpg"));
        assert_eq!(plan[0].1, Duration::ZERO);
    }

    #[test]
    fn test_apply_refresh_reports_new_arrivals() {
        let mut state = state_with(3, 24);
        let mut images: Vec<ImageRecord> = (0..5).map(|i| sample_record(&format!("img-{i}"), i)).collect();
        assert_eq!(state.apply_refresh(images.clone()), 2);

        // Same list again: nothing new.
        images.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        assert_eq!(state.apply_refresh(images), 0);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut state = state_with(3, 24);
        state.open_lightbox(0);
        let id = state.filtered()[0].id.clone();
        state.toggle_selected(&id);

        state.clear();
        assert!(state.is_empty());
        assert_eq!(state.page(), 1);
        assert_eq!(state.selected_count(), 0);
        assert!(state.lightbox_image().is_none());
    }

    #[test]
    fn test_refresh_drops_selection_of_vanished_images() {
        let mut state = state_with(2, 24);
        let id = state.filtered()[0].id.clone();
        state.toggle_selected(&id);

        state.apply_refresh(vec![sample_record("other", 9)]);
        assert_eq!(state.selected_count(), 0);
    }
}
