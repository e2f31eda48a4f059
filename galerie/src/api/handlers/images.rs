//! HTTP handlers for the read API.

use axum::{Json, extract::State};
use chrono::Utc;
use tracing::{info, instrument};

use crate::{
    AppState,
    api::models::images::{GalleryConfigResponse, ImagesResponse, TestDataResponse},
    errors::Result,
    store::ImageRecord,
};

#[utoipa::path(
    get,
    path = "/api/images",
    tag = "images",
    summary = "List all images",
    description = "Returns every stored image record. Sorting, grouping, search, and \
                   pagination all happen client-side.",
    responses(
        (status = 200, description = "All stored image records", body = ImagesResponse),
    )
)]
#[instrument(skip_all)]
pub async fn list_images(State(state): State<AppState>) -> Json<ImagesResponse> {
    Json(ImagesResponse {
        images: state.store.list().await,
    })
}

#[utoipa::path(
    get,
    path = "/api/config",
    tag = "images",
    summary = "Get gallery settings",
    description = "Gallery view settings the frontend needs: page size and timer intervals.",
    responses(
        (status = 200, description = "Gallery settings", body = GalleryConfigResponse),
    )
)]
#[instrument(skip_all)]
pub async fn get_gallery_config(State(state): State<AppState>) -> Json<GalleryConfigResponse> {
    let gallery = &state.config.gallery;
    Json(GalleryConfigResponse {
        page_size: gallery.page_size,
        refresh_interval_ms: gallery.refresh_interval.as_millis() as u64,
        slideshow_interval_ms: gallery.slideshow_interval.as_millis() as u64,
        download_stagger_ms: gallery.download_stagger.as_millis() as u64,
    })
}

#[utoipa::path(
    get,
    path = "/api/test-data",
    tag = "images",
    summary = "Add sample records",
    description = "Appends two deterministic sample records for development.",
    responses(
        (status = 200, description = "Sample records appended", body = TestDataResponse),
    )
)]
#[instrument(skip_all)]
pub async fn add_test_data(State(state): State<AppState>) -> Result<Json<TestDataResponse>> {
    let now = Utc::now();
    let samples = vec![
        ImageRecord {
            id: "test1".to_string(),
            file_id: "test1".to_string(),
            full_url: "https://picsum.photos/800/600?random=1".to_string(),
            thumbnail_url: Some("https://picsum.photos/300/300?random=1".to_string()),
            caption: Some("Beautiful landscape".to_string()),
            width: Some(800),
            height: Some(600),
            message_id: 1,
            timestamp: now,
        },
        ImageRecord {
            id: "test2".to_string(),
            file_id: "test2".to_string(),
            full_url: "https://picsum.photos/800/600?random=2".to_string(),
            thumbnail_url: Some("https://picsum.photos/300/300?random=2".to_string()),
            caption: Some("City skyline at night".to_string()),
            width: Some(800),
            height: Some(600),
            message_id: 2,
            timestamp: now,
        },
    ];

    let mut count = 0;
    for record in samples {
        if state.store.insert(record).await? {
            count += 1;
        }
    }

    info!(count, "Appended sample records");
    Ok(Json(TestDataResponse {
        status: "Test data added".to_string(),
        count,
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, create_test_app_with_state, create_test_config, sample_record};
    use axum::http::StatusCode;
    use serde_json::Value;

    #[tokio::test]
    async fn test_empty_store_returns_empty_images_array() {
        let app = create_test_app(create_test_config()).await;

        let response = app.get("/api/images").await;
        response.assert_status(StatusCode::OK);

        let json: Value = response.json();
        assert_eq!(json, serde_json::json!({"images": []}));
    }

    #[tokio::test]
    async fn test_list_images_returns_stored_records() {
        let (app, state) = create_test_app_with_state(create_test_config()).await;
        state.store.insert(sample_record("a", 1)).await.unwrap();
        state.store.insert(sample_record("b", 2)).await.unwrap();

        let response = app.get("/api/images").await;
        response.assert_status(StatusCode::OK);

        let json: Value = response.json();
        let images = json["images"].as_array().unwrap();
        assert_eq!(images.len(), 2);
        assert!(images.iter().all(|i| !i["full_url"].as_str().unwrap().is_empty()));
    }

    #[tokio::test]
    async fn test_gallery_config_exposes_view_settings() {
        let app = create_test_app(create_test_config()).await;

        let response = app.get("/api/config").await;
        response.assert_status(StatusCode::OK);

        let json: Value = response.json();
        assert_eq!(json["page_size"], 24);
        assert!(json["refresh_interval_ms"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_add_test_data_is_idempotent_on_ids() {
        let app = create_test_app(create_test_config()).await;

        let first: Value = app.get("/api/test-data").await.json();
        assert_eq!(first["count"], 2);

        // Same ids again: nothing further is appended.
        let second: Value = app.get("/api/test-data").await.json();
        assert_eq!(second["count"], 0);

        let images: Value = app.get("/api/images").await.json();
        assert_eq!(images["images"].as_array().unwrap().len(), 2);
    }
}
