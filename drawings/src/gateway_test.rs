use plan::Drawing;
use uuid::Uuid;

use super::*;

#[test]
fn error_codes_are_stable() {
    let id = Uuid::new_v4();
    assert_eq!(GatewayError::NotFound(id).error_code(), "E_DRAWING_NOT_FOUND");
    assert_eq!(GatewayError::Database(sqlx::Error::PoolTimedOut).error_code(), "E_DATABASE");

    let decode = DrawingRecord::from_json("{").unwrap_err();
    assert_eq!(GatewayError::from(decode).error_code(), "E_RECORD_DECODE");
    assert_eq!(GatewayError::from(ConfigError::UnknownBackend("x".into())).error_code(), "E_CONFIG_BACKEND");
}

#[test]
fn not_found_message_names_the_id() {
    let id = Uuid::new_v4();
    assert_eq!(GatewayError::NotFound(id).to_string(), format!("drawing not found: {id}"));
}

#[test]
fn summary_copies_listing_fields() {
    let mut drawing = Drawing::new();
    drawing.name = "Cabin".into();
    let stored = StoredDrawing { id: Uuid::new_v4(), record: drawing.to_record(), created_at: 10, updated_at: 20 };

    let summary = DrawingSummary::from(&stored);
    assert_eq!(summary.id, stored.id);
    assert_eq!(summary.name, "Cabin");
    assert!(summary.total_sqm.abs() < f64::EPSILON);
    assert_eq!((summary.created_at, summary.updated_at), (10, 20));
}

#[test]
fn now_ms_is_after_2020() {
    assert!(now_ms() > 1_577_836_800_000);
}
