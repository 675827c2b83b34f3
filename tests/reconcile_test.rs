//! ヘッダー照合の統合テスト
//!
//! 決定性・一意性・完全一致優先・競合解決・既定値・往復・重複ヘッダーを検証

use survey_reconcile_common::{
    extract, CanonicalFieldCatalog, CanonicalFieldSpec, CardDisplayType, ChartDisplayType, EmployeeRecord,
    FieldGroup, HeaderReconciler, MatchKind, ProfileImage, ReconcilerOptions,
};
use std::collections::HashSet;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn reconciler(catalog: &CanonicalFieldCatalog) -> HeaderReconciler<'_> {
    HeaderReconciler::new(catalog, ReconcilerOptions::default())
}

/// 実データに近い乱れたヘッダー
fn messy_labels() -> Vec<String> {
    strings(&[
        "ID",
        "Start time",
        "Name",
        "Name",
        "Communication",
        "Communication notes",
        "Communication2",
        "Revit",
        "Revit ",
        "Random Field Xyz123",
        "Random Field Xyz123",
        "",
        "Employee\nStrengths",
        "Software & Tools2",
    ])
}

#[test]
fn test_reconcile_is_deterministic() {
    let catalog = CanonicalFieldCatalog::default_catalog();
    let labels = messy_labels();
    let sample = strings(&["1", "2024-01-01", "Jane", "Jane", "4", "ok", "good", "3", "2", "x", "y", "", "z", "w"]);

    let first = serde_json::to_string(&reconciler(&catalog).reconcile(&labels, Some(&sample))).unwrap();
    for _ in 0..5 {
        let again = serde_json::to_string(&reconciler(&catalog).reconcile(&labels, Some(&sample))).unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn test_keys_and_positions_are_unique() {
    let catalog = CanonicalFieldCatalog::default_catalog();
    let map = reconciler(&catalog).reconcile(&messy_labels(), None);

    let mut keys = HashSet::new();
    let mut positions = HashSet::new();
    for (position, mapping) in map.iter() {
        assert_eq!(position, mapping.column_position);
        assert!(keys.insert(mapping.canonical_key.clone()), "重複キー: {}", mapping.canonical_key);
        assert!(positions.insert(mapping.column_position));
    }

    // 外れた列は対応付けに残らない
    for displaced in map.displaced() {
        assert!(map.get(displaced.column_position).is_none());
    }
}

#[test]
fn test_separate_datasets_do_not_share_state() {
    let catalog = CanonicalFieldCatalog::default_catalog();
    let reconciler = reconciler(&catalog);

    let first = reconciler.reconcile(&strings(&["Communication"]), None);
    let second = reconciler.reconcile(&strings(&["ID", "Communication"]), None);

    assert_eq!(first.position_of("communication_rating"), Some(0));
    assert_eq!(second.position_of("communication_rating"), Some(1));
}

#[test]
fn test_exact_match_beats_earlier_fuzzy_column() {
    let catalog = CanonicalFieldCatalog::default_catalog();
    let map = reconciler(&catalog).reconcile(&strings(&["Communication score", "Communication"]), None);

    assert_eq!(map.position_of("communication_rating"), Some(1));
    assert_eq!(map.get(1).map(|m| m.match_kind), Some(MatchKind::Exact));
    assert!(map.get(0).is_none());
    assert_eq!(map.displaced()[0].column_position, 0);
}

#[test]
fn test_numeric_column_wins_conflict() {
    let catalog = CanonicalFieldCatalog::default_catalog();
    let labels = strings(&["Communication notes", "Communication score"]);
    let sample = strings(&["Great communicator", "4"]);

    let map = reconciler(&catalog).reconcile(&labels, Some(&sample));
    assert_eq!(map.position_of("communication_rating"), Some(1));

    // 列順を入れ替えても数値列が勝つ
    let labels = strings(&["Communication score", "Communication notes"]);
    let sample = strings(&["4", "Great communicator"]);
    let map = reconciler(&catalog).reconcile(&labels, Some(&sample));
    assert_eq!(map.position_of("communication_rating"), Some(0));
}

#[test]
fn test_both_numeric_keeps_first_column() {
    // 両方数値なら先の列を残す（意味が違っても区別できない）
    let catalog = CanonicalFieldCatalog::default_catalog();
    let labels = strings(&["Communication clarity", "Communication timeliness"]);
    let sample = strings(&["5", "2"]);

    let map = reconciler(&catalog).reconcile(&labels, Some(&sample));
    assert_eq!(map.position_of("communication_rating"), Some(0));
    assert_eq!(map.displaced().len(), 1);
    assert_eq!(map.displaced()[0].winner_position, 0);
}

#[test]
fn test_unknown_header_falls_back_after_real_fields() {
    let catalog = CanonicalFieldCatalog::default_catalog();
    let map = reconciler(&catalog).reconcile(&strings(&["Random Field Xyz123"]), None);

    let mapping = map.get(0).unwrap();
    assert_eq!(mapping.match_kind, MatchKind::Fallback);
    assert_eq!(mapping.canonical_key, "random_field_xyz123");
    assert_eq!(mapping.group, FieldGroup::AdditionalData);
    assert_eq!(mapping.card_display_type, CardDisplayType::Hidden);
    assert!(mapping.display_order > catalog.max_display_order());
}

#[test]
fn test_round_trip_scenario() {
    let catalog = CanonicalFieldCatalog::default_catalog();
    let labels = strings(&["ID", "Name", "Communication", "Communication2"]);
    let row = strings(&["1", "Jane", "4", "Good"]);

    let map = reconciler(&catalog).reconcile(&labels, Some(&row));
    let record = extract(&row, &map);

    assert_eq!(record.get("id"), Some("1"));
    assert_eq!(record.get("employee_name"), Some("Jane"));
    assert_eq!(record.get("communication_rating"), Some("4"));
    assert_eq!(record.get("communication_comments"), Some("Good"));
    assert_eq!(record.len(), 4);
}

fn software_tools_catalog() -> CanonicalFieldCatalog {
    let spec = |position: usize, key: &str, card: CardDisplayType| CanonicalFieldSpec {
        canonical_key: key.to_string(),
        expected_label: "Software & Tools2".to_string(),
        group: FieldGroup::SoftwareTools,
        card_display_type: card,
        chart_display_type: ChartDisplayType::Hidden,
        display_order: position as u32,
        catalog_position: position,
    };
    CanonicalFieldCatalog::new(vec![
        spec(40, "software_tools_feedback", CardDisplayType::MultilineText),
        spec(19, "software_tools_rating", CardDisplayType::NumericRating),
    ])
    .unwrap()
}

#[test]
fn test_duplicate_header_binds_nearest_position() {
    let catalog = software_tools_catalog();
    let labels: Vec<String> = (0..42)
        .map(|i| match i {
            20 | 41 => "Software & Tools2".to_string(),
            _ => format!("Filler {}", i),
        })
        .collect();

    let map = reconciler(&catalog).reconcile(&labels, None);

    assert_eq!(map.position_of("software_tools_rating"), Some(20));
    assert_eq!(map.position_of("software_tools_feedback"), Some(41));
    assert_eq!(map.get(20).map(|m| m.match_kind), Some(MatchKind::Exact));
    assert_eq!(map.len(), 42);
}

#[test]
fn test_report_lists_every_column_in_order() {
    let catalog = CanonicalFieldCatalog::default_catalog();
    let labels = strings(&["ID", "Name", "Mystery", "Revit"]);
    let report = reconciler(&catalog).reconcile(&labels, None).report();

    let letters: Vec<&str> = report.iter().map(|e| e.column_letter.as_str()).collect();
    assert_eq!(letters, vec!["A", "B", "C", "D"]);
    assert_eq!(report[2].original_label, "Mystery");
    assert_eq!(report[2].match_kind, MatchKind::Fallback);
}

#[test]
fn test_fallback_order_exceeds_custom_catalog_orders() {
    let catalog = CanonicalFieldCatalog::new(vec![CanonicalFieldSpec {
        canonical_key: "notes".to_string(),
        expected_label: "Notes".to_string(),
        group: FieldGroup::AdditionalData,
        card_display_type: CardDisplayType::MultilineText,
        chart_display_type: ChartDisplayType::Hidden,
        display_order: 1200,
        catalog_position: 0,
    }])
    .unwrap();

    let map = reconciler(&catalog).reconcile(&strings(&["Notes", "Random Field Xyz123"]), None);

    let fallback = map.get(1).unwrap();
    assert_eq!(fallback.match_kind, MatchKind::Fallback);
    assert!(fallback.display_order > catalog.max_display_order());
    assert_eq!(fallback.display_order, 1201);
}

#[test]
fn test_profile_image_header_does_not_shadow_image_binding() {
    let catalog = CanonicalFieldCatalog::default_catalog();
    let labels = strings(&["Name", "Profile Image"]);
    let row = strings(&["Jane", "jane.jpg"]);

    let map = reconciler(&catalog).reconcile(&labels, Some(&row));
    assert_eq!(map.get(1).map(|m| m.canonical_key.as_str()), Some("profile_image_2"));

    let mut record = extract(&row, &map);
    record.set_profile_image(ProfileImage::missing());

    let json = serde_json::to_string(&record).unwrap();
    assert_eq!(json.matches("\"profile_image\"").count(), 1);

    let restored: EmployeeRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, record);
    assert_eq!(restored.get("profile_image_2"), Some("jane.jpg"));
}
