//! 表示用グループ化
//!
//! 照合結果をフィールドグループごとにまとめ、display_order順に並べる。
//! カード表示の対象列（非表示以外）もここで抽出する。

use crate::reconciler::HeaderMap;
use crate::types::{CardDisplayType, FieldGroup, ReconciledMapping};
use std::collections::BTreeMap;

/// 既定のグループ表示順
pub const DEFAULT_GROUP_ORDER: [FieldGroup; 7] = [
    FieldGroup::BasicInfo,
    FieldGroup::PerformanceRatings,
    FieldGroup::PerformanceComments,
    FieldGroup::SoftwareTools,
    FieldGroup::EmployeeDevelopment,
    FieldGroup::OverallAssessment,
    FieldGroup::AdditionalData,
];

/// グループ別にまとめる（グループ内はdisplay_order、同順なら列位置順）
pub fn group_fields(map: &HeaderMap) -> BTreeMap<FieldGroup, Vec<&ReconciledMapping>> {
    let mut groups: BTreeMap<FieldGroup, Vec<&ReconciledMapping>> = BTreeMap::new();
    for mapping in map.mappings() {
        groups.entry(mapping.group).or_default().push(mapping);
    }
    for fields in groups.values_mut() {
        fields.sort_by_key(|m| (m.display_order, m.column_position));
    }
    groups
}

/// カードに表示する列をグループ順に並べて返す
///
/// `group_order` に無いグループは含めない。
pub fn visible_fields<'a>(map: &'a HeaderMap, group_order: &[FieldGroup]) -> Vec<&'a ReconciledMapping> {
    let mut groups = group_fields(map);
    group_order
        .iter()
        .filter_map(|group| groups.remove(group))
        .flatten()
        .filter(|m| m.card_display_type != CardDisplayType::Hidden)
        .collect()
}
