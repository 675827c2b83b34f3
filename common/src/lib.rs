//! Survey Reconcile Common Library
//!
//! ヘッダー照合コア（カタログ・照合・競合解決・レコード抽出）
//! CLIから利用される、I/Oを持たない純粋な処理群

pub mod types;
pub mod catalog;
pub mod conflict;
pub mod reconciler;
pub mod extractor;
pub mod legacy;
pub mod grouping;
pub mod error;

pub use types::{
    CardDisplayType, ChartDisplayType, DisplacedColumn, EmployeeRecord, FieldGroup, MatchKind,
    ProfileImage, ReconciledMapping, ReportEntry, PROFILE_IMAGE_KEY,
};
pub use catalog::{CanonicalFieldCatalog, CanonicalFieldSpec};
pub use conflict::{is_numeric_value, ConflictPolicy, NumericPreference};
pub use reconciler::{clean_label, similarity, HeaderMap, HeaderReconciler, ReconcilerOptions};
pub use extractor::extract;
pub use legacy::{is_valid_survey_filename, parse_legacy_line, parse_legacy_text};
pub use grouping::{group_fields, visible_fields, DEFAULT_GROUP_ORDER};
pub use error::{Error, Result};
