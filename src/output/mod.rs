pub mod formatter;

pub use formatter::{
    assessment_to_json, format_assessment, format_score, format_summary, should_use_colors,
};
