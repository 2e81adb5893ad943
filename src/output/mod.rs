pub mod formatter;

pub use formatter::{
    format_batch_table, format_elapsed, format_error, format_feature_table, format_importance,
    format_metric_checks, format_prediction, format_price, should_use_colors,
};
