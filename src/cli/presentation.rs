//! CLI presentation: text formatters per command family.

mod batch;
mod shared;

pub use batch::{format_batch_summary, format_competition_results, format_single_results};
pub use shared::{format_api_status, format_preset_list};
