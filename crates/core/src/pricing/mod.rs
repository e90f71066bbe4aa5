pub mod matrix;
pub mod totals;
pub mod valuator;

pub use matrix::MatrixResolver;
pub use totals::{DocumentTotals, ProfitSummary};
pub use valuator::{price_line_item, LineItemRequest, PricedLineItem};
