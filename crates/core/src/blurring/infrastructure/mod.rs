mod box_filter;
pub mod box_blurrer;
