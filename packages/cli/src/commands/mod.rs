pub mod check;
pub mod html_data;

pub use check::{check, CheckArgs};
pub use html_data::{html_data, HtmlDataArgs};
