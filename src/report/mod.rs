pub mod driver;
pub mod formatting;
pub mod writer;

pub use driver::{run_report, run_report_at};
pub use writer::ReportWriter;
