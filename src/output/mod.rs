mod report;

pub use report::ReportRenderer;
