pub mod error;
pub mod model;
pub mod threshold;
pub mod classifier;
pub mod aggregator;
pub mod alert;
pub mod report;
pub mod source;
pub mod fixtures;

pub use error::{AireError, Result};
pub use model::{
    AggregateResult, Alert, AlertTier, ClassificationResult, MetricKind, PredictionPoint, Sample,
    Severity, WindowRange,
};
pub use threshold::{Band, ThresholdRegistry};
pub use classifier::{classify, evaluate_snapshot};
pub use aggregator::{aggregate, summarize_predictions, PredictionSummary};
pub use alert::{derive_alerts, recommendation, AlertPolicy};
pub use report::{
    to_delimited_text, to_report_document, to_wide_delimited_text, Cell, ReportDocument,
    ReportMeta, ReportTable,
};
pub use source::{
    ExportSink, FileExportSink, FixtureSource, PredictionSource, RefreshSelection, SampleSource,
};
