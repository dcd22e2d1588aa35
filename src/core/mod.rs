pub mod batch;
pub mod dispatcher;
pub mod normalizer;
pub mod reports;
pub mod resolver;
pub mod run;

pub use crate::domain::model::{Record, ReportTable};
pub use crate::domain::ports::{ConfigProvider, Mailer, RecordReader, ReportWriter};
pub use crate::utils::error::Result;
