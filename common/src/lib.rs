//! Labeler Common Library
//!
//! 標注ツールのコア: レコードストア、フィルタ、ページング、
//! セッションスナップショット、エクスポート

pub mod error;
pub mod export;
pub mod filter;
pub mod paginator;
pub mod record;
pub mod session;
pub mod snapshot;
pub mod store;

pub use error::{Error, IndexError, LoadError, Result, SnapshotError};
pub use export::{build_export, export_file_name, ExportFile};
pub use filter::{apply, FilterSpec, IdRange, StatusFilter, ViolationFilter};
pub use paginator::{paginate, Page, Paginator};
pub use record::{AnnotationField, ImageSource, Label, Record};
pub use session::{PageView, Session};
pub use snapshot::SessionSnapshot;
pub use store::{RecordStore, Stats};
