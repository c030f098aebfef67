//! Page layout: height models, splitting, and the two paginators

mod assembly;
pub mod config;
mod estimator;
pub mod font;
mod line_break;
mod manual;
mod measure;
mod pagination;
mod session;
mod splitter;
mod trace;

pub use assembly::{assemble, Page, PageHeader};
pub use config::{PaginationConfig, PaginationMode, PaginationRules, SizingConstants};
pub use estimator::{HeightEstimator, HeightSource, MeasuredHeights};
pub use font::FontMetrics;
pub use line_break::LineBreaker;
pub use manual::{paginate_manual, ContentWarning};
pub use measure::{MonospaceMeasurer, SurfaceGuard, TextMeasurer};
pub use pagination::{paginate, Pagination};
pub use session::{LayoutSession, LayoutUpdate, RemeasureTicket};
pub use splitter::{Cut, ParagraphSplitter, SplitDeclined, SplitResult};
pub use trace::{BreakReason, LayoutTrace, TraceEvent};
