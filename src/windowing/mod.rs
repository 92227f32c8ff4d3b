mod csparql_window;
mod sweeper;

pub use csparql_window::{CSPARQLWindow, ReportStrategy, StreamType, Tick, WindowCallback};
pub use sweeper::LateElementSweeper;
