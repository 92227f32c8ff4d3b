mod r2r;
mod rsp_engine;

pub use r2r::R2ROperator;
pub use rsp_engine::{BindingWithTimestamp, RDFStream, RSPEngine};
