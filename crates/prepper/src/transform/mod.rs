//! Transformation requests and the records kept for undo.

mod record;
mod request;

pub use record::TransformationRecord;
pub use request::{
    EncodeMethod, ImputeMethod, ScaleMethod, TransformAction, TransformRequest, Transformation,
};
