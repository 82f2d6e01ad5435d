pub mod pandoc;
pub mod types;

use crate::error::EngineError;
use anyhow::Result;

pub use types::{ConvertRequest, EngineDiag, WrapMode};

/// Boundary to the external document converter.
pub trait Engine {
    fn doctor(&self) -> Result<EngineDiag>;
    fn convert(&self, req: &ConvertRequest) -> Result<(), EngineError>;
}

impl<E: Engine + ?Sized> Engine for &E {
    fn doctor(&self) -> Result<EngineDiag> {
        (**self).doctor()
    }

    fn convert(&self, req: &ConvertRequest) -> Result<(), EngineError> {
        (**self).convert(req)
    }
}
