pub mod assembler;
pub mod histogram;

pub use assembler::{GridAssembler, SkyImage};
pub use histogram::IntensityHistogram;
