pub mod reducer;

pub use reducer::SpectrumReducer;
