//! Handles serialising and saving results to disk in the _parquet_ file format.

pub mod annual;
pub mod rainseason;

pub use annual::save_annual_means;
pub use rainseason::save_rainseason;
