//! Rendering of the run's artifacts: plotly figures and maud HTML pages.
pub mod eda;
pub mod pages;
pub mod plots;
