pub mod dataset;
pub mod render;
pub mod series;
pub mod step;
pub mod symbols;

pub use dataset::{DateRange, Dataset, PriceColumn, PricePoint};
pub use render::{Banner, BannerLevel, DateSeries, PlotPanel, PlotSpec, StepOutput};
pub use series::TimeSeries;
pub use step::AnalysisStep;
pub use symbols::{CompanyRecord, SymbolTable};
