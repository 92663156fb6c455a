pub mod boundaries;
pub mod longest;
pub mod report;
pub mod sentences;
pub mod weighting;
