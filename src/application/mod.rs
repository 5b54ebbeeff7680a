// Application layer: problem construction, sample problems and reporting

pub mod problem_builder;
pub mod report;
pub mod samples;

pub use problem_builder::ProblemBuilder;
