// Parallel execution over many subjects
pub mod batch;
