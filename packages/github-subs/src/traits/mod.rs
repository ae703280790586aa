//! Trait abstractions at the pipeline's external seams.

pub mod fetcher;
