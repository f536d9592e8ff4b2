//! Ready-made resource bundles demonstrating the pipeline end to end.

pub mod atc;

#[cfg(test)]
mod __tests__;
