mod pipeline_test;
mod properties_test;
