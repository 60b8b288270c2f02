//! Integration tests driven by wiremock servers

mod crawl_tests;
mod pipeline_tests;
