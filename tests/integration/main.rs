//! Integration tests for the traversal engines

mod crawl_tests;
