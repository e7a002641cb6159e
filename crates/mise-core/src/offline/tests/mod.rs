pub mod auto_replay_tests;
pub mod cache_tests;
pub mod support;
pub mod types_tests;
