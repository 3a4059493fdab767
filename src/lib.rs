pub mod adapter;
pub mod assembler;
pub mod constants;
pub mod data_backend;
pub mod data_types;
pub mod date_range;
pub mod errors;
pub mod plan_fetcher;
pub mod shared_main;
pub mod text_utils;
