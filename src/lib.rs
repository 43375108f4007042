pub mod config;
pub mod logger;
pub mod error;
pub mod content;
pub mod text_utils;
pub mod slug;
pub mod normalizer;
pub mod post_list;
pub mod file_ops;
pub mod manifest;
pub mod pipeline;
mod test_data;
