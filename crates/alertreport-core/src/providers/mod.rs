pub mod github_api;
pub mod link;
