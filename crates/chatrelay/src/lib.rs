pub mod conversation;
pub mod dispatch;
pub mod errors;
pub mod models;
pub mod pool;
pub mod presets;
pub mod prompt_template;
pub mod providers;
pub mod web;
