pub mod roadmap;
pub mod user;
