pub mod dashboard;
pub mod delays;
pub mod gates;
pub mod timeline;
