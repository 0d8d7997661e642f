pub mod collector_logs;
pub mod data;
pub mod health;
pub mod livesplit;
pub mod runs;
pub mod screenshots;
pub mod segments;
