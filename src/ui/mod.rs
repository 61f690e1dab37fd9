pub mod chart;
pub mod menu;
pub mod report;
