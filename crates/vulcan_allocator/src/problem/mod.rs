pub mod allocation_problem;
pub mod catalog;
pub mod demand;
pub mod tables;
