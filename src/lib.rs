pub mod chart;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod states;
pub mod stats;
pub mod web;
