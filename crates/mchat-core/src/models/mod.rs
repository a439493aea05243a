pub mod answer;
pub mod patient;
pub mod report;
pub mod result;
pub mod token_count;
