//! Statistics domain - frequency tables

pub mod frequency_table;

pub use frequency_table::{FrequencyRow, FrequencyTable};
