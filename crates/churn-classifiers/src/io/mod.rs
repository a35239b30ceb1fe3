pub mod bank_csv;

pub use bank_csv::read_bank_csv;
