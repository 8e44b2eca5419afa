pub mod dashboard;
pub mod leads;
