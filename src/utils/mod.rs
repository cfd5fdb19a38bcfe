pub mod countdown;
pub mod export_excel;
pub mod validation;
