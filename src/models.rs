pub mod catalog;
pub mod marketplace;
pub mod pricing;
pub mod sales;
