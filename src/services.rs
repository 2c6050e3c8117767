pub mod catalog_service;
pub mod marketplace_service;
pub mod pricing_service;
pub mod sales_service;
