pub mod chart_service;
pub mod query_service;
pub mod series_service;
pub mod stock_service;
