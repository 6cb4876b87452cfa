//! Business logic services for the AutoPeças Manager server

pub mod auth;
pub mod category;
pub mod dashboard;
pub mod part;
pub mod sale;
pub mod stock;
pub mod supplier;

pub use auth::AuthService;
pub use category::CategoryService;
pub use dashboard::DashboardService;
pub use part::PartService;
pub use sale::{SaleNumberGenerator, SaleService};
pub use supplier::SupplierService;
