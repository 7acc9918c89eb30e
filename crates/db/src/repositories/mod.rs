//! Repository implementations for database operations.

pub mod company;
pub mod dashboard;
pub mod trip;
pub mod truck;

pub use company::CompanyRepository;
pub use dashboard::DashboardRepository;
pub use trip::TripRepository;
pub use truck::TruckRepository;
