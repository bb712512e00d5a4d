//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for database entities, providing a clean API for data access
//! with tenant-aware methods. Repositories are generic over the connection
//! so the same code runs against the pool or inside an open transaction.

pub mod audit_log;
pub mod department;
pub mod employee;
pub mod team;
pub mod tenant;
pub mod user;

pub use audit_log::AuditLogRepository;
pub use department::DepartmentRepository;
pub use employee::EmployeeRepository;
pub use team::TeamRepository;
pub use tenant::{CreateTenantRequest, TenantRepository};
pub use user::{CreateUserRequest, UserRepository};
