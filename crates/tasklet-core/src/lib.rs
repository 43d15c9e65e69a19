pub mod models;
pub mod config;
pub mod db;
pub mod error;
pub mod auth;
pub mod provider;
pub mod tasks;
pub mod wrapper;

pub use models::*;
pub use config::{Config, DatabaseConfig, DisplayConfig, SyncConfig, SyncSection};
pub use db::{LiveQuery, LocalDb, Results, Sort, SortField, WriteTxn};
pub use error::{Result, TaskletError};
pub use auth::{AuthService, Credentials, RemoteApp, SessionStore};
pub use provider::{SyncBinding, TaskProvider};
pub use tasks::{AppProps, TaskApp};
pub use wrapper::{AppWrapper, Screen, SyncFlow};
