//! Ottstream-DB: database schema, migrations, and query operations.
//!
//! SQLite via rusqlite with r2d2 connection pooling. Every query
//! operation borrows a pooled connection passed in by the caller; no
//! global connection state exists.
//!
//! # Modules
//!
//! - `migrations` - embedded schema migrations
//! - `pool` - connection pool management
//! - `models` - Rust models matching the database schema
//! - `queries` - query operations per table
//!
//! # Example
//!
//! ```no_run
//! use ottstream_db::pool::init_pool;
//! use ottstream_db::queries::users;
//!
//! let pool = init_pool("/var/lib/ottstream/app.db").unwrap();
//! let conn = pool.get().unwrap();
//! let user = users::create_user(&conn, "admin", "$2b$12$...", "Admin").unwrap();
//! println!("created {}", user.login_id);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
