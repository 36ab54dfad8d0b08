//! # Caja Entry Point
//!
//! The actual setup is in lib.rs so commands and services are testable.
//!
//! ```text
//! $ caja login cajero_1
//! $ caja sell 3*A1 20+B2 --pay cash:50
//! $ caja logout --note EFECTIVO=1500
//! ```

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    caja_register::run().await
}
