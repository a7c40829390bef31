//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `keeply_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // Tiny probe validating core crate wiring independently of any host UI.
    println!("keeply_core ping={}", keeply_core::ping());
    println!("keeply_core version={}", keeply_core::core_version());
}
