use std::process::Command;

use anyhow::{Context, Result};

/// Workspace crates in dependency order.
const CRATES: &[&str] = &["amocrm-domain", "amocrm-core", "amocrm-infra"];

/// Check that every crate compiles on its own, without features unified by
/// the rest of the workspace.
pub fn check_isolated() -> Result<()> {
    println!("Checking {} amoCRM crates in isolation...", CRATES.len());

    for (index, name) in CRATES.iter().enumerate() {
        println!("\n[{}/{}] cargo check -p {name} --all-targets", index + 1, CRATES.len());

        let status = Command::new("cargo")
            .args(["check", "-p", name, "--all-targets"])
            .status()
            .with_context(|| format!("Failed to run cargo check for '{name}'"))?;

        if !status.success() {
            anyhow::bail!("Crate '{name}' failed to compile on its own");
        }

        println!("✅ {name} compiled successfully");
    }

    println!("\n✅ All {} crates compile in isolation!", CRATES.len());

    Ok(())
}
