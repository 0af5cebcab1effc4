//! Print the argon2 hash to put in `ADMIN_PASSWORD_HASH`.
//!
//! Usage: `cargo run --bin hash_password -- <password>`
//! or pipe the password on stdin to keep it out of shell history.

use std::io::BufRead;

use anyhow::{bail, Context};
use swingai_admin::services::auth::hash_password;

fn main() -> anyhow::Result<()> {
    let password = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => std::io::stdin()
            .lock()
            .lines()
            .next()
            .context("Expected a password argument or a line on stdin")??,
    };

    let password = password.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        bail!("Password must not be empty");
    }

    println!("{}", hash_password(password)?);
    Ok(())
}
