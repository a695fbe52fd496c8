use anyhow::{anyhow, Result};

pub const MIN_SECRET_BYTES: usize = 16;
const PLACEHOLDER_PREFIXES: [&str; 3] = ["change-me", "changeme", "replace-me"];

pub fn validate_secret(name: &str, value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{} must not be empty", name));
    }
    if trimmed.len() < MIN_SECRET_BYTES {
        return Err(anyhow!(
            "{} must be at least {} bytes",
            name,
            MIN_SECRET_BYTES
        ));
    }
    let lowered = trimmed.to_ascii_lowercase();
    if PLACEHOLDER_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
    {
        return Err(anyhow!("{} is still a placeholder value", name));
    }
    Ok(())
}

pub fn validate_range(name: &str, value: i64, min: i64, max: i64) -> Result<()> {
    if value < min || value > max {
        return Err(anyhow!("{} must be between {} and {}", name, min, max));
    }
    Ok(())
}

pub fn validate_positive(name: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(anyhow!("{} must be greater than 0", name));
    }
    Ok(())
}
