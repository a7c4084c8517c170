use anyhow::{Context, Result, bail};

const DEFAULT_SEED: u64 = 1337;

/// Split a comma separated CLI value, dropping empty entries.
#[must_use]
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve CLI seed tokens into a deduplicated seed list.
///
/// Accepts decimal integers (negative values use their magnitude), `0x` hex
/// literals and inclusive ranges written `start..end`.
///
/// # Errors
///
/// Returns an error for tokens that are none of the above, or for reversed ranges.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    for token in tokens {
        if let Some((start, end)) = token.split_once("..") {
            let start = parse_seed(start)?;
            let end = parse_seed(end)?;
            if start > end {
                bail!("seed range {token} runs backwards");
            }
            seeds.extend(start..=end);
            continue;
        }
        seeds.push(parse_seed(token)?);
    }

    let mut deduped = Vec::with_capacity(seeds.len());
    for seed in seeds {
        if !deduped.contains(&seed) {
            deduped.push(seed);
        }
    }
    if deduped.is_empty() {
        deduped.push(DEFAULT_SEED);
    }
    Ok(deduped)
}

fn parse_seed(token: &str) -> Result<u64> {
    let token = token.trim();
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .with_context(|| format!("Unrecognized seed token: {token}"));
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }
    token
        .parse::<u64>()
        .with_context(|| format!("Unrecognized seed token: {token}"))
}

/// Seed used for iteration `index` of a base seed.
#[must_use]
pub fn iteration_seed(seed: u64, index: usize) -> u64 {
    seed.wrapping_add(u64::try_from(index).unwrap_or(u64::MAX))
}
