use thiserror::Error;

/// Multipliers from the unit prefix to bits per second, checked in order.
/// Units without a known prefix are taken as plain bits per second.
pub const UNIT_PREFIXES: [(char, f64); 3] = [('G', 1e9), ('M', 1e6), ('K', 1e3)];

/// Bits per second in one megabit per second.
pub const BITS_PER_MEGABIT: f64 = 1e6;

/// Upload value used when the upload column is empty.
pub const ZERO_SPEED: &str = "0 b/s";

#[derive(Error, Debug, PartialEq)]
pub enum SpeedError {
    #[error("expected \"<number> <unit>\", found {0} token(s) in {1:?}")]
    Tokens(usize, String),
    #[error("invalid speed number {0:?}")]
    Number(String),
}

/// multiplier for the unit token, based on its first character
pub fn unit_multiplier(unit: &str) -> f64 {
    let first = unit.chars().next();
    UNIT_PREFIXES
        .iter()
        .find(|(prefix, _)| Some(*prefix) == first)
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or(1.)
}

/// Converts a speed string like "95.3 Mb/s" into megabits per second.
/// The string must split on a single space into exactly two tokens.
pub fn read_speed(s: &str) -> Result<f64, SpeedError> {
    let tokens: Vec<&str> = s.split(' ').collect();
    let (num, unit) = match tokens[..] {
        [num, unit] => (num, unit),
        _ => return Err(SpeedError::Tokens(tokens.len(), s.to_string())),
    };
    let num: f64 = match num.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => return Err(SpeedError::Number(num.to_string())),
    };
    Ok(num * unit_multiplier(unit) / BITS_PER_MEGABIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn normalizes_all_prefixes() {
        assert!(close(read_speed("1 Gb/s").unwrap(), 1000.));
        assert!(close(read_speed("500 Kb/s").unwrap(), 0.5));
        assert!(close(read_speed("10 Mb/s").unwrap(), 10.));
        assert!(close(read_speed("100 b/s").unwrap(), 0.0001));
        assert!(close(read_speed("95.3 Mbps").unwrap(), 95.3));
    }

    #[test]
    fn unknown_prefix_is_bits() {
        assert_eq!(unit_multiplier("bps"), 1.);
        assert_eq!(unit_multiplier("kb/s"), 1.);
        assert_eq!(unit_multiplier(""), 1.);
        assert!(close(read_speed(ZERO_SPEED).unwrap(), 0.));
    }

    #[test]
    fn rejects_bad_token_count() {
        assert_eq!(
            read_speed("10Mb/s"),
            Err(SpeedError::Tokens(1, "10Mb/s".to_string()))
        );
        assert!(matches!(read_speed("10  Mb/s"), Err(SpeedError::Tokens(3, _))));
        assert!(matches!(read_speed(""), Err(SpeedError::Tokens(1, _))));
    }

    #[test]
    fn rejects_bad_number() {
        assert_eq!(
            read_speed("fast Mb/s"),
            Err(SpeedError::Number("fast".to_string()))
        );
        assert!(read_speed("inf Mb/s").is_err());
    }
}
