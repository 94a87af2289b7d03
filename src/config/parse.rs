use std::time::Duration;

use crate::error::ValidationError;

/// Parses `<digits>[ms|s|m|h]`; a bare number is seconds.
pub(crate) fn parse_duration_value(value: &str) -> Result<Duration, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let digits_len = value
        .chars()
        .take_while(char::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let seconds_per_unit: u64 = match unit_part {
        "ms" => {
            return non_zero(Duration::from_millis(number));
        }
        "" | "s" => 1,
        "m" => 60,
        "h" => 3_600,
        unit => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };
    let secs = number
        .checked_mul(seconds_per_unit)
        .ok_or(ValidationError::DurationOverflow)?;
    non_zero(Duration::from_secs(secs))
}

fn non_zero(duration: Duration) -> Result<Duration, ValidationError> {
    if duration.is_zero() {
        return Err(ValidationError::DurationZero);
    }
    Ok(duration)
}
