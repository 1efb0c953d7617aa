use num_format::{CustomFormat, Grouping, ToFormattedString};

/// Large counters are printed with `_` as thousands separator, e.g. `1_250_000`
pub fn number_format() -> CustomFormat {
    CustomFormat::builder()
        .grouping(Grouping::Standard)
        .minus_sign("-")
        .separator("_")
        .build()
        .unwrap_or_default()
}

pub fn count(value: usize) -> String { value.to_formatted_string(&number_format()) }
