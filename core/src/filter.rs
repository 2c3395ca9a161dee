//! CSS `filter` serialization of a `ColorRecord`.

use crate::record::{ColorRecord, ID_FIELD, LOSS_FIELD};

/// Token emitted first when `filter_prefix` is set.
pub const FILTER_PREFIX: &str = "filter:";

/// Forces the element to black before the coefficients recolor it.
pub const PRE_BLACKEN: &str = "brightness(0) saturate(1)";

/// The filter functions the color table stores.
pub const FILTER_FUNCTIONS: [&str; 6] = [
    "invert",
    "sepia",
    "saturate",
    "hue-rotate",
    "brightness",
    "contrast",
];

/// Formatting switches for `format_filter`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Start the output with `filter:`.
    pub filter_prefix: bool,
    /// Insert `brightness(0) saturate(1)` ahead of the coefficients.
    pub pre_blacken: bool,
}

impl FilterOptions {
    pub fn with_filter_prefix(mut self, on: bool) -> Self {
        self.filter_prefix = on;
        self
    }

    pub fn with_pre_blacken(mut self, on: bool) -> Self {
        self.pre_blacken = on;
        self
    }
}

/// CSS unit for a filter function argument.
pub fn unit_for(name: &str) -> &'static str {
    match name {
        "hue-rotate" => "deg",
        _ => "%",
    }
}

/// Render `record` as a space-separated CSS filter value.
///
/// `id` and `loss` are never emitted, nor is any coefficient equal to zero.
pub fn format_filter(record: &ColorRecord, options: FilterOptions) -> String {
    let mut tokens: Vec<String> = Vec::with_capacity(record.len() + 2);
    if options.filter_prefix {
        tokens.push(FILTER_PREFIX.to_string());
    }
    if options.pre_blacken {
        tokens.push(PRE_BLACKEN.to_string());
    }

    for (name, value) in record.iter() {
        if name == ID_FIELD || name == LOSS_FIELD || value.is_zero() {
            continue;
        }
        tokens.push(format!("{name}({value}{})", unit_for(name)));
    }

    tokens.join(" ")
}
