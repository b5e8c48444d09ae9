use std::fmt;

/// Fractional digits used when the caller does not ask for a precision
pub const DEFAULT_PRECISION: usize = 1;

/// A number as it appears in the report
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// Pretty printing is off; the value is shown as is
    Raw(f64),
    /// Magnitude-scaled text such as `23.1M`
    Scaled(String),
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendered::Raw(value) => write!(f, "{}", value),
            Rendered::Scaled(text) => f.write_str(text),
        }
    }
}

/// Turns raw numbers into report text.
///
/// With `pretty` disabled every method passes the number through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formatter {
    pretty: bool,
}

impl Formatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Scales by powers of 1000: `23104123` becomes `23.1M`
    pub fn count(&self, value: f64, precision: Option<usize>) -> Rendered {
        if !self.pretty {
            return Rendered::Raw(value);
        }
        let precision = precision.unwrap_or(DEFAULT_PRECISION);
        Rendered::Scaled(scale(value, 1000.0, precision, precision))
    }

    /// Scales by powers of 1024; values below 1024 get no fractional digits
    pub fn bytes(&self, value: f64, precision: Option<usize>) -> Rendered {
        if !self.pretty {
            return Rendered::Raw(value);
        }
        let precision = precision.unwrap_or(DEFAULT_PRECISION);
        Rendered::Scaled(scale(value, 1024.0, 0, precision))
    }

    /// Shows a ratio as a percentage: `0.25` becomes `25.0%`
    pub fn percent(&self, value: f64, precision: Option<usize>) -> Rendered {
        if !self.pretty {
            return Rendered::Raw(value);
        }
        let precision = precision.unwrap_or(DEFAULT_PRECISION);
        Rendered::Scaled(format!("{:.*}%", precision, 100.0 * value))
    }
}

fn scale(value: f64, base: f64, unit_precision: usize, precision: usize) -> String {
    if value < base {
        format!("{:.*}", unit_precision, value)
    } else if value < base * base {
        format!("{:.*}K", precision, value / base)
    } else if value < base * base * base {
        format!("{:.*}M", precision, value / base / base)
    } else {
        format!("{:.*}B", precision, value / base / base / base)
    }
}
