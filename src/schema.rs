//! The fixed schema of the German credit dataset
//!
//! The input file carries 20 applicant attributes plus a binary `class`
//! label. Seven attributes are integer-valued and are treated as numeric
//! features, the remaining thirteen are categorical strings. The column
//! set is fixed; the loader rejects any header that deviates from it.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Kind of an input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Name of the label column.
pub const LABEL_COLUMN: &str = "class";

/// The integer-valued applicant attributes.
pub const NUMERIC_COLUMNS: [&str; 7] = [
    "duration",
    "credit_amount",
    "installment_commitment",
    "residence_since",
    "age",
    "existing_credits",
    "num_dependents",
];

/// The categorical applicant attributes.
pub const CATEGORICAL_COLUMNS: [&str; 13] = [
    "checking_status",
    "credit_history",
    "purpose",
    "savings_status",
    "employment",
    "personal_status",
    "other_parties",
    "property_magnitude",
    "other_payment_plans",
    "housing",
    "job",
    "own_telephone",
    "foreign_worker",
];

/// Total number of columns an input header must carry, label included.
pub const HEADER_WIDTH: usize = NUMERIC_COLUMNS.len() + CATEGORICAL_COLUMNS.len() + 1;

/// Binary credit-risk label.
///
/// `Good` is the positive class: recall reported for it measures the
/// fraction of truly good-credit applicants identified as good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Good,
    Bad,
}

impl Label {
    /// Both labels, in the fixed order used by confusion matrices and reports.
    pub const ALL: [Label; 2] = [Label::Good, Label::Bad];

    /// Position of the label in [`Label::ALL`].
    pub fn index(self) -> usize {
        match self {
            Label::Good => 0,
            Label::Bad => 1,
        }
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(Label::Good),
            "bad" => Ok(Label::Bad),
            other => Err(Error::UnknownLabel(other.to_string())),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Good => write!(f, "good"),
            Label::Bad => write!(f, "bad"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_width_counts_the_label() {
        assert_eq!(HEADER_WIDTH, 21);
    }

    #[test]
    fn labels_parse_and_roundtrip() {
        assert_eq!("good".parse::<Label>().unwrap(), Label::Good);
        assert_eq!("bad".parse::<Label>().unwrap(), Label::Bad);
        assert_eq!(Label::Good.to_string(), "good");
        assert_eq!(Label::Bad.to_string(), "bad");
    }

    #[test]
    fn foreign_label_is_rejected() {
        let err = "excellent".parse::<Label>().unwrap_err();
        assert!(matches!(err, Error::UnknownLabel(ref v) if v == "excellent"));
    }
}
