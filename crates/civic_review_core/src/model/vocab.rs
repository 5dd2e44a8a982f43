//! Closed vocabularies for single- and multi-select survey fields.
//!
//! # Responsibility
//! - Define every permitted tag with its persisted short code and label.
//! - Provide `TagSet`, the multi-select container used by survey records.
//!
//! # Invariants
//! - Codes are unique within a vocabulary.
//! - A `TagSet` only ever holds members of its vocabulary; unknown codes are
//!   rejected when parsing, deserializing or reading from storage.
//! - Delimited form lists codes in vocabulary declaration order.

use super::validation::{ValidationError, ValidationResult};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

const TAG_DELIMITER: &str = ",";

/// A fixed, closed set of symbolic values.
///
/// `Ord` follows declaration order, so ordered containers list tags the way
/// the vocabulary declares them.
pub trait Vocabulary: Copy + Ord + 'static {
    /// Name used in diagnostics.
    const NAME: &'static str;
    /// Every member, in declaration order.
    const ALL: &'static [Self];

    /// Short code used for storage and on the wire.
    fn code(self) -> &'static str;

    /// Human-readable label.
    fn label(self) -> &'static str;

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|tag| tag.code() == code)
    }
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident as $display:literal {
            $( $(#[$vmeta:meta])* $variant:ident => ($code:literal, $label:literal), )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl Vocabulary for $name {
            const NAME: &'static str = $display;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn code(self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.code())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let code = String::deserialize(deserializer)?;
                Self::from_code(&code).ok_or_else(|| {
                    de::Error::custom(format!("unknown {} code `{code}`", $display))
                })
            }
        }
    };
}

vocabulary! {
    /// Gender identity tags (multi-select).
    Gender as "gender" {
        Genderfluid => ("GF", "Genderfluid / Genderqueer"),
        NonBinary => ("NB", "Non-binary"),
        TwoSpirit => ("2S", "2-Spirit"),
        Woman => ("F", "Woman"),
        Man => ("M", "Man"),
        Trans => ("T", "Trans"),
    }
}

vocabulary! {
    /// Yearly household income brackets, lowest first (single select).
    IncomeBracket as "income" {
        LessThan25k => ("LT_25", "Less than $25,000 USD"),
        From25kTo50k => ("GT_25", "$25,000 - $50,000 USD"),
        From50kTo100k => ("GT_50", "$50,000 - $100,000 USD"),
        From100kTo200k => ("GT_100", "$100,000 - $200,000 USD"),
        From200kTo500k => ("GT_200", "$200,000 - $500,000 USD"),
        MoreThan500k => ("GT_500", "More than $500,000 USD"),
    }
}

vocabulary! {
    /// Race/ethnicity tags (multi-select).
    Ethnicity as "ethnicity" {
        AsianPacificIslander => ("AAPI", "Asian or Pacific Islander"),
        Black => ("B", "Black"),
        Latinx => ("L", "Hispanic or Latinx"),
        Indigenous => ("I", "Indigenous, Aboriginal, Native, Inuit, or Métis"),
        Multiracial => ("M", "Multiracial or Biracial"),
        White => ("W", "White"),
        Other => ("OTH", "A race/ethnicity not listed here"),
    }
}

vocabulary! {
    /// Disability tags (multi-select).
    Disability as "disability" {
        MobilityAid => ("W", "I use a wheelchair or other mobility aid"),
        Intellectual => ("I", "I have an intellectual disability"),
        Autism => ("A", "I am on the autism spectrum"),
        MentalIllness => ("M", "I have a mental illness"),
        VisionImpaired => ("V", "I am vision-impaired or blind"),
        HearingImpaired => ("D", "I am hard of hearing or deaf"),
        /// Shared "A" with `Autism` in the legacy form; stored as "AB".
        AbleBodied => ("AB", "Able-bodied (no disability)"),
        Other => ("OTH", "Other disability not listed here"),
    }
}

/// Zero or more tags drawn from one vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent, bound(deserialize = "T: Vocabulary + Deserialize<'de>"))]
pub struct TagSet<T: Vocabulary> {
    tags: BTreeSet<T>,
}

impl<T: Vocabulary> Default for TagSet<T> {
    fn default() -> Self {
        Self {
            tags: BTreeSet::new(),
        }
    }
}

impl<T: Vocabulary> TagSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from raw codes, rejecting anything outside the vocabulary.
    pub fn from_codes<I, S>(field: &'static str, codes: I) -> ValidationResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags = BTreeSet::new();
        for code in codes {
            let code = code.as_ref();
            let tag = T::from_code(code).ok_or_else(|| ValidationError::UnknownTag {
                field,
                value: code.to_string(),
            })?;
            tags.insert(tag);
        }
        Ok(Self { tags })
    }

    /// Parses the comma-delimited storage form. The empty string is the
    /// empty set; codes must match exactly.
    pub fn parse_delimited(field: &'static str, text: &str) -> ValidationResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::from_codes(field, text.split(TAG_DELIMITER))
    }

    /// Renders the comma-delimited storage form.
    pub fn to_delimited(&self) -> String {
        self.tags
            .iter()
            .map(|tag| tag.code())
            .collect::<Vec<_>>()
            .join(TAG_DELIMITER)
    }

    /// Returns `true` when the tag was not already present.
    pub fn insert(&mut self, tag: T) -> bool {
        self.tags.insert(tag)
    }

    pub fn contains(&self, tag: T) -> bool {
        self.tags.contains(&tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.tags.iter().copied()
    }
}

impl<T: Vocabulary> FromIterator<T> for TagSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Disability, Gender, IncomeBracket, TagSet, Vocabulary};
    use crate::model::validation::ValidationError;
    use std::collections::HashSet;

    fn assert_unique_codes<T: Vocabulary>() {
        let codes: HashSet<_> = T::ALL.iter().map(|tag| tag.code()).collect();
        assert_eq!(codes.len(), T::ALL.len(), "duplicate code in {}", T::NAME);
    }

    #[test]
    fn vocabulary_codes_are_unique() {
        assert_unique_codes::<Gender>();
        assert_unique_codes::<IncomeBracket>();
        assert_unique_codes::<super::Ethnicity>();
        assert_unique_codes::<Disability>();
    }

    #[test]
    fn from_code_round_trips_every_member() {
        for tag in Disability::ALL {
            assert_eq!(Disability::from_code(tag.code()), Some(*tag));
        }
        assert_eq!(Gender::from_code("2S"), Some(Gender::TwoSpirit));
        assert_eq!(Gender::from_code("XX"), None);
    }

    #[test]
    fn income_brackets_are_ordered_low_to_high() {
        assert!(IncomeBracket::LessThan25k < IncomeBracket::From25kTo50k);
        assert!(IncomeBracket::From200kTo500k < IncomeBracket::MoreThan500k);
    }

    #[test]
    fn delimited_form_uses_declaration_order_and_collapses_duplicates() {
        let tags = TagSet::<Gender>::from_codes("gender", ["F", "NB", "F"]).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.to_delimited(), "NB,F");

        let parsed = TagSet::<Gender>::parse_delimited("gender", "NB,F").unwrap();
        assert_eq!(parsed, tags);
    }

    #[test]
    fn empty_delimited_text_is_empty_set() {
        let tags = TagSet::<Gender>::parse_delimited("gender", "").unwrap();
        assert!(tags.is_empty());
        assert_eq!(tags.to_delimited(), "");
    }

    #[test]
    fn padded_code_is_not_trimmed() {
        let err = TagSet::<Gender>::from_codes("gender", [" F "]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownTag {
                field: "gender",
                value: " F ".to_string(),
            }
        );
        assert!(TagSet::<Gender>::parse_delimited("gender", "NB, F").is_err());
    }

    #[test]
    fn disability_autism_and_able_bodied_codes_are_distinct() {
        assert_eq!(Disability::from_code("A"), Some(Disability::Autism));
        assert_eq!(Disability::from_code("AB"), Some(Disability::AbleBodied));
        assert_eq!(Disability::Autism.code(), "A");
        assert_eq!(Disability::AbleBodied.code(), "AB");
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = TagSet::<Gender>::from_codes("gender", ["F", "XX"]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownTag {
                field: "gender",
                value: "XX".to_string(),
            }
        );
    }
}
