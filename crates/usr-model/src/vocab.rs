//! Closed vocabularies for enum-typed USR fields
//!
//! Every table is an ordered list that starts (or ends) with the `"-"`
//! sentinel meaning "unset". Free-text fields (concept, scope) have no table.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Sentinel meaning "no value" in every table and in the text format
pub const UNSET: &str = "-";

const SEMANTIC_CATEGORIES: &[&str] = &[
    "-",
    "anim",
    "calendricunit",
    "clocktime",
    "dom",
    "dow",
    "era",
    "female",
    "male",
    "meas",
    "moy",
    "ne",
    "numex",
    "org",
    "per/female",
    "per/male",
    "per",
    "place",
    "season",
    "timex",
    "yoc",
];

const MORPHO_SEMANTICS: &[&str] = &[
    "-",
    "causative",
    "comperless",
    "compermore",
    "doublecausative",
    "dvitva",
    "kqw",
    "mawup",
    "pl",
    "superl",
    "mawup/pl",
    "xviwva",
    "xviwva/pl",
];

const SPEAKERS_VIEWS: &[&str] = &[
    "-",
    "hI_1",
    "hI_2",
    "hI_3",
    "hI_4",
    "hI_5",
    "hI_6",
    "BI_1",
    "BI_2",
    "BI_3",
    "BI_4",
    "BI_5",
    "wo_1",
    "wo_2",
    "wo_3",
    "wo_4",
    "waka_1",
    "waka_2",
    "mAwra_1",
    "mAwra_2",
    "mAwra_3",
    "kevala_1",
    "sI_1",
    "kariba_1",
    "[shade:jA_1]",
    "[shade:jA_2]",
    "[shade:dAla_1]",
    "[shade:dAla_2]",
    "[shade:pA_1]",
    "[shade:xe_1]",
    "[shade:le_1]",
    "[shade:uTa_1]",
    "[shade:bETa_1]",
    "[shade:Cala_1]",
    "[shade:laga_1]",
    "[shade:mara_1]",
    "[shade:A_1]",
    "[shade:bana_1]",
    "def",
    "proximal",
    "distal",
    "respect",
    "informal",
    "ki_1",
    "sIrPa_1",
    "sA_1",
    "sA_2",
    "sA_3",
    "sA_4",
    "lagaBaga_1",
    "nA_1",
    "nA_2",
    "nA_3",
    "nA_4",
    "basa_1",
    "basa_2",
    "basa_3",
    "karIba_1",
    "karIba_2",
    "TIka_1",
    "TIka_2",
    "TIka_3",
    "TIka_4",
];

const DEPENDENCY_RELATIONS: &[&str] = &[
    "-",
    "card",
    "dem",
    "dur",
    "extent",
    "freq",
    "intf",
    "jk1",
    "k1",
    "k1as",
    "k1s",
    "k2",
    "k2g",
    "k2p",
    "k2s",
    "k2as",
    "k3",
    "k3as",
    "k4",
    "k4a",
    "k4as",
    "k5",
    "k5as",
    "k5prk",
    "k7",
    "k7a",
    "k7as",
    "k7p",
    "k7t",
    "krvn",
    "krvnneg",
    "main",
    "mk1",
    "mod",
    "neg",
    "ord",
    "pk1",
    "quant",
    "quantless",
    "quantmore",
    "rad",
    "rask1",
    "rask2",
    "rask3",
    "rask4",
    "rask5",
    "rask7",
    "rasnegk1",
    "rasnegk2",
    "rbks",
    "rblak",
    "rblpk",
    "rblsk",
    "rcdelim",
    "rcelab",
    "rcloc",
    "rcprop",
    "rcsamAnakAla",
    "rd",
    "rdl",
    "re",
    "rh",
    "rhh",
    "rk",
    "rkl",
    "rmeas",
    "rn",
    "rp",
    "rprop",
    "r6",
    "rpk",
    "rs",
    "rsma",
    "rsm",
    "rsk",
    "rt",
    "ru",
    "rv",
    "rvks",
    "rviroXIk1",
    "rviroXIk2",
    "vIpsA",
    "vkvn",
];

const DISCOURSE_RELATIONS: &[&str] = &[
    "-",
    "coref",
    "AvaSyakawApariNAma",
    "AvaSyakawApariNAma.nahIM",
    "anyawra",
    "arWAwa",
    "kAryakAraNa",
    "kAryaxyowaka",
    "kqw",
    "meas",
    "samuccaya",
    "samuccaya.BI",
    "samuccaya.alAvA",
    "samuccaya.awirikwa",
    "samuccaya.samAveSI",
    "span_1",
    "span_2",
    "uXAharaNasvarUpa",
    "viroXi",
    "viroXaxyotaka",
    "vyABicAra",
    "vyaBicAra",
];

const COMPONENT_TYPES: &[&str] = &[
    "component1",
    "component2",
    "component3",
    "component4",
    "component5",
    "component6",
    "count",
    "end",
    "head",
    "kriyAmUla",
    "mod",
    "op1",
    "op2",
    "op3",
    "op4",
    "op5",
    "op6",
    "op7",
    "op8",
    "op9",
    "op10",
    "part",
    "start",
    "unit",
    "unit_value",
    "unit_every",
    "verbalizer",
    "whole",
    "begin",
    "avayavI",
    "avayava",
    "inside",
    "-",
];

const CONSTRUCTION_PATTERNS: &[&str] = &[
    "-",
    "[2-bahubrIhi]",
    "[2-waw]",
    "[3-bahubrIhi]",
    "[3-waw]",
    "[4-bahubrIhi]",
    "[4-waw]",
    "[5-bahubrIhi]",
    "[5-waw]",
    "[6-bahubrIhi]",
    "[6-waw]",
    "[7-bahubrIhi]",
    "[7-waw]",
    "[avyayIBAva]",
    "[cp_1]",
    "[cp_2]",
    "[cp_3]",
    "[compound_1]",
    "[compound_2]",
    "[compound_3]",
    "[conj_1]",
    "[conj_2]",
    "[conj_3]",
    "[disjunct_1]",
    "[disjunct_2]",
    "[disjunct_3]",
    "[karmaXAraya]",
    "[maXyamapaxalopI]",
    "[meas_1]",
    "[meas_2]",
    "[op1]",
    "[op2]",
    "[span_1]",
    "[span_2]",
    "[xvanxva]",
    "[xvigu]",
    "[upapaxa]",
];

/// The closed vocabularies of the USR format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vocabulary {
    /// Lexical `semantic_category`
    SemanticCategory,
    /// Lexical `morpho_semantic`
    MorphoSemantic,
    /// Lexical `speakers_view`
    SpeakersView,
    /// Dependency `relation`
    DependencyRelation,
    /// Discourse/coreference `relation`
    DiscourseRelation,
    /// Construction `component_type`
    ComponentType,
    /// Bracketed construction-pattern concepts
    ConstructionPattern,
}

impl Vocabulary {
    /// All vocabularies in display order
    pub const ALL: [Vocabulary; 7] = [
        Vocabulary::SemanticCategory,
        Vocabulary::MorphoSemantic,
        Vocabulary::SpeakersView,
        Vocabulary::DependencyRelation,
        Vocabulary::DiscourseRelation,
        Vocabulary::ComponentType,
        Vocabulary::ConstructionPattern,
    ];

    /// Ordered values of this table, sentinel included
    #[inline]
    #[must_use]
    pub fn values(self) -> &'static [&'static str] {
        match self {
            Self::SemanticCategory => SEMANTIC_CATEGORIES,
            Self::MorphoSemantic => MORPHO_SEMANTICS,
            Self::SpeakersView => SPEAKERS_VIEWS,
            Self::DependencyRelation => DEPENDENCY_RELATIONS,
            Self::DiscourseRelation => DISCOURSE_RELATIONS,
            Self::ComponentType => COMPONENT_TYPES,
            Self::ConstructionPattern => CONSTRUCTION_PATTERNS,
        }
    }

    /// Check membership
    #[inline]
    #[must_use]
    pub fn contains(self, value: &str) -> bool {
        self.values().contains(&value)
    }

    /// Validate an optional value; `None` (unset) is always accepted
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidEnumValue`] if the value is not in the table
    pub fn check(self, value: Option<&str>) -> Result<(), ModelError> {
        match value {
            Some(v) if !self.contains(v) => Err(ModelError::invalid_enum(self, v)),
            _ => Ok(()),
        }
    }

    /// Stable snake_case name used in diagnostics and on the CLI
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::SemanticCategory => "semantic_category",
            Self::MorphoSemantic => "morpho_semantic",
            Self::SpeakersView => "speakers_view",
            Self::DependencyRelation => "dependency_relation",
            Self::DiscourseRelation => "discourse_relation",
            Self::ComponentType => "component_type",
            Self::ConstructionPattern => "construction_pattern",
        }
    }
}

impl Display for Vocabulary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Vocabulary {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| ModelError::UnknownVocabulary(s.to_string()))
    }
}

/// Is `value` one of the defined construction patterns?
#[inline]
#[must_use]
pub fn is_defined_construction_pattern(value: &str) -> bool {
    value != UNSET && Vocabulary::ConstructionPattern.contains(value)
}

/// Map the sentinel and the empty string to `None`
#[inline]
#[must_use]
pub fn normalize_unset(value: &str) -> Option<String> {
    match value.trim() {
        "" | UNSET => None,
        v => Some(v.to_string()),
    }
}
