//! Common types used across the Strider planner.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An atomic ground proposition, interned by its [`Problem`](crate::Problem).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fluent(pub u32);

impl Fluent {
    /// Index of this fluent in the problem's name table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Fluent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Handle of a ground action owned by a [`Problem`](crate::Problem).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub usize);

impl ActionId {
    /// Index of this action in the problem's action list.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Planning-language requirement declared by a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Requirement {
    Strips,
    Typing,
    NegativePreconditions,
    DisjunctivePreconditions,
    Equality,
    ExistentialPreconditions,
    UniversalPreconditions,
    QuantifiedPreconditions,
    ConditionalEffects,
    Adl,
    ActionCosts,
    Constraints,
    ContinuousEffects,
    DerivedPredicates,
    DurativeActions,
    DurationInequalities,
    Fluents,
    GoalUtilities,
    MethodConstraints,
    NumericFluents,
    ObjectFluents,
    Preferences,
    TimedInitialLiterals,
    Hierarchy,
}

impl Requirement {
    /// Returns true if the random-walk search can handle this requirement.
    ///
    /// Everything that compiles down to ground conjunctive conditions and
    /// conditional add/delete effects is supported.
    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            Requirement::Strips
                | Requirement::Typing
                | Requirement::NegativePreconditions
                | Requirement::DisjunctivePreconditions
                | Requirement::Equality
                | Requirement::ExistentialPreconditions
                | Requirement::UniversalPreconditions
                | Requirement::QuantifiedPreconditions
                | Requirement::ConditionalEffects
                | Requirement::Adl
                | Requirement::ActionCosts
        )
    }

    /// The requirement key as written in a planning description.
    pub fn key(&self) -> &'static str {
        match self {
            Requirement::Strips => ":strips",
            Requirement::Typing => ":typing",
            Requirement::NegativePreconditions => ":negative-preconditions",
            Requirement::DisjunctivePreconditions => ":disjunctive-preconditions",
            Requirement::Equality => ":equality",
            Requirement::ExistentialPreconditions => ":existential-preconditions",
            Requirement::UniversalPreconditions => ":universal-preconditions",
            Requirement::QuantifiedPreconditions => ":quantified-preconditions",
            Requirement::ConditionalEffects => ":conditional-effects",
            Requirement::Adl => ":adl",
            Requirement::ActionCosts => ":action-costs",
            Requirement::Constraints => ":constraints",
            Requirement::ContinuousEffects => ":continuous-effects",
            Requirement::DerivedPredicates => ":derived-predicates",
            Requirement::DurativeActions => ":durative-actions",
            Requirement::DurationInequalities => ":duration-inequalities",
            Requirement::Fluents => ":fluents",
            Requirement::GoalUtilities => ":goal-utilities",
            Requirement::MethodConstraints => ":method-constraints",
            Requirement::NumericFluents => ":numeric-fluents",
            Requirement::ObjectFluents => ":object-fluents",
            Requirement::Preferences => ":preferences",
            Requirement::TimedInitialLiterals => ":timed-initial-literals",
            Requirement::Hierarchy => ":hierarchy",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
