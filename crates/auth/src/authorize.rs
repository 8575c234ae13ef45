use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AccessCode, AccessCodes};

/// A permission expression bound to a guarded element or route.
///
/// - `Unrestricted`: no check is performed (absent / empty binding).
/// - `Code`: the single code must be held.
/// - `AnyOf`: at least one of the codes must be held (logical OR).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<RequirementRepr>", into = "Option<RequirementRepr>")]
pub enum Requirement {
    #[default]
    Unrestricted,
    Code(AccessCode),
    AnyOf(Vec<AccessCode>),
}

/// Wire shape of a binding value: a string or a list of strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RequirementRepr {
    One(String),
    Many(Vec<String>),
}

impl From<Option<RequirementRepr>> for Requirement {
    fn from(value: Option<RequirementRepr>) -> Self {
        match value {
            None => Requirement::Unrestricted,
            Some(RequirementRepr::One(code)) => Requirement::code(code),
            Some(RequirementRepr::Many(codes)) => Requirement::any_of(codes),
        }
    }
}

impl From<Requirement> for Option<RequirementRepr> {
    fn from(value: Requirement) -> Self {
        match value {
            Requirement::Unrestricted => None,
            Requirement::Code(c) => Some(RequirementRepr::One(c.as_str().to_string())),
            Requirement::AnyOf(cs) => Some(RequirementRepr::Many(
                cs.iter().map(|c| c.as_str().to_string()).collect(),
            )),
        }
    }
}

impl Requirement {
    /// Single-code requirement; an empty code means no restriction.
    pub fn code(code: impl Into<AccessCode>) -> Self {
        let code = code.into();
        if code.is_empty() {
            Requirement::Unrestricted
        } else {
            Requirement::Code(code)
        }
    }

    /// Any-of requirement; an empty list means no restriction.
    pub fn any_of<I, C>(codes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<AccessCode>,
    {
        let codes: Vec<AccessCode> = codes.into_iter().map(Into::into).collect();
        if codes.is_empty() {
            Requirement::Unrestricted
        } else {
            Requirement::AnyOf(codes)
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Requirement::Unrestricted)
    }
}

impl From<&'static str> for Requirement {
    fn from(value: &'static str) -> Self {
        Requirement::code(value)
    }
}

impl From<Vec<&'static str>> for Requirement {
    fn from(value: Vec<&'static str>) -> Self {
        Requirement::any_of(value)
    }
}

impl From<Option<&'static str>> for Requirement {
    fn from(value: Option<&'static str>) -> Self {
        value.map(Requirement::code).unwrap_or_default()
    }
}

/// Decide whether `held` satisfies `required`.
///
/// - No IO
/// - No panics
/// - Exact-match comparison only
pub fn satisfies(required: &Requirement, held: &AccessCodes) -> bool {
    match required {
        Requirement::Unrestricted => true,
        Requirement::Code(code) => held.contains(code),
        Requirement::AnyOf(codes) => codes.iter().any(|c| held.contains(c)),
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: requires {0}")]
    Forbidden(String),
}

/// `Result` form of [`satisfies`] for route guards.
pub fn authorize(required: &Requirement, held: &AccessCodes) -> Result<(), AuthzError> {
    if satisfies(required, held) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(describe(required)))
    }
}

fn describe(required: &Requirement) -> String {
    match required {
        Requirement::Unrestricted => "nothing".to_string(),
        Requirement::Code(c) => format!("'{c}'"),
        Requirement::AnyOf(cs) => {
            let list: Vec<&str> = cs.iter().map(|c| c.as_str()).collect();
            format!("any of {list:?}")
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (diagnostics)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an evaluation, for debug panels and logs.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub required: Requirement,
    pub granted: bool,
    pub reason: String,
    /// Required codes the user holds (empty when denied).
    pub matched: Vec<String>,
    /// Required codes the user lacks.
    pub missing: Vec<String>,
}

/// Explain why `required` is (or is not) satisfied by `held`.
pub fn explain(required: &Requirement, held: &AccessCodes) -> AuthorizationExplanation {
    let wanted: Vec<&AccessCode> = match required {
        Requirement::Unrestricted => Vec::new(),
        Requirement::Code(c) => vec![c],
        Requirement::AnyOf(cs) => cs.iter().collect(),
    };

    let (matched, missing): (Vec<&AccessCode>, Vec<&AccessCode>) =
        wanted.into_iter().partition(|c| held.contains(c));
    let matched: Vec<String> = matched.iter().map(|c| c.to_string()).collect();
    let missing: Vec<String> = missing.iter().map(|c| c.to_string()).collect();

    let granted = satisfies(required, held);
    let reason = if required.is_unrestricted() {
        "No restriction bound".to_string()
    } else if granted {
        format!("Holds {:?}", matched)
    } else {
        format!(
            "Missing {}. Current codes: {:?}",
            describe(required),
            held.sorted()
        )
    };

    AuthorizationExplanation {
        required: required.clone(),
        granted,
        reason,
        matched,
        missing,
    }
}
