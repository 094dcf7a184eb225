//! Host-facing JSON problem document (§6 "CLI / wire formats" ambient
//! addition): maps string term names to the dense [`TermId`]s the core
//! engine operates on, and back again for reporting a model.
//!
//! This is the boundary layer the design notes call for ("Polymorphism
//! over value kinds" — keep the core an integer engine, keep a thin mapping
//! layer at the edge). The core crate itself never looks at term names.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CcuError, Result};
use crate::problem::{FunEquation, Goal};
use crate::types::TermId;

/// Wire-format function-equation: `{"f": "f", "args": ["a"], "result": "c"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunEquationDocument {
    pub f: String,
    pub args: Vec<String>,
    pub result: String,
}

/// Wire-format sub-problem: function equations and a goal expressed as a
/// list of sub-goals, each a list of `[left, right]` name pairs. Domains
/// live at the top level of [`ProblemDocument`] since the internal
/// [`crate::problem::Problem`] model shares one `domains` table across every
/// sub-problem (§3: a `Problem` is "sub-problems sharing `terms` and
/// `bits`" — and, in this implementation, the domain table too).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubProblemDocument {
    #[serde(default)]
    pub fun_eqs: Vec<FunEquationDocument>,
    pub goal: Vec<Vec<(String, String)>>,
}

/// Top-level wire-format problem document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDocument {
    pub terms: Vec<String>,
    pub domains: HashMap<String, Vec<String>>,
    pub sub_problems: Vec<SubProblemDocument>,
}

/// A document resolved against its term-name index, ready to install via
/// [`crate::problem::Problem::create`], plus the reverse mapping needed to
/// report a decoded model back in terms of the original names.
pub struct LoadedProblem {
    pub num_terms: usize,
    pub domains: Vec<Vec<TermId>>,
    pub sub_problems: Vec<(Vec<FunEquation>, Goal)>,
    pub term_names: Vec<String>,
}

impl ProblemDocument {
    /// Parse and resolve term names to dense ids in first-appearance order
    /// over `terms`. Unknown names anywhere else raise `InvariantViolation`
    /// (the document itself is malformed, distinct from the §7 `Problem`
    /// validation errors which apply to the already-resolved integer form).
    pub fn load(&self) -> Result<LoadedProblem> {
        let index: HashMap<&str, TermId> = self
            .terms
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        let resolve = |name: &str| -> Result<TermId> {
            index
                .get(name)
                .copied()
                .ok_or_else(|| CcuError::InvariantViolation(format!("unknown term name '{name}'")))
        };

        let mut domains = vec![Vec::new(); self.terms.len()];
        for (name, dom) in &self.domains {
            let t = resolve(name)?;
            let mut resolved = Vec::with_capacity(dom.len());
            for d in dom {
                resolved.push(resolve(d)?);
            }
            domains[t] = resolved;
        }

        let mut sub_problems = Vec::with_capacity(self.sub_problems.len());
        for sp in &self.sub_problems {
            let mut fun_eqs = Vec::with_capacity(sp.fun_eqs.len());
            for eq in &sp.fun_eqs {
                let mut args = Vec::with_capacity(eq.args.len());
                for a in &eq.args {
                    args.push(resolve(a)?);
                }
                fun_eqs.push(FunEquation {
                    symbol: eq.f.clone(),
                    args,
                    result: resolve(&eq.result)?,
                });
            }
            let mut sub_goals = Vec::with_capacity(sp.goal.len());
            for sub_goal in &sp.goal {
                let mut pairs = Vec::with_capacity(sub_goal.len());
                for (s, t) in sub_goal {
                    pairs.push((resolve(s)?, resolve(t)?));
                }
                sub_goals.push(pairs);
            }
            sub_problems.push((fun_eqs, Goal::new(sub_goals)));
        }

        Ok(LoadedProblem {
            num_terms: self.terms.len(),
            domains,
            sub_problems,
            term_names: self.terms.clone(),
        })
    }
}

impl LoadedProblem {
    /// Render a decoded integer model back to term names.
    pub fn decode_model(&self, model: &[TermId]) -> HashMap<String, String> {
        model
            .iter()
            .enumerate()
            .map(|(t, &v)| (self.term_names[t].clone(), self.term_names[v].clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_s1_style_document() {
        let json = r#"{
            "terms": ["a", "b", "c"],
            "domains": {"a": ["a","b","c"], "b": ["a","b","c"], "c": ["a","b","c"]},
            "sub_problems": [
                {
                    "fun_eqs": [],
                    "goal": [[["a", "b"]]]
                }
            ]
        }"#;
        let doc: ProblemDocument = serde_json::from_str(json).unwrap();
        let loaded = doc.load().unwrap();
        assert_eq!(loaded.num_terms, 3);
        assert_eq!(loaded.domains[0], vec![0, 1, 2]);
        assert_eq!(loaded.sub_problems[0].1.sub_goals, vec![vec![(0, 1)]]);
    }

    #[test]
    fn unknown_term_name_is_rejected() {
        let json = r#"{
            "terms": ["a", "b"],
            "domains": {"a": ["a"], "b": ["b"]},
            "sub_problems": [
                {"fun_eqs": [], "goal": [[["a", "z"]]]}
            ]
        }"#;
        let doc: ProblemDocument = serde_json::from_str(json).unwrap();
        assert!(doc.load().is_err());
    }

    #[test]
    fn decode_model_maps_ids_back_to_names() {
        let loaded = LoadedProblem {
            num_terms: 2,
            domains: vec![vec![0, 1], vec![0, 1]],
            sub_problems: vec![],
            term_names: vec!["a".to_string(), "b".to_string()],
        };
        let decoded = loaded.decode_model(&[1, 1]);
        assert_eq!(decoded.get("a").map(String::as_str), Some("b"));
        assert_eq!(decoded.get("b").map(String::as_str), Some("b"));
    }
}
