//! Host-supplied dataset records.
//!
//! The dataset is immutable for the lifetime of a simulation. It is decoded
//! from a JS object via `serde-wasm-bindgen`, so field names follow the host's
//! camelCase convention.

use serde::{Deserialize, Serialize};

/// Default id given to the root node when the host doesn't name one.
pub const DEFAULT_ROOT_ID: &str = "root";

/// One stack (technology) entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackEntry {
    pub id: String,
    pub domain: String,
    /// Radius at the reference viewport size.
    pub base_radius: f32,
    #[serde(default)]
    pub icon_key: Option<String>,
    #[serde(default)]
    pub color_key: Option<String>,
}

/// Experience weight of a domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainWeight {
    pub domain: String,
    pub weight: f32,
}

impl DomainWeight {
    pub fn new(domain: impl Into<String>, weight: f32) -> Self {
        Self {
            domain: domain.into(),
            weight,
        }
    }
}

/// Complete input for one simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudDataset {
    #[serde(default)]
    pub root_id: Option<String>,
    /// Explicit domain weights, in sector order. Optional.
    #[serde(default)]
    pub domains: Vec<DomainWeight>,
    pub stacks: Vec<StackEntry>,
}

impl CloudDataset {
    /// The root id, falling back to [`DEFAULT_ROOT_ID`].
    pub fn root_id(&self) -> &str {
        self.root_id.as_deref().unwrap_or(DEFAULT_ROOT_ID)
    }

    /// Domain weights used for sector allocation.
    ///
    /// Explicit weights come first in their given order. A domain listed more
    /// than once keeps its first slot and the sum of its positive weights.
    /// When none are given, each domain weighs as many stacks as it holds, in
    /// first-appearance order. Domains referenced by stacks but absent from
    /// explicit weights are appended with weight 0.
    pub fn effective_domain_weights(&self) -> Vec<DomainWeight> {
        let mut weights: Vec<DomainWeight> = Vec::with_capacity(self.domains.len());
        for entry in &self.domains {
            let weight = if entry.weight.is_finite() && entry.weight > 0.0 {
                entry.weight
            } else {
                0.0
            };
            match weights.iter_mut().find(|w| w.domain == entry.domain) {
                Some(existing) => existing.weight += weight,
                None => weights.push(DomainWeight::new(entry.domain.clone(), weight)),
            }
        }
        let derive = weights.is_empty();

        for stack in &self.stacks {
            match weights.iter_mut().find(|w| w.domain == stack.domain) {
                Some(existing) => {
                    if derive {
                        existing.weight += 1.0;
                    }
                }
                None => {
                    let weight = if derive { 1.0 } else { 0.0 };
                    weights.push(DomainWeight::new(stack.domain.clone(), weight));
                }
            }
        }

        weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(id: &str, domain: &str) -> StackEntry {
        StackEntry {
            id: id.to_string(),
            domain: domain.to_string(),
            base_radius: 20.0,
            icon_key: None,
            color_key: None,
        }
    }

    #[test]
    fn test_root_id_default() {
        let dataset = CloudDataset::default();
        assert_eq!(dataset.root_id(), "root");

        let named = CloudDataset {
            root_id: Some("me".to_string()),
            ..Default::default()
        };
        assert_eq!(named.root_id(), "me");
    }

    #[test]
    fn test_weights_derived_from_counts() {
        let dataset = CloudDataset {
            stacks: vec![
                stack("rust", "backend"),
                stack("react", "frontend"),
                stack("go", "backend"),
            ],
            ..Default::default()
        };

        let weights = dataset.effective_domain_weights();
        assert_eq!(
            weights,
            vec![DomainWeight::new("backend", 2.0), DomainWeight::new("frontend", 1.0)]
        );
    }

    #[test]
    fn test_explicit_weights_keep_order_and_append_missing() {
        let dataset = CloudDataset {
            domains: vec![DomainWeight::new("frontend", 3.0), DomainWeight::new("backend", 1.0)],
            stacks: vec![stack("rust", "backend"), stack("k8s", "devops")],
            ..Default::default()
        };

        let weights = dataset.effective_domain_weights();
        assert_eq!(weights.len(), 3);
        assert_eq!(weights[0], DomainWeight::new("frontend", 3.0));
        assert_eq!(weights[1], DomainWeight::new("backend", 1.0));
        assert_eq!(weights[2], DomainWeight::new("devops", 0.0));
    }

    #[test]
    fn test_repeated_domain_weights_are_merged() {
        let dataset = CloudDataset {
            domains: vec![
                DomainWeight::new("backend", 40.0),
                DomainWeight::new("frontend", 25.0),
                DomainWeight::new("data", 20.0),
                DomainWeight::new("infra", 15.0),
                DomainWeight::new("backend", 10.0),
                DomainWeight::new("frontend", f32::NAN),
            ],
            stacks: vec![stack("rust", "backend")],
            ..Default::default()
        };

        let weights = dataset.effective_domain_weights();
        assert_eq!(
            weights,
            vec![
                DomainWeight::new("backend", 50.0),
                DomainWeight::new("frontend", 25.0),
                DomainWeight::new("data", 20.0),
                DomainWeight::new("infra", 15.0),
            ]
        );

        let sectors = crate::layout::allocate_sectors(&weights);
        assert_eq!(sectors.len(), 4);
        let backend = sectors.get("backend").unwrap();
        assert!((backend.span() - std::f32::consts::TAU * 50.0 / 110.0).abs() < 1e-4);
    }
}
