//! Analysis Registry

use crate::{AnalysisContext, AnalysisMeta, AnalysisPlugin};
use tally_core::{Dataset, TallyError, TestResult};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Central analysis registry
pub struct AnalysisRegistry {
    analyses: HashMap<String, Arc<dyn AnalysisPlugin>>,
}

impl AnalysisRegistry {
    pub fn new() -> Self {
        Self {
            analyses: HashMap::new(),
        }
    }

    pub fn with_analysis<A: AnalysisPlugin + 'static>(mut self, a: A) -> Self {
        let name = a.meta().name.to_lowercase();
        self.analyses.insert(name, Arc::new(a));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn AnalysisPlugin> {
        self.analyses.get(&name.to_lowercase()).map(|a| a.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.analyses.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.analyses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }

    pub fn run(
        &self,
        name: &str,
        datasets: &[Dataset],
        ctx: &AnalysisContext,
    ) -> Result<TestResult, TallyError> {
        match self.get(name) {
            Some(a) => a.run(datasets, ctx).map_err(|e| e.in_analysis(name)),
            None => {
                // Find similar names for a better error message
                let similar = self.find_similar(name);
                let mut err = TallyError::unknown_analysis(name).in_analysis(name);
                if !similar.is_empty() {
                    let suggestions: Vec<&str> = similar.iter().take(3).map(|s| s.as_str()).collect();
                    err = err.with_suggestion(format!("Did you mean: {}?", suggestions.join(", ")));
                } else {
                    err = err.with_suggestion(format!("Available: {}", self.names().join(", ")));
                }
                Err(err)
            }
        }
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.analyses.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn help(&self, name: &str) -> Option<AnalysisMeta> {
        self.get(name).map(|a| a.meta())
    }

    /// Metadata of every analysis, optionally filtered by category
    pub fn list(&self, category: Option<&str>) -> Vec<AnalysisMeta> {
        let sorted: BTreeMap<&String, &Arc<dyn AnalysisPlugin>> = self.analyses.iter().collect();
        sorted
            .values()
            .map(|a| a.meta())
            .filter(|m| category.map_or(true, |c| m.category == c))
            .collect()
    }

    /// Find analysis names similar to the given name (for error suggestions)
    fn find_similar(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self
            .analyses
            .keys()
            .filter_map(|candidate| {
                let score = Self::similarity_score(&name_lower, candidate);
                if score >= 10 {
                    Some((candidate.clone(), score))
                } else {
                    None
                }
            })
            .collect();

        // Higher score first, then alphabetical for stable output
        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        // Shared dash-separated words ("anova", "std", "dev")
        let query_words: HashSet<&str> = query.split(['-', '_', ' ']).collect();
        let candidate_words: HashSet<&str> = candidate.split('-').collect();
        score += query_words.intersection(&candidate_words).count() * 10;

        score
    }
}

impl Default for AnalysisRegistry {
    fn default() -> Self {
        Self::new()
    }
}
