//! Gaussian Naive Bayes over the four fruit features.
//!
//! Every feature is modeled per class as an independent normal distribution
//! fitted to the training records of that class. Scores are kept as log
//! posteriors so that products of small densities do not underflow.

use std::collections::HashMap;
use std::fmt;

use crate::error::{FruitError, Result};
use crate::models::{FeatureVector, TrainingRecord};

pub const DEFAULT_VARIANCE_FLOOR: f64 = 1e-4;

/// Mean and unbiased variance of one feature within one class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianStats {
    pub mean: f64,
    pub variance: f64,
    pub count: usize,
}

impl GaussianStats {
    /// Fit to the samples; variance below `floor` (including n <= 1) is raised to `floor`
    pub fn fit(samples: &[f64], floor: f64) -> Self {
        let count = samples.len();
        if count == 0 {
            return Self {
                mean: 0.0,
                variance: floor,
                count,
            };
        }

        let mean = samples.iter().sum::<f64>() / count as f64;
        let variance = if count > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64
        } else {
            0.0
        };

        Self {
            mean,
            variance: variance.max(floor),
            count,
        }
    }

    /// Natural log of the normal density at `x`
    pub fn log_density(&self, x: f64) -> f64 {
        let d = x - self.mean;
        -(d * d) / (2.0 * self.variance) - 0.5 * (2.0 * std::f64::consts::PI * self.variance).ln()
    }
}

/// Per-feature parameters of one class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassModel {
    pub label: String,
    pub stats: [GaussianStats; FeatureVector::LEN],
}

impl ClassModel {
    pub fn fit(label: impl Into<String>, samples: &[FeatureVector], floor: f64) -> Self {
        let stats = std::array::from_fn(|i| {
            let column: Vec<f64> = samples.iter().map(|s| s.as_array()[i]).collect();
            GaussianStats::fit(&column, floor)
        });
        Self {
            label: label.into(),
            stats,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.stats[0].count
    }

    /// Sum of per-feature log densities
    pub fn log_likelihood(&self, query: &FeatureVector) -> f64 {
        self.stats
            .iter()
            .zip(query.as_array())
            .map(|(s, x)| s.log_density(x))
            .sum()
    }
}

/// Score of one candidate class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScore {
    pub label: String,
    /// Log posterior (up to the shared evidence term); `None` without training data
    pub log_posterior: Option<f64>,
    /// Posterior normalized over trained candidates
    pub probability: f64,
}

/// Posterior scores of every candidate, in candidate order
#[derive(Debug, Clone, PartialEq)]
pub struct Posteriors {
    scores: Vec<ClassScore>,
}

impl Posteriors {
    pub fn scores(&self) -> &[ClassScore] {
        &self.scores
    }

    pub fn get(&self, label: &str) -> Option<&ClassScore> {
        self.scores.iter().find(|s| s.label == label)
    }

    /// Highest log posterior; the earliest candidate wins ties
    pub fn best(&self) -> Option<&ClassScore> {
        let mut best: Option<(&ClassScore, f64)> = None;
        for score in &self.scores {
            let Some(lp) = score.log_posterior else {
                continue;
            };
            match best {
                Some((_, top)) if lp <= top => {}
                _ => best = Some((score, lp)),
            }
        }
        best.map(|(s, _)| s)
    }

    /// Candidates from most to least probable; untrained candidates last, ties in candidate order
    pub fn ranked(&self) -> Vec<&ClassScore> {
        let mut ranked: Vec<&ClassScore> = self.scores.iter().collect();
        ranked.sort_by(|a, b| {
            let a = a.log_posterior.unwrap_or(f64::NEG_INFINITY);
            let b = b.log_posterior.unwrap_or(f64::NEG_INFINITY);
            b.total_cmp(&a)
        });
        ranked
    }
}

impl fmt::Display for Posteriors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rank, score) in self.ranked().into_iter().enumerate() {
            match score.log_posterior {
                Some(lp) => writeln!(
                    f,
                    "{:>2}. {:<24} p={:.4} log={:.3}",
                    rank + 1,
                    score.label,
                    score.probability,
                    lp
                )?,
                None => writeln!(f, "{:>2}. {:<24} no training data", rank + 1, score.label)?,
            }
        }
        Ok(())
    }
}

/// Class models fitted to a training set
#[derive(Debug, Clone)]
pub struct NaiveBayes {
    models: HashMap<String, ClassModel>,
    record_count: usize,
}

impl NaiveBayes {
    pub fn fit(records: &[TrainingRecord]) -> Self {
        Self::fit_with_floor(records, DEFAULT_VARIANCE_FLOOR)
    }

    pub fn fit_with_floor(records: &[TrainingRecord], variance_floor: f64) -> Self {
        let mut grouped: HashMap<&str, Vec<FeatureVector>> = HashMap::new();
        for record in records {
            grouped.entry(record.label.as_str()).or_default().push(record.features);
        }

        let models = grouped
            .into_iter()
            .map(|(label, samples)| {
                let model = ClassModel::fit(label, &samples, variance_floor);
                log::debug!("Class '{}': {} samples, {:?}", label, samples.len(), model.stats);
                (label.to_string(), model)
            })
            .collect();

        Self {
            models,
            record_count: records.len(),
        }
    }

    pub fn model(&self, label: &str) -> Option<&ClassModel> {
        self.models.get(label)
    }

    /// Score every candidate for the query, with a uniform prior over trained candidates.
    /// Duplicate candidates are collapsed onto their first occurrence.
    pub fn posteriors(&self, candidates: &[String], query: &FeatureVector) -> Result<Posteriors> {
        if self.record_count == 0 {
            return Err(FruitError::NoTrainingData);
        }

        let mut seen: Vec<&str> = Vec::new();
        for c in candidates {
            if !seen.contains(&c.as_str()) {
                seen.push(c.as_str());
            }
        }

        let trained = seen.iter().filter(|c| self.models.contains_key(**c)).count();
        if trained == 0 {
            return Err(FruitError::NoCandidateData);
        }
        let log_prior = -(trained as f64).ln();

        let log_posts: Vec<Option<f64>> = seen
            .iter()
            .map(|c| self.models.get(*c).map(|m| m.log_likelihood(query) + log_prior))
            .collect();

        // log-sum-exp over trained candidates
        let max = log_posts
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let norm: f64 = log_posts.iter().flatten().map(|lp| (lp - max).exp()).sum();

        let scores = seen
            .into_iter()
            .zip(log_posts)
            .map(|(label, lp)| ClassScore {
                label: label.to_string(),
                log_posterior: lp,
                probability: lp.map(|lp| (lp - max).exp() / norm).unwrap_or(0.0),
            })
            .collect();

        Ok(Posteriors { scores })
    }

    /// Most probable candidate label
    pub fn classify(&self, candidates: &[String], query: &FeatureVector) -> Result<String> {
        let posteriors = self.posteriors(candidates, query)?;
        posteriors
            .best()
            .map(|s| s.label.clone())
            .ok_or(FruitError::NoCandidateData)
    }
}
