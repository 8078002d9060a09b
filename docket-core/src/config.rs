//! Engine configuration

use crate::{ConfigError, ContributorTier, DocketResult};
use serde::{Deserialize, Serialize};

/// Approval-count and average-score floors for each tier above Bronze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TierThresholds {
    pub silver_forms: i32,
    pub silver_score: f64,
    pub gold_forms: i32,
    pub gold_score: f64,
    pub platinum_forms: i32,
    pub platinum_score: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            silver_forms: 20,
            silver_score: 3.5,
            gold_forms: 50,
            gold_score: 4.0,
            platinum_forms: 100,
            platinum_score: 4.5,
        }
    }
}

impl TierThresholds {
    /// Highest tier the given counters qualify for. The stats engine applies
    /// this monotonically; a contributor is never moved down.
    pub fn tier_for(&self, approved_forms: i32, average_score: Option<f64>) -> ContributorTier {
        let score = average_score.unwrap_or(0.0);
        if approved_forms >= self.platinum_forms && score >= self.platinum_score {
            ContributorTier::Platinum
        } else if approved_forms >= self.gold_forms && score >= self.gold_score {
            ContributorTier::Gold
        } else if approved_forms >= self.silver_forms && score >= self.silver_score {
            ContributorTier::Silver
        } else {
            ContributorTier::Bronze
        }
    }
}

/// All tunable thresholds of the registry engine.
///
/// The defaults are the production constants; hosts may override individual
/// values but `validate()` must pass before the config is handed to any
/// engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DocketConfig {
    /// Unique pages per free week earned (milestone rate)
    pub pages_per_free_week: i32,
    /// Validity window of a reward grant, in days
    pub reward_validity_days: i64,
    /// Weeks granted on a contributor's first approval
    pub welcome_bonus_weeks: i32,
    /// Weeks granted on reaching the streak target
    pub streak_bonus_weeks: i32,
    /// Consecutive contribution days required for the streak bonus
    pub streak_target_days: i32,
    /// Normalized title-similarity ratio treated as a match
    pub title_similarity_threshold: f64,
    /// Minimum confidence that flags a submission as a duplicate
    pub duplicate_confidence_floor: u8,
    /// Duplicate matches reported per submission
    pub max_duplicate_matches: usize,
    /// Reports on the same form/type/field that mark a trending issue
    pub trend_report_threshold: i32,
    /// Impact score at which a Normal report escalates to High
    pub impact_escalation_threshold: i32,
    /// Ticket-number prefix, e.g. `FB` in `FB-20260807-0001`
    pub ticket_prefix: String,
    /// Upper bound on fields accepted per submission
    pub max_fields_per_form: usize,
    pub tiers: TierThresholds,
}

impl Default for DocketConfig {
    fn default() -> Self {
        Self {
            pages_per_free_week: 10,
            reward_validity_days: 365,
            welcome_bonus_weeks: 1,
            streak_bonus_weeks: 1,
            streak_target_days: 7,
            title_similarity_threshold: 0.85,
            duplicate_confidence_floor: 95,
            max_duplicate_matches: 5,
            trend_report_threshold: 3,
            impact_escalation_threshold: 100,
            ticket_prefix: "FB".to_string(),
            max_fields_per_form: 200,
            tiers: TierThresholds::default(),
        }
    }
}

impl DocketConfig {
    /// Validate all fields, returning the first violation found.
    pub fn validate(&self) -> DocketResult<()> {
        if self.pages_per_free_week <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "pages_per_free_week".to_string(),
                value: self.pages_per_free_week.to_string(),
                reason: "must be positive".to_string(),
            }
            .into());
        }
        if self.reward_validity_days <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "reward_validity_days".to_string(),
                value: self.reward_validity_days.to_string(),
                reason: "must be positive".to_string(),
            }
            .into());
        }
        if self.streak_target_days <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "streak_target_days".to_string(),
                value: self.streak_target_days.to_string(),
                reason: "must be positive".to_string(),
            }
            .into());
        }
        if !(0.0..=1.0).contains(&self.title_similarity_threshold)
            || self.title_similarity_threshold == 0.0
        {
            return Err(ConfigError::InvalidValue {
                field: "title_similarity_threshold".to_string(),
                value: self.title_similarity_threshold.to_string(),
                reason: "must be in (0.0, 1.0]".to_string(),
            }
            .into());
        }
        if self.duplicate_confidence_floor == 0 || self.duplicate_confidence_floor > 100 {
            return Err(ConfigError::InvalidValue {
                field: "duplicate_confidence_floor".to_string(),
                value: self.duplicate_confidence_floor.to_string(),
                reason: "must be in 1..=100".to_string(),
            }
            .into());
        }
        if self.max_duplicate_matches == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_duplicate_matches".to_string(),
                value: self.max_duplicate_matches.to_string(),
                reason: "must be positive".to_string(),
            }
            .into());
        }
        if self.trend_report_threshold < 2 {
            return Err(ConfigError::InvalidValue {
                field: "trend_report_threshold".to_string(),
                value: self.trend_report_threshold.to_string(),
                reason: "a trend needs at least two reports".to_string(),
            }
            .into());
        }
        if self.impact_escalation_threshold <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "impact_escalation_threshold".to_string(),
                value: self.impact_escalation_threshold.to_string(),
                reason: "must be positive".to_string(),
            }
            .into());
        }
        if self.ticket_prefix.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "ticket_prefix".to_string(),
            }
            .into());
        }
        if !self
            .ticket_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ConfigError::InvalidValue {
                field: "ticket_prefix".to_string(),
                value: self.ticket_prefix.clone(),
                reason: "must be ASCII alphanumeric".to_string(),
            }
            .into());
        }
        let t = &self.tiers;
        if !(t.silver_forms < t.gold_forms && t.gold_forms < t.platinum_forms) {
            return Err(ConfigError::InvalidValue {
                field: "tiers".to_string(),
                value: format!("{}/{}/{}", t.silver_forms, t.gold_forms, t.platinum_forms),
                reason: "form thresholds must be strictly increasing".to_string(),
            }
            .into());
        }
        if !(t.silver_score <= t.gold_score && t.gold_score <= t.platinum_score) {
            return Err(ConfigError::InvalidValue {
                field: "tiers".to_string(),
                value: format!("{}/{}/{}", t.silver_score, t.gold_score, t.platinum_score),
                reason: "score thresholds must be non-decreasing".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocketError;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DocketConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_milestone_rate() {
        let config = DocketConfig {
            pages_per_free_week: 0,
            ..DocketConfig::default()
        };
        let result = config.validate();
        assert!(matches!(
            result,
            Err(DocketError::Config(ConfigError::InvalidValue { field, .. }))
                if field == "pages_per_free_week"
        ));
    }

    #[test]
    fn test_rejects_similarity_threshold_out_of_range() {
        for bad in [0.0, 1.5, -0.2] {
            let config = DocketConfig {
                title_similarity_threshold: bad,
                ..DocketConfig::default()
            };
            assert!(config.validate().is_err(), "threshold {bad} should fail");
        }
    }

    #[test]
    fn test_rejects_empty_ticket_prefix() {
        let config = DocketConfig {
            ticket_prefix: "  ".to_string(),
            ..DocketConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DocketError::Config(ConfigError::MissingRequired { .. }))
        ));
    }

    #[test]
    fn test_rejects_non_increasing_tier_forms() {
        let config = DocketConfig {
            tiers: TierThresholds {
                gold_forms: 20,
                ..TierThresholds::default()
            },
            ..DocketConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tier_for_thresholds() {
        let tiers = TierThresholds::default();
        assert_eq!(tiers.tier_for(0, None), ContributorTier::Bronze);
        assert_eq!(tiers.tier_for(19, Some(5.0)), ContributorTier::Bronze);
        assert_eq!(tiers.tier_for(20, Some(3.5)), ContributorTier::Silver);
        assert_eq!(tiers.tier_for(50, Some(3.9)), ContributorTier::Silver);
        assert_eq!(tiers.tier_for(50, Some(4.0)), ContributorTier::Gold);
        assert_eq!(tiers.tier_for(100, Some(4.5)), ContributorTier::Platinum);
        assert_eq!(tiers.tier_for(150, None), ContributorTier::Bronze);
    }
}
