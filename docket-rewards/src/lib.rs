//! DOCKET Rewards - Contributor Ledger & Stats Engine
//!
//! Maintains the per-contributor cumulative counters and the append-only
//! reward ledger. Milestone credit is computed from the delta between the
//! old and new cumulative page totals, never from the new total alone, so
//! replaying an approval with the same before/after snapshot cannot
//! double-grant. One-time bonuses (welcome, streak) are gated on a ledger
//! lookup for a prior grant of the same type.

use chrono::Duration;
use docket_core::{
    ContributorId, ContributorStats, ContributorTier, DocketConfig, DocketResult, EntityType,
    FormId, LedgerEntryId, RewardLedgerEntry, RewardType, StorageError, Timestamp,
    ValidationError,
};
use docket_storage::{LedgerFlagUpdate, StorageTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

// ============================================================================
// OUTCOME TYPES
// ============================================================================

/// Summary of the reward side effects of one approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardGrant {
    /// Whether any ledger entry was created
    pub granted: bool,
    /// Total free weeks across all entries created by this approval
    pub weeks: i32,
    pub entries: Vec<RewardLedgerEntry>,
    /// Page threshold credited, when a milestone was crossed
    pub milestone_value: Option<i32>,
    /// Tier after re-evaluation
    pub tier: ContributorTier,
}

/// The next page threshold a contributor is working toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextMilestone {
    pub at_pages: i32,
    pub pages_remaining: i32,
}

/// Snapshot returned to `GetContributorRewards` callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorRewards {
    pub stats: ContributorStats,
    /// Unexpired, unspent, unrevoked grants
    pub active_entries: Vec<RewardLedgerEntry>,
    pub next_milestone: NextMilestone,
}

/// Free weeks owed for moving from `old_pages` to `new_pages` cumulative
/// unique pages, at one week per `rate` pages.
///
/// Equals the number of multiples of `rate` in the half-open interval
/// `(old_pages, new_pages]`, which is what makes the grant idempotent: the
/// same before/after snapshot always yields the same (and only one) answer.
pub fn milestone_weeks(old_pages: i32, new_pages: i32, rate: i32) -> i32 {
    new_pages / rate - old_pages / rate
}

// ============================================================================
// ENGINE
// ============================================================================

/// Contributor ledger and stats engine.
///
/// Stateless between calls; every operation is one logical transaction
/// against the storage layer, with counter mutations running under the
/// stats row lock via `stats_upsert_with`.
pub struct RewardsEngine {
    storage: Arc<dyn StorageTrait>,
    config: DocketConfig,
}

impl RewardsEngine {
    pub fn new(storage: Arc<dyn StorageTrait>, config: DocketConfig) -> Self {
        Self { storage, config }
    }

    /// Counter and streak update for a fresh submission.
    ///
    /// Streak rule: a gap of at most one day since the last contribution
    /// extends the streak, anything longer resets it to 1. Crossing the
    /// streak target grants the one-time streak bonus.
    pub fn on_submission(
        &self,
        contributor_id: ContributorId,
        now: Timestamp,
    ) -> DocketResult<ContributorStats> {
        let stats = self.storage.stats_upsert_with(contributor_id, &mut |s| {
            s.forms_submitted += 1;
            s.forms_pending += 1;
            advance_streak(s, now);
            Ok(())
        })?;
        debug!(
            contributor_id = %contributor_id,
            streak = stats.current_streak_days,
            "submission recorded"
        );
        self.maybe_grant_streak_bonus(&stats)?;
        self.storage.stats_get(contributor_id)?.ok_or_else(|| {
            StorageError::NotFound {
                entity_type: EntityType::ContributorStats,
                id: contributor_id,
            }
            .into()
        })
    }

    /// Counter and streak update for a resubmission after revision. The
    /// form re-enters the pending pool but is not counted as newly
    /// submitted.
    pub fn on_resubmission(
        &self,
        contributor_id: ContributorId,
        now: Timestamp,
    ) -> DocketResult<ContributorStats> {
        let stats = self.storage.stats_upsert_with(contributor_id, &mut |s| {
            s.forms_pending += 1;
            advance_streak(s, now);
            Ok(())
        })?;
        self.maybe_grant_streak_bonus(&stats)?;
        self.storage.stats_get(contributor_id)?.ok_or_else(|| {
            StorageError::NotFound {
                entity_type: EntityType::ContributorStats,
                id: contributor_id,
            }
            .into()
        })
    }

    /// Ledger accounting for an approval. Called synchronously by the form
    /// lifecycle inside the review transaction.
    pub fn on_approval(
        &self,
        contributor_id: ContributorId,
        form_id: FormId,
        page_count: i32,
        score: Option<f32>,
    ) -> DocketResult<RewardGrant> {
        if page_count <= 0 {
            return Err(ValidationError::InvalidValue {
                field: "page_count".to_string(),
                reason: "approved form must have a positive page count".to_string(),
            }
            .into());
        }

        let rate = self.config.pages_per_free_week;
        let mut old_pages = 0;
        let mut new_pages = 0;
        let mut first_approval = false;

        let stats = self.storage.stats_upsert_with(contributor_id, &mut |s| {
            old_pages = s.unique_pages;
            new_pages = old_pages + page_count;

            s.forms_pending = (s.forms_pending - 1).max(0);
            s.forms_approved += 1;
            s.unique_forms += 1;
            s.unique_pages = new_pages;
            first_approval = s.forms_approved == 1;

            if let Some(score) = score {
                s.score_sum += f64::from(score);
                s.score_count += 1;
            }

            // Tier never downgrades, whatever the new average says.
            let qualified = self
                .config
                .tiers
                .tier_for(s.forms_approved, s.average_score());
            s.tier = s.tier.max(qualified);
            Ok(())
        })?;

        let mut entries = Vec::new();

        let weeks = milestone_weeks(old_pages, new_pages, rate);
        if weeks > 0 {
            let milestone_value = (new_pages / rate) * rate;
            let entry = RewardLedgerEntry::page_milestone(
                contributor_id,
                form_id,
                weeks,
                milestone_value,
                self.config.reward_validity_days,
            );
            self.storage.ledger_append(&entry)?;
            info!(
                contributor_id = %contributor_id,
                form_id = %form_id,
                weeks,
                milestone_value,
                "page milestone credited"
            );
            entries.push(entry);
        }

        if first_approval
            && !self
                .storage
                .ledger_has_grant(contributor_id, RewardType::WelcomeBonus)?
        {
            let entry = RewardLedgerEntry::welcome_bonus(
                contributor_id,
                form_id,
                self.config.welcome_bonus_weeks,
                self.config.reward_validity_days,
            );
            self.storage.ledger_append(&entry)?;
            info!(contributor_id = %contributor_id, "welcome bonus credited");
            entries.push(entry);
        }

        let total_weeks: i32 = entries.iter().map(|e| e.weeks).sum();
        if total_weeks > 0 {
            self.storage.stats_upsert_with(contributor_id, &mut |s| {
                s.free_weeks_earned += total_weeks;
                Ok(())
            })?;
        }

        Ok(RewardGrant {
            granted: !entries.is_empty(),
            weeks: total_weeks,
            milestone_value: entries
                .iter()
                .find_map(|e| e.milestone_value),
            entries,
            tier: stats.tier,
        })
    }

    /// Counter update for a rejection.
    pub fn on_rejection(&self, contributor_id: ContributorId) -> DocketResult<ContributorStats> {
        self.storage.stats_upsert_with(contributor_id, &mut |s| {
            s.forms_pending = (s.forms_pending - 1).max(0);
            s.forms_rejected += 1;
            Ok(())
        })
    }

    /// Counter update for a revision request.
    pub fn on_revision_request(
        &self,
        contributor_id: ContributorId,
    ) -> DocketResult<ContributorStats> {
        self.storage.stats_upsert_with(contributor_id, &mut |s| {
            s.forms_pending = (s.forms_pending - 1).max(0);
            s.revision_requests += 1;
            Ok(())
        })
    }

    /// Stats snapshot, active grants, and the next page threshold. Creates
    /// the stats row on first query.
    pub fn rewards_snapshot(
        &self,
        contributor_id: ContributorId,
        now: Timestamp,
    ) -> DocketResult<ContributorRewards> {
        let stats = match self.storage.stats_get(contributor_id)? {
            Some(stats) => stats,
            None => self
                .storage
                .stats_upsert_with(contributor_id, &mut |_| Ok(()))?,
        };

        let active_entries = self
            .storage
            .ledger_list_by_contributor(contributor_id)?
            .into_iter()
            .filter(|e| e.is_available(now))
            .collect();

        let rate = self.config.pages_per_free_week;
        let at_pages = (stats.unique_pages / rate + 1) * rate;
        Ok(ContributorRewards {
            next_milestone: NextMilestone {
                at_pages,
                pages_remaining: at_pages - stats.unique_pages,
            },
            stats,
            active_entries,
        })
    }

    /// Spend one free week from a specific grant.
    pub fn use_free_week(
        &self,
        contributor_id: ContributorId,
        entry_id: LedgerEntryId,
        now: Timestamp,
    ) -> DocketResult<RewardLedgerEntry> {
        let entry = self.storage.ledger_get(entry_id)?.ok_or_else(|| {
            StorageError::NotFound {
                entity_type: EntityType::RewardLedgerEntry,
                id: entry_id,
            }
        })?;
        if entry.contributor_id != contributor_id {
            return Err(StorageError::NotFound {
                entity_type: EntityType::RewardLedgerEntry,
                id: entry_id,
            }
            .into());
        }
        if !entry.is_available(now) {
            return Err(ValidationError::ConstraintViolation {
                constraint: "ledger_entry_available".to_string(),
                reason: "entry is spent, revoked, or expired".to_string(),
            }
            .into());
        }

        let updated = self.storage.ledger_update_flags(
            entry_id,
            LedgerFlagUpdate {
                active: Some(false),
                used_at: Some(now),
                ..LedgerFlagUpdate::default()
            },
        )?;
        self.storage.stats_upsert_with(contributor_id, &mut |s| {
            s.free_weeks_used += updated.weeks;
            Ok(())
        })?;
        Ok(updated)
    }

    /// Administrative revocation. Unused grants are also subtracted from the
    /// earned counter so `free_weeks_available` stays honest.
    pub fn revoke(&self, entry_id: LedgerEntryId, now: Timestamp) -> DocketResult<RewardLedgerEntry> {
        let entry = self.storage.ledger_get(entry_id)?.ok_or_else(|| {
            StorageError::NotFound {
                entity_type: EntityType::RewardLedgerEntry,
                id: entry_id,
            }
        })?;
        let updated = self.storage.ledger_update_flags(
            entry_id,
            LedgerFlagUpdate {
                active: Some(false),
                revoked_at: Some(now),
                ..LedgerFlagUpdate::default()
            },
        )?;
        if entry.used_at.is_none() {
            self.storage
                .stats_upsert_with(entry.contributor_id, &mut |s| {
                    s.free_weeks_earned -= entry.weeks;
                    Ok(())
                })?;
        }
        info!(entry_id = %entry_id, weeks = entry.weeks, "ledger entry revoked");
        Ok(updated)
    }

    /// Deactivate grants whose validity window has passed.
    pub fn expire_due(&self, now: Timestamp) -> DocketResult<u32> {
        let swept = self.storage.ledger_sweep_expired(now)?;
        if swept > 0 {
            debug!(swept, "expired ledger entries deactivated");
        }
        Ok(swept)
    }

    /// Grant the streak bonus exactly once, when the streak target is hit.
    fn maybe_grant_streak_bonus(&self, stats: &ContributorStats) -> DocketResult<()> {
        if stats.current_streak_days < self.config.streak_target_days {
            return Ok(());
        }
        if self
            .storage
            .ledger_has_grant(stats.contributor_id, RewardType::StreakBonus)?
        {
            return Ok(());
        }
        let entry = RewardLedgerEntry::streak_bonus(
            stats.contributor_id,
            self.config.streak_bonus_weeks,
            stats.current_streak_days,
            self.config.reward_validity_days,
        );
        self.storage.ledger_append(&entry)?;
        self.storage
            .stats_upsert_with(stats.contributor_id, &mut |s| {
                s.free_weeks_earned += entry.weeks;
                Ok(())
            })?;
        info!(
            contributor_id = %stats.contributor_id,
            streak = stats.current_streak_days,
            "streak bonus credited"
        );
        Ok(())
    }
}

fn advance_streak(stats: &mut ContributorStats, now: Timestamp) {
    let within_gap = stats
        .last_contribution_at
        .is_some_and(|last| now - last <= Duration::days(1));
    stats.current_streak_days = if within_gap {
        stats.current_streak_days + 1
    } else {
        1
    };
    stats.best_streak_days = stats.best_streak_days.max(stats.current_streak_days);
    stats.last_contribution_at = Some(now);
}
