use std::sync::Arc;

use serene_core::catalog::{Catalog, Category, LibraryFilter, Technique, TimingOverrides};
use serene_core::model::{BreathingPattern, CustomPattern, DEFAULT_CYCLES, PatternDraft};
use storage::repository::CustomPatternRepository;

use crate::Clock;
use crate::error::LibraryError;
use crate::sessions::{PlanOverrides, SessionPlan};

/// Session name used for patterns given entirely on the command line.
pub const AD_HOC_NAME: &str = "Custom Pattern";

/// Technique library plus the user's saved patterns.
#[derive(Clone)]
pub struct LibraryService {
    catalog: Catalog,
    clock: Clock,
    patterns: Arc<dyn CustomPatternRepository>,
}

impl LibraryService {
    #[must_use]
    pub fn new(clock: Clock, patterns: Arc<dyn CustomPatternRepository>) -> Self {
        Self {
            catalog: Catalog::builtin(),
            clock,
            patterns,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Catalog {
        self.catalog
    }

    #[must_use]
    pub fn list(&self, filter: &LibraryFilter) -> Vec<&'static Technique> {
        self.catalog.filter(filter)
    }

    /// Every category with the number of techniques in it.
    #[must_use]
    pub fn categories(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .into_iter()
            .map(|category| (category, self.catalog.by_category(category).len()))
            .collect()
    }

    /// # Errors
    ///
    /// Returns `LibraryError::Catalog` if the id is unknown.
    pub fn technique(&self, id: &str) -> Result<&'static Technique, LibraryError> {
        Ok(self.catalog.require(id)?)
    }

    /// Resolve a technique id, or failing that a saved pattern name, into a runnable plan.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::UnknownSource` when nothing matches, or a catalog/pattern error
    /// when the overrides are rejected.
    pub async fn plan(
        &self,
        source: &str,
        overrides: PlanOverrides,
    ) -> Result<SessionPlan, LibraryError> {
        if let Some(technique) = self.catalog.get(source) {
            let pattern = technique.customized_pattern(overrides.cycles, overrides.timings)?;
            return Ok(SessionPlan::from_technique(technique, pattern));
        }

        let custom = self
            .patterns
            .get_pattern(source.trim())
            .await?
            .ok_or_else(|| LibraryError::UnknownSource(source.to_owned()))?;
        let pattern = apply_overrides(*custom.pattern(), overrides)?;
        Ok(SessionPlan::from_custom(&custom, pattern))
    }

    /// Plan an unsaved pattern. Inhale and exhale are required; holds default to zero and
    /// cycles to the library default.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::MissingTiming` when inhale or exhale is absent, or
    /// `LibraryError::Pattern` when the timings are out of range.
    pub fn ad_hoc_plan(&self, overrides: PlanOverrides) -> Result<SessionPlan, LibraryError> {
        let TimingOverrides {
            inhale,
            hold_after_inhale,
            exhale,
            hold_after_exhale,
        } = overrides.timings;
        let draft = PatternDraft::new(
            inhale.ok_or(LibraryError::MissingTiming("inhale"))?,
            hold_after_inhale.unwrap_or(0.0),
            exhale.ok_or(LibraryError::MissingTiming("exhale"))?,
            hold_after_exhale.unwrap_or(0.0),
            overrides.cycles.unwrap_or(DEFAULT_CYCLES),
        );
        Ok(SessionPlan::ad_hoc(AD_HOC_NAME, draft.validate()?))
    }

    /// Save (or replace) a named pattern.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError` if the draft or name is invalid, or storage fails.
    pub async fn save_custom(
        &self,
        name: &str,
        draft: PatternDraft,
    ) -> Result<CustomPattern, LibraryError> {
        let pattern = draft.validate()?;
        let custom = CustomPattern::new(name, pattern, self.clock.now())?;
        self.patterns.upsert_pattern(&custom).await?;
        tracing::info!(name = custom.name(), notation = %pattern.notation(), "saved custom pattern");
        Ok(custom)
    }

    /// # Errors
    ///
    /// Returns `LibraryError::Storage` on repository failures.
    pub async fn list_custom(&self) -> Result<Vec<CustomPattern>, LibraryError> {
        Ok(self.patterns.list_patterns().await?)
    }

    /// # Errors
    ///
    /// Returns `LibraryError::Storage` on repository failures.
    pub async fn delete_custom(&self, name: &str) -> Result<bool, LibraryError> {
        let deleted = self.patterns.delete_pattern(name.trim()).await?;
        if deleted {
            tracing::info!(name = name.trim(), "deleted custom pattern");
        }
        Ok(deleted)
    }
}

fn apply_overrides(
    pattern: BreathingPattern,
    overrides: PlanOverrides,
) -> Result<BreathingPattern, LibraryError> {
    if overrides == PlanOverrides::default() {
        return Ok(pattern);
    }
    let base = pattern.to_draft();
    let TimingOverrides {
        inhale,
        hold_after_inhale,
        exhale,
        hold_after_exhale,
    } = overrides.timings;
    let draft = PatternDraft::new(
        inhale.unwrap_or(base.inhale),
        hold_after_inhale.unwrap_or(base.hold_after_inhale),
        exhale.unwrap_or(base.exhale),
        hold_after_exhale.unwrap_or(base.hold_after_exhale),
        overrides.cycles.unwrap_or(base.total_cycles),
    );
    Ok(draft.validate()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::PlanSource;
    use serene_core::catalog::{CatalogError, Category};
    use serene_core::model::Phase;
    use serene_core::time::fixed_clock;
    use std::time::Duration;
    use storage::repository::InMemoryRepository;

    fn service() -> LibraryService {
        LibraryService::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn plans_builtin_technique_with_defaults() {
        let plan = service()
            .plan("4-7-8-breathing", PlanOverrides::default())
            .await
            .unwrap();
        assert_eq!(plan.technique_name, "4-7-8 Breathing");
        assert_eq!(plan.source, PlanSource::Technique("4-7-8-breathing"));
        assert_eq!(plan.pattern.notation(), "4-7-8-0");
        assert_eq!(plan.pattern.total_cycles(), 5);
    }

    #[tokio::test]
    async fn custom_patterns_resolve_by_name() {
        let svc = service();
        svc.save_custom(" Evening ", PatternDraft::new(4.0, 2.0, 6.0, 0.0, 3))
            .await
            .unwrap();

        let plan = svc
            .plan(
                "Evening",
                PlanOverrides {
                    cycles: Some(7),
                    ..PlanOverrides::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(plan.source, PlanSource::Custom("Evening".into()));
        assert_eq!(plan.pattern.total_cycles(), 7);
        assert_eq!(plan.pattern.duration_of(Phase::Exhale), Duration::from_secs(6));

        assert!(svc.delete_custom("Evening").await.unwrap());
        assert!(matches!(
            svc.plan("Evening", PlanOverrides::default()).await,
            Err(LibraryError::UnknownSource(_))
        ));
    }

    #[tokio::test]
    async fn fixed_techniques_reject_timing_overrides() {
        let overrides = PlanOverrides {
            cycles: None,
            timings: TimingOverrides {
                inhale: Some(3.0),
                ..TimingOverrides::default()
            },
        };
        let err = service().plan("wim-hof-basic", overrides).await.unwrap_err();
        assert!(matches!(
            err,
            LibraryError::Catalog(CatalogError::NotCustomizable("wim-hof-basic"))
        ));
    }

    #[tokio::test]
    async fn invalid_custom_drafts_are_rejected() {
        let svc = service();
        assert!(matches!(
            svc.save_custom("Broken", PatternDraft::new(0.0, 0.0, 4.0, 0.0, 3)).await,
            Err(LibraryError::Pattern(_))
        ));
        assert!(matches!(
            svc.save_custom("   ", PatternDraft::new(4.0, 0.0, 4.0, 0.0, 3)).await,
            Err(LibraryError::CustomPattern(_))
        ));
        assert!(svc.list_custom().await.unwrap().is_empty());
    }

    #[test]
    fn ad_hoc_plans_need_inhale_and_exhale() {
        let svc = service();
        let mut overrides = PlanOverrides {
            cycles: Some(3),
            timings: TimingOverrides {
                inhale: Some(5.0),
                ..TimingOverrides::default()
            },
        };
        assert!(matches!(
            svc.ad_hoc_plan(overrides),
            Err(LibraryError::MissingTiming("exhale"))
        ));

        overrides.timings.exhale = Some(5.0);
        let plan = svc.ad_hoc_plan(overrides).unwrap();
        assert_eq!(plan.technique_name, AD_HOC_NAME);
        assert_eq!(plan.pattern.notation(), "5-0-5-0");
        assert_eq!(plan.pattern.total_cycles(), 3);

        overrides.timings.exhale = Some(90.0);
        assert!(matches!(svc.ad_hoc_plan(overrides), Err(LibraryError::Pattern(_))));
    }

    #[test]
    fn categories_count_every_technique_tag() {
        let counts = service().categories();
        assert_eq!(counts.len(), Category::ALL.len());
        assert!(counts.contains(&(Category::Pranayama, 11)));
        assert!(counts.contains(&(Category::Sleep, 1)));
    }

    #[test]
    fn list_applies_filters() {
        let filter = LibraryFilter {
            category: Some(Category::Sleep),
            ..LibraryFilter::default()
        };
        assert_eq!(service().list(&filter).len(), 1);
    }
}
