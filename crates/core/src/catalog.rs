//! Built-in library of breathing techniques and the filters used to browse it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{BreathingPattern, DEFAULT_CYCLES, PatternDraft, PatternError};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("unknown technique: {0}")]
    UnknownTechnique(String),
    #[error("technique {0} does not allow custom timings")]
    NotCustomizable(&'static str),
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

//
// ─── CLASSIFICATION ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Relaxation,
    Focus,
    Energy,
    Sleep,
    Health,
    Pranayama,
    Meditation,
    Therapeutic,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Relaxation,
        Category::Focus,
        Category::Energy,
        Category::Sleep,
        Category::Health,
        Category::Pranayama,
        Category::Meditation,
        Category::Therapeutic,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Relaxation => "Relaxation",
            Category::Focus => "Focus",
            Category::Energy => "Energy",
            Category::Sleep => "Sleep",
            Category::Health => "Health",
            Category::Pranayama => "Pranayama",
            Category::Meditation => "Meditation",
            Category::Therapeutic => "Therapeutic",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CatalogError::UnknownCategory(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Expert,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
            Difficulty::Expert => "Expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|difficulty| difficulty.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CatalogError::UnknownDifficulty(s.to_owned()))
    }
}

//
// ─── TECHNIQUE ─────────────────────────────────────────────────────────────────
//

/// Default timings of a technique in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultTimings {
    pub inhale: f64,
    pub hold_after_inhale: f64,
    pub exhale: f64,
    pub hold_after_exhale: f64,
    /// Prescribed number of rounds, when the technique has one.
    pub rounds: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Technique {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub benefits: &'static [&'static str],
    pub categories: &'static [Category],
    pub difficulty: Difficulty,
    pub timings: DefaultTimings,
    pub customizable: bool,
    pub duration_label: &'static str,
    pub warnings: &'static [&'static str],
}

/// Per-phase overrides applied on top of a technique's defaults, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimingOverrides {
    pub inhale: Option<f64>,
    pub hold_after_inhale: Option<f64>,
    pub exhale: Option<f64>,
    pub hold_after_exhale: Option<f64>,
}

impl TimingOverrides {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inhale.is_none()
            && self.hold_after_inhale.is_none()
            && self.exhale.is_none()
            && self.hold_after_exhale.is_none()
    }
}

impl Technique {
    /// Cycles used when the caller does not choose a count.
    #[must_use]
    pub fn default_cycles(&self) -> u32 {
        self.timings.rounds.unwrap_or(DEFAULT_CYCLES)
    }

    /// Build the session pattern from the technique defaults.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Pattern` if the cycle override is out of range.
    pub fn pattern(&self, cycles: Option<u32>) -> Result<BreathingPattern, CatalogError> {
        self.customized_pattern(cycles, TimingOverrides::default())
    }

    /// Build the session pattern with per-phase overrides.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotCustomizable` if timings are overridden on a fixed technique,
    /// or `CatalogError::Pattern` if the resulting pattern is invalid.
    pub fn customized_pattern(
        &self,
        cycles: Option<u32>,
        overrides: TimingOverrides,
    ) -> Result<BreathingPattern, CatalogError> {
        if !overrides.is_empty() && !self.customizable {
            return Err(CatalogError::NotCustomizable(self.id));
        }
        let t = self.timings;
        let draft = PatternDraft::new(
            overrides.inhale.unwrap_or(t.inhale),
            overrides.hold_after_inhale.unwrap_or(t.hold_after_inhale),
            overrides.exhale.unwrap_or(t.exhale),
            overrides.hold_after_exhale.unwrap_or(t.hold_after_exhale),
            cycles.unwrap_or_else(|| self.default_cycles()),
        );
        Ok(draft.validate()?)
    }

    #[must_use]
    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }
}

//
// ─── FILTER ────────────────────────────────────────────────────────────────────
//

/// Library browse filters. Unset fields match everything; set fields are AND-ed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryFilter {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
}

impl LibraryFilter {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.search.as_deref().is_some_and(|s| !s.trim().is_empty())
            || self.category.is_some()
            || self.difficulty.is_some()
    }

    #[must_use]
    pub fn matches(&self, technique: &Technique) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => technique.matches_search(&term.to_lowercase()),
            _ => true,
        };
        let category_ok = self.category.is_none_or(|c| technique.has_category(c));
        let difficulty_ok = self.difficulty.is_none_or(|d| technique.difficulty == d);
        search_ok && category_ok && difficulty_ok
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    techniques: &'static [Technique],
}

impl Catalog {
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            techniques: BUILTIN_TECHNIQUES,
        }
    }

    #[must_use]
    pub fn all(&self) -> &'static [Technique] {
        self.techniques
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&'static Technique> {
        self.techniques.iter().find(|t| t.id == id)
    }

    /// Look up a technique by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTechnique` if no technique has this id.
    pub fn require(&self, id: &str) -> Result<&'static Technique, CatalogError> {
        self.get(id)
            .ok_or_else(|| CatalogError::UnknownTechnique(id.to_owned()))
    }

    #[must_use]
    pub fn by_category(&self, category: Category) -> Vec<&'static Technique> {
        self.techniques
            .iter()
            .filter(|t| t.has_category(category))
            .collect()
    }

    #[must_use]
    pub fn filter(&self, filter: &LibraryFilter) -> Vec<&'static Technique> {
        self.techniques.iter().filter(|t| filter.matches(t)).collect()
    }
}

const fn timings(inhale: f64, hold_after_inhale: f64, exhale: f64, hold_after_exhale: f64) -> DefaultTimings {
    DefaultTimings {
        inhale,
        hold_after_inhale,
        exhale,
        hold_after_exhale,
        rounds: None,
    }
}

const fn rounds(t: DefaultTimings, rounds: u32) -> DefaultTimings {
    DefaultTimings {
        rounds: Some(rounds),
        ..t
    }
}

use Category::{Energy, Focus, Health, Meditation, Pranayama, Relaxation, Sleep, Therapeutic};

static BUILTIN_TECHNIQUES: &[Technique] = &[
    Technique {
        id: "box-breathing",
        name: "Box Breathing",
        description: "Equal inhale, hold, exhale, hold counts. Promotes calm and focus through balanced breathing rhythm.",
        benefits: &["Stress reduction", "Mental clarity", "Emotional regulation", "Focus enhancement"],
        categories: &[Relaxation, Focus],
        difficulty: Difficulty::Beginner,
        timings: timings(4.0, 4.0, 4.0, 4.0),
        customizable: true,
        duration_label: "2-5 min",
        warnings: &[],
    },
    Technique {
        id: "4-7-8-breathing",
        name: "4-7-8 Breathing",
        description: "Inhale for 4, hold for 7, exhale for 8. A powerful relaxation technique for deep calm and sleep.",
        benefits: &["Deep relaxation", "Sleep aid", "Anxiety reduction", "Nervous system calm"],
        categories: &[Relaxation, Sleep],
        difficulty: Difficulty::Beginner,
        timings: timings(4.0, 7.0, 8.0, 0.0),
        customizable: true,
        duration_label: "3-5 min",
        warnings: &[],
    },
    Technique {
        id: "diaphragmatic-breathing",
        name: "Diaphragmatic Breathing",
        description: "Deep belly breathing that expands the diaphragm. Reduces stress and improves oxygen exchange.",
        benefits: &["Stress reduction", "Lower heart rate", "Improved oxygen exchange", "Better posture"],
        categories: &[Relaxation, Health],
        difficulty: Difficulty::Beginner,
        timings: timings(4.0, 1.0, 6.0, 1.0),
        customizable: true,
        duration_label: "5-10 min",
        warnings: &[],
    },
    Technique {
        id: "coherence-breathing",
        name: "Coherence Breathing",
        description: "Breathing at 5-6 breaths per minute to balance the autonomic nervous system and improve heart rate variability.",
        benefits: &["Heart rate variability", "Nervous system balance", "Stress reduction", "Focus improvement"],
        categories: &[Focus, Health],
        difficulty: Difficulty::Intermediate,
        timings: timings(5.5, 0.0, 5.5, 0.0),
        customizable: true,
        duration_label: "5-15 min",
        warnings: &[],
    },
    Technique {
        id: "alternate-nostril",
        name: "Nadi Shodhana (Alternate Nostril)",
        description: "Traditional pranayama breathing through alternating nostrils to balance energy and calm the nervous system.",
        benefits: &["Energy balance", "Nervous system calm", "Improved focus", "Mental clarity"],
        categories: &[Pranayama, Focus, Energy],
        difficulty: Difficulty::Intermediate,
        timings: timings(4.0, 0.0, 6.0, 0.0),
        customizable: true,
        duration_label: "5-10 min",
        warnings: &[],
    },
    Technique {
        id: "energizing-breath",
        name: "Energizing Breath",
        description: "A simplified version of breath-work to increase energy and reduce stress. Practice safely.",
        benefits: &["Increased energy", "Stress reduction", "Mental alertness", "Mood boost"],
        categories: &[Energy],
        difficulty: Difficulty::Advanced,
        timings: timings(2.0, 0.0, 2.0, 0.0),
        customizable: false,
        duration_label: "10-15 min",
        warnings: &[],
    },
    Technique {
        id: "kapalbhati",
        name: "Kapalbhati Pranayama",
        description: "Skull shining breath - rapid abdominal breathing for energy and cleansing.",
        benefits: &["Digestive health", "Mental clarity", "Energy boost", "Core strength"],
        categories: &[Pranayama, Energy],
        difficulty: Difficulty::Advanced,
        timings: rounds(timings(0.5, 0.0, 0.3, 0.0), 20),
        customizable: true,
        duration_label: "5-10 min",
        warnings: &["Avoid during pregnancy", "Stop if experiencing dizziness"],
    },
    Technique {
        id: "bhastrika",
        name: "Bhastrika Pranayama",
        description: "Bellows breath - vigorous breathing for energy and heat generation.",
        benefits: &["Energy generation", "Metabolic boost", "Mental alertness", "Circulation"],
        categories: &[Pranayama, Energy],
        difficulty: Difficulty::Advanced,
        timings: rounds(timings(1.0, 0.0, 1.0, 0.0), 10),
        customizable: true,
        duration_label: "3-5 min",
        warnings: &["Avoid with heart conditions", "Practice on empty stomach"],
    },
    Technique {
        id: "ujjayi",
        name: "Ujjayi Pranayama",
        description: "Ocean breath - deep breathing with slight throat constriction for calming effect.",
        benefits: &["Stress reduction", "Focus enhancement", "Internal heat", "Meditation support"],
        categories: &[Pranayama, Relaxation],
        difficulty: Difficulty::Intermediate,
        timings: timings(6.0, 2.0, 6.0, 2.0),
        customizable: true,
        duration_label: "5-15 min",
        warnings: &[],
    },
    Technique {
        id: "bhramari",
        name: "Bhramari Pranayama",
        description: "Humming bee breath - breathing with humming sound for deep relaxation.",
        benefits: &["Stress relief", "Mental calmness", "Concentration", "Sound therapy"],
        categories: &[Pranayama, Relaxation],
        difficulty: Difficulty::Intermediate,
        timings: timings(4.0, 1.0, 6.0, 1.0),
        customizable: true,
        duration_label: "5-10 min",
        warnings: &[],
    },
    Technique {
        id: "surya-bhedana",
        name: "Surya Bhedana",
        description: "Right nostril breathing to activate solar energy and increase body heat.",
        benefits: &["Energy boost", "Body heat", "Digestive fire", "Mental alertness"],
        categories: &[Pranayama, Energy],
        difficulty: Difficulty::Intermediate,
        timings: timings(4.0, 4.0, 4.0, 0.0),
        customizable: true,
        duration_label: "5-10 min",
        warnings: &[],
    },
    Technique {
        id: "chandra-bhedana",
        name: "Chandra Bhedana",
        description: "Left nostril breathing to activate lunar energy and create cooling effect.",
        benefits: &["Cooling effect", "Stress reduction", "Blood pressure control", "Mental calm"],
        categories: &[Pranayama, Relaxation],
        difficulty: Difficulty::Intermediate,
        timings: timings(4.0, 4.0, 4.0, 0.0),
        customizable: true,
        duration_label: "5-10 min",
        warnings: &[],
    },
    Technique {
        id: "anulom-vilom",
        name: "Anulom Vilom",
        description: "Complete alternate nostril breathing cycle for perfect balance and harmony.",
        benefits: &["Complete energy balance", "Nervous system harmony", "Blood circulation", "Mental peace"],
        categories: &[Pranayama, Focus, Health],
        difficulty: Difficulty::Intermediate,
        timings: timings(4.0, 4.0, 4.0, 4.0),
        customizable: true,
        duration_label: "10-15 min",
        warnings: &[],
    },
    Technique {
        id: "sheetali",
        name: "Sheetali Pranayama",
        description: "Cooling breath through curled tongue to reduce body heat and calm mind.",
        benefits: &["Body cooling", "Stress relief", "Blood pressure control", "Digestive aid"],
        categories: &[Pranayama, Therapeutic],
        difficulty: Difficulty::Beginner,
        timings: timings(4.0, 2.0, 6.0, 2.0),
        customizable: true,
        duration_label: "5-10 min",
        warnings: &[],
    },
    Technique {
        id: "sheetkari",
        name: "Sheetkari Pranayama",
        description: "Hissing breath through teeth for cooling and purification.",
        benefits: &["Body cooling", "Oral health", "Stress reduction", "Mental clarity"],
        categories: &[Pranayama, Therapeutic],
        difficulty: Difficulty::Beginner,
        timings: timings(4.0, 2.0, 6.0, 2.0),
        customizable: true,
        duration_label: "5-10 min",
        warnings: &[],
    },
    Technique {
        id: "three-part-breath",
        name: "Dirga Pranayama (Three-Part Breath)",
        description: "Complete yogic breathing using belly, ribs, and chest for full lung capacity.",
        benefits: &["Complete oxygenation", "Stress relief", "Lung capacity", "Mind-body connection"],
        categories: &[Pranayama, Health],
        difficulty: Difficulty::Beginner,
        timings: timings(6.0, 2.0, 6.0, 2.0),
        customizable: true,
        duration_label: "5-15 min",
        warnings: &[],
    },
    Technique {
        id: "meditation-breath",
        name: "Meditation Breathing",
        description: "Gentle, natural breathing for deep meditation and mindfulness practice.",
        benefits: &["Deep relaxation", "Mindfulness", "Stress reduction", "Mental clarity"],
        categories: &[Meditation, Relaxation],
        difficulty: Difficulty::Beginner,
        timings: timings(4.0, 0.0, 4.0, 0.0),
        customizable: true,
        duration_label: "10-30 min",
        warnings: &[],
    },
    Technique {
        id: "wim-hof-basic",
        name: "Wim Hof Method - Basic",
        description: "Controlled hyperventilation followed by breath retention for improved stress resilience and energy.",
        benefits: &["Stress resilience", "Energy boost", "Immune system support", "Mental clarity"],
        categories: &[Energy],
        difficulty: Difficulty::Advanced,
        timings: rounds(timings(2.0, 0.0, 1.0, 0.0), 30),
        customizable: false,
        duration_label: "15-20 min",
        warnings: &["Do not practice while driving or in water", "Stop if you feel dizzy"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Phase;
    use std::collections::HashSet;
    use std::time::Duration;

    #[test]
    fn builtin_ids_are_unique_and_patterns_valid() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.all().len(), 18);
        let ids: HashSet<_> = catalog.all().iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 18);
        for technique in catalog.all() {
            technique.pattern(None).unwrap();
        }
    }

    #[test]
    fn rounds_drive_default_cycles() {
        let catalog = Catalog::builtin();
        let wim_hof = catalog.require("wim-hof-basic").unwrap();
        let pattern = wim_hof.pattern(None).unwrap();
        assert_eq!(pattern.total_cycles(), 30);
        assert!(pattern.duration_of(Phase::HoldAfterInhale).is_zero());

        let box_breathing = catalog.require("box-breathing").unwrap();
        assert_eq!(box_breathing.pattern(None).unwrap().total_cycles(), DEFAULT_CYCLES);
        assert_eq!(box_breathing.pattern(Some(12)).unwrap().total_cycles(), 12);
    }

    #[test]
    fn overrides_respect_customizable_flag() {
        let catalog = Catalog::builtin();
        let overrides = TimingOverrides {
            exhale: Some(6.0),
            ..TimingOverrides::default()
        };

        let custom = catalog
            .require("box-breathing")
            .unwrap()
            .customized_pattern(None, overrides)
            .unwrap();
        assert_eq!(custom.duration_of(Phase::Exhale), Duration::from_secs(6));
        assert_eq!(custom.duration_of(Phase::Inhale), Duration::from_secs(4));

        let err = catalog
            .require("energizing-breath")
            .unwrap()
            .customized_pattern(None, overrides)
            .unwrap_err();
        assert_eq!(err, CatalogError::NotCustomizable("energizing-breath"));
    }

    #[test]
    fn filters_combine() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.filter(&LibraryFilter::default()).len(), 18);

        let sleep = catalog.filter(&LibraryFilter {
            category: Some(Category::Sleep),
            ..LibraryFilter::default()
        });
        assert_eq!(sleep.len(), 1);
        assert_eq!(sleep[0].id, "4-7-8-breathing");

        let advanced_energy = catalog.filter(&LibraryFilter {
            category: Some(Category::Energy),
            difficulty: Some(Difficulty::Advanced),
            ..LibraryFilter::default()
        });
        let ids: Vec<_> = advanced_energy.iter().map(|t| t.id).collect();
        assert_eq!(
            ids,
            vec!["energizing-breath", "kapalbhati", "bhastrika", "wim-hof-basic"]
        );

        let search = catalog.filter(&LibraryFilter {
            search: Some("  COOLING ".into()),
            ..LibraryFilter::default()
        });
        let ids: Vec<_> = search.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["chandra-bhedana", "sheetali", "sheetkari"]);

        assert!(
            catalog
                .filter(&LibraryFilter {
                    search: Some("cooling".into()),
                    difficulty: Some(Difficulty::Expert),
                    ..LibraryFilter::default()
                })
                .is_empty()
        );
    }

    #[test]
    fn parses_classification_case_insensitively() {
        assert_eq!("pranayama".parse::<Category>().unwrap(), Category::Pranayama);
        assert_eq!(" advanced ".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert!("cardio".parse::<Category>().is_err());
    }

    #[test]
    fn by_category_lists_pranayama() {
        assert_eq!(Catalog::builtin().by_category(Category::Pranayama).len(), 11);
    }
}
