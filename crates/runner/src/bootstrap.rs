//! Bootstrap - Classroom configuration and setup
//!
//! Handles initial setup of a classroom game:
//! - Loading and validating the classroom config
//! - Wiring the store, leaderboard and instructor console
//! - Opening the session and seating every student at round 0

use odyssey_clock::SystemClock;
use odyssey_core::{SectionId, Session, StudentId};
use odyssey_market::{CashInjectionConfig, MarketConfig, MarketEngine};
use odyssey_ports::Clock;
use odyssey_session::{
    InMemoryLeaderboard, InMemorySessionStore, InstructorConsole, ReconcilerConfig,
    StudentClient, StudentSettings,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, RunnerError};
use crate::strategy::StrategyKind;

/// One simulated student and how they play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: StudentId,
    pub strategy: StrategyKind,
}

impl StudentProfile {
    pub fn new(id: impl Into<StudentId>, strategy: StrategyKind) -> Self {
        Self {
            id: id.into(),
            strategy,
        }
    }
}

/// Classroom configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassroomConfig {
    pub section_id: SectionId,
    pub max_rounds: u32,
    pub students: Vec<StudentProfile>,
    /// Time between instructor advances (ms)
    pub round_interval_ms: u64,
    /// Time between student polls (ms)
    pub poll_interval_ms: u64,
    /// Seed for the whole classroom; entropy when absent
    pub seed: Option<u64>,
    pub cash_injection: CashInjectionConfig,
    pub market: MarketConfig,
    /// Unavailable rounds a student tolerates before going offline
    pub sync_retry_limit: Option<u32>,
}

impl Default for ClassroomConfig {
    fn default() -> Self {
        Self {
            section_id: "ECON-101".to_string(),
            max_rounds: odyssey_core::DEFAULT_MAX_ROUNDS,
            students: vec![
                StudentProfile::new("alice", StrategyKind::BuyAndHold),
                StudentProfile::new("bob", StrategyKind::Rebalancer { every: 4 }),
                StudentProfile::new("carol", StrategyKind::Momentum { top: 2 }),
                StudentProfile::new("dave", StrategyKind::CashHolder),
            ],
            round_interval_ms: 1_000,
            poll_interval_ms: 250,
            seed: None,
            cash_injection: CashInjectionConfig::default(),
            market: MarketConfig::default(),
            sync_retry_limit: None,
        }
    }
}

impl ClassroomConfig {
    /// Load a config file; missing fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == 0 {
            return Err(RunnerError::Config("max_rounds must be at least 1".into()));
        }
        if self.students.is_empty() {
            return Err(RunnerError::Config("no students configured".into()));
        }
        if self.round_interval_ms == 0 || self.poll_interval_ms == 0 {
            return Err(RunnerError::Config("intervals must be positive".into()));
        }

        let mut seen = HashSet::new();
        for student in &self.students {
            if student.id.is_empty() {
                return Err(RunnerError::Config("student id must not be empty".into()));
            }
            if !seen.insert(student.id.as_str()) {
                return Err(RunnerError::Config(format!(
                    "duplicate student '{}'",
                    student.id
                )));
            }
        }
        Ok(())
    }

    pub fn round_interval(&self) -> Duration {
        Duration::from_millis(self.round_interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Settings for the `index`-th student
    fn student_settings(&self, index: usize) -> StudentSettings {
        StudentSettings {
            reconciler: ReconcilerConfig {
                poll_interval: self.poll_interval(),
                sync_retry_limit: self.sync_retry_limit,
                ..Default::default()
            },
            injection: self.cash_injection,
            market: self.market.clone(),
            seed: self.seed.map(|seed| seed.wrapping_add(index as u64 + 1)),
        }
    }
}

/// A student seated in the session
pub struct StudentSeat {
    pub profile: StudentProfile,
    pub client: Arc<StudentClient>,
}

/// Classroom bootstrap - sets up the session and seats the students
pub struct ClassroomBootstrap {
    pub config: ClassroomConfig,
    pub clock: Arc<dyn Clock>,
    pub store: Arc<InMemorySessionStore>,
    pub leaderboard: Arc<InMemoryLeaderboard>,
    pub console: Arc<InstructorConsole>,
    /// Session as created, at round 0
    pub session: Session,
    pub students: Vec<StudentSeat>,
}

impl ClassroomBootstrap {
    /// Create a new bootstrap with default configuration
    pub async fn new() -> Result<Self> {
        Self::with_config(ClassroomConfig::default()).await
    }

    /// Create bootstrap with custom configuration
    pub async fn with_config(config: ClassroomConfig) -> Result<Self> {
        config.validate()?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let store = Arc::new(InMemorySessionStore::new(clock.clone()));
        let leaderboard = Arc::new(InMemoryLeaderboard::new());

        let mut console = InstructorConsole::new(
            store.clone(),
            leaderboard.clone(),
            clock.clone(),
            MarketEngine::new(config.market.clone()),
        );
        if let Some(seed) = config.seed {
            console = console.with_seed(seed);
        }

        let session = console
            .create_session(config.section_id.clone(), config.max_rounds)
            .await?;

        let mut students = Vec::with_capacity(config.students.len());
        for (index, profile) in config.students.iter().enumerate() {
            let client = StudentClient::join(
                store.clone(),
                clock.clone(),
                session.id,
                profile.id.clone(),
                config.student_settings(index),
            )
            .await?
            .with_leaderboard(leaderboard.clone());

            log::info!(
                "Seated student '{}' ({:?}) in session {}",
                profile.id,
                profile.strategy,
                session.id
            );
            students.push(StudentSeat {
                profile: profile.clone(),
                client: Arc::new(client),
            });
        }

        Ok(Self {
            config,
            clock,
            store,
            leaderboard,
            console: Arc::new(console),
            session,
            students,
        })
    }

    /// Get a seated student by ID
    pub fn get_student(&self, student_id: &str) -> Option<&StudentSeat> {
        self.students.iter().find(|s| s.profile.id == student_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odyssey_core::SessionStatus;
    use odyssey_ports::SessionStore;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClassroomConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.students.len(), 4);
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ClassroomConfig = serde_json::from_str(
            r#"{
                "max_rounds": 5,
                "seed": 9,
                "students": [{"id": "zoe", "strategy": {"type": "cash_holder"}}],
                "cash_injection": {"variability": 0.0}
            }"#,
        )
        .unwrap();

        assert_eq!(config.max_rounds, 5);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.section_id, "ECON-101");
        assert_eq!(config.students[0].strategy, StrategyKind::CashHolder);
        assert_eq!(config.cash_injection.base, CashInjectionConfig::default().base);
        assert_eq!(config.cash_injection.variability, 0.0);
    }

    #[test]
    fn test_rejects_duplicate_students() {
        let config = ClassroomConfig {
            students: vec![
                StudentProfile::new("amy", StrategyKind::BuyAndHold),
                StudentProfile::new("amy", StrategyKind::CashHolder),
            ],
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, RunnerError::Config(msg) if msg.contains("amy")));
    }

    #[test]
    fn test_rejects_zero_rounds() {
        let config = ClassroomConfig {
            max_rounds: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(RunnerError::Config(_))));
    }

    #[test]
    fn test_student_seeds_differ() {
        let config = ClassroomConfig {
            seed: Some(100),
            ..Default::default()
        };
        assert_eq!(config.student_settings(0).seed, Some(101));
        assert_eq!(config.student_settings(3).seed, Some(104));
        assert_eq!(ClassroomConfig::default().student_settings(0).seed, None);
    }

    #[tokio::test]
    async fn test_bootstrap_seats_students() {
        let bootstrap = ClassroomBootstrap::with_config(ClassroomConfig {
            seed: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();

        assert_eq!(bootstrap.session.status, SessionStatus::Created);
        assert_eq!(bootstrap.students.len(), 4);
        assert!(bootstrap.get_student("carol").is_some());
        assert!(bootstrap.get_student("mallory").is_none());

        let participants = bootstrap
            .store
            .list_participants(bootstrap.session.id)
            .await
            .unwrap();
        assert_eq!(participants.len(), 4);
        assert!(participants.iter().all(|p| p.portfolio_value == 10_000.0));
    }
}
