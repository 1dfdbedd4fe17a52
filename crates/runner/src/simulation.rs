//! Simulation - Full classroom orchestration
//!
//! Ties together all components:
//! - The instructor loop advancing rounds on a timer
//! - One agent per student, polling and trading
//! - Final leaderboard collection

use log::{error, info, warn};
use odyssey_clock::{IntervalTicker, ScheduledTask};
use odyssey_core::{SessionId, StudentId};
use odyssey_ports::{Leaderboard, LeaderboardEntry};
use odyssey_session::{InstructorConsole, SessionError};
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::agent::{AgentReport, AgentRunner};
use crate::bootstrap::{ClassroomBootstrap, ClassroomConfig};
use crate::error::Result;

/// Polls an agent gets to notice game over once the instructor is done
const GRACE_POLLS: u32 = 4;

/// Simulation results
#[derive(Debug, Clone, Default)]
pub struct SimulationResults {
    pub session_id: Option<SessionId>,
    /// Round the session ended at
    pub rounds_played: u32,
    /// Total trades executed
    pub total_trades: u64,
    /// Trades by student
    pub trades_by_student: HashMap<StudentId, u64>,
    /// Final value each student saw on their game-over screen
    pub final_value_by_student: HashMap<StudentId, f64>,
    /// Students that lost the session and finished locally
    pub offline_students: Vec<StudentId>,
    /// Leaderboard, best first
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Whether the game completed and every student was ranked
    pub success: bool,
    /// Error message if any
    pub error: Option<String>,
}

/// Full classroom simulation
pub struct ClassroomSimulation {
    bootstrap: ClassroomBootstrap,
}

impl ClassroomSimulation {
    /// Create a new simulation with default configuration
    pub async fn new() -> Result<Self> {
        Self::with_config(ClassroomConfig::default()).await
    }

    /// Create a new simulation with custom configuration
    pub async fn with_config(config: ClassroomConfig) -> Result<Self> {
        let bootstrap = ClassroomBootstrap::with_config(config).await?;
        Ok(Self { bootstrap })
    }

    pub fn session_id(&self) -> SessionId {
        self.bootstrap.session.id
    }

    pub fn bootstrap(&self) -> &ClassroomBootstrap {
        &self.bootstrap
    }

    /// Run the instructor loop
    ///
    /// The ticker fires right away; that first tick only opens the floor so
    /// students can trade round 0 before the market moves.
    fn spawn_instructor(
        console: Arc<InstructorConsole>,
        session_id: SessionId,
        ticker: IntervalTicker,
    ) -> ScheduledTask {
        let mut opening_bell = true;
        ScheduledTask::spawn("instructor", ticker, move |_| {
            let console = Arc::clone(&console);
            let opening = std::mem::replace(&mut opening_bell, false);
            async move {
                if opening {
                    return ControlFlow::Continue(());
                }
                match console.advance_round(session_id).await {
                    Ok(session) if session.is_completed() => ControlFlow::Break(()),
                    Ok(_) => ControlFlow::Continue(()),
                    Err(SessionError::Conflict { expected, actual }) => {
                        warn!(
                            "Lost round to another instructor (v{} != v{}), retrying",
                            expected, actual
                        );
                        ControlFlow::Continue(())
                    }
                    Err(SessionError::SyncUnavailable { round }) => {
                        warn!("Round {} is claimed but unpublished, waiting", round);
                        ControlFlow::Continue(())
                    }
                    Err(e) => {
                        error!("Instructor loop stopped: {}", e);
                        ControlFlow::Break(())
                    }
                }
            }
        })
    }

    /// Run the full simulation
    pub async fn run(self) -> SimulationResults {
        let ClassroomBootstrap {
            config,
            clock,
            leaderboard,
            console,
            session,
            students,
            ..
        } = self.bootstrap;

        info!(
            "Starting classroom {} with {} students for {} rounds...",
            config.section_id,
            students.len(),
            config.max_rounds
        );

        let mut results = SimulationResults {
            session_id: Some(session.id),
            ..Default::default()
        };

        // Everyone trades the opening round before the clock starts
        let mut agents = Vec::with_capacity(students.len());
        for seat in students {
            let mut agent = AgentRunner::new(seat.client, seat.profile.strategy.build());
            agent.open().await;
            agents.push(agent);
        }

        let handles: Vec<_> = agents
            .into_iter()
            .map(|agent| {
                let token = agent.token();
                let ticker = IntervalTicker::new(config.poll_interval(), clock.clone());
                (token, tokio::spawn(agent.run(ticker)))
            })
            .collect();

        let instructor = Self::spawn_instructor(
            Arc::clone(&console),
            session.id,
            IntervalTicker::new(config.round_interval(), clock.clone()),
        );
        let ticks = instructor.join().await;
        info!("Instructor finished after {} ticks", ticks);

        let grace = config.poll_interval() * GRACE_POLLS;
        for (token, mut handle) in handles {
            let joined = match tokio::time::timeout(grace, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    token.cancel();
                    handle.await
                }
            };
            match joined {
                Ok(report) => Self::collect(&mut results, report),
                Err(e) => {
                    error!("Agent task failed: {}", e);
                    results.error = Some(e.to_string());
                }
            }
        }

        // Completes the game if the loop died early
        match console.end_game(session.id).await {
            Ok(session) => results.rounds_played = session.current_round,
            Err(e) => {
                error!("Could not close session {}: {}", session.id, e);
                results.error.get_or_insert(e.to_string());
            }
        }

        // Agents record themselves at game over; anyone cut off gets their saved value
        match console.record_missing_results(session.id).await {
            Ok(0) => {}
            Ok(n) => warn!("{} students never reported a final result", n),
            Err(e) => {
                results.error.get_or_insert(e.to_string());
            }
        }

        match leaderboard.entries(session.id).await {
            Ok(entries) => results.leaderboard = entries,
            Err(e) => {
                results.error.get_or_insert(e.to_string());
            }
        }

        results.success =
            results.error.is_none() && results.leaderboard.len() == config.students.len();

        info!(
            "Simulation finished: {} rounds, {} trades, {} ranked",
            results.rounds_played,
            results.total_trades,
            results.leaderboard.len()
        );

        results
    }

    fn collect(results: &mut SimulationResults, report: AgentReport) {
        results.total_trades += report.trades;
        results
            .trades_by_student
            .insert(report.student_id.clone(), report.trades);
        if let Some(summary) = &report.summary {
            results
                .final_value_by_student
                .insert(report.student_id.clone(), summary.portfolio.total_value);
        }
        if report.went_offline {
            results.offline_students.push(report.student_id);
        }
    }
}

/// Shortcut for running a classroom to completion
pub async fn run_classroom(config: ClassroomConfig) -> Result<SimulationResults> {
    let simulation = ClassroomSimulation::with_config(config).await?;
    Ok(simulation.run().await)
}
