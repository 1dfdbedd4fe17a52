//! Odyssey Runner - Classroom Simulation
//!
//! Plays a whole Investment Odyssey game in one process:
//!
//! - **Bootstrap**: Classroom config, session creation, seating students
//! - **Strategy**: How each simulated student trades
//! - **Agent Runner**: Polls the session and executes a student's strategy
//! - **Simulation**: Full orchestration of the instructor and all agents
//!
//! ## Architecture
//!
//! ```text
//!                      ┌──────────────────────┐
//!                      │  InstructorConsole   │
//!                      │  (round timer)       │
//!                      └──────────┬───────────┘
//!                                 │ advance_round / end_game
//!                                 ▼
//!                      ┌──────────────────────┐      ┌─────────────┐
//!                      │     SessionStore     │      │ Leaderboard │
//!                      │ session, markets,    │      └──────▲──────┘
//!                      │ players              │             │ once per student
//!                      └──────────▲───────────┘─────────────┘
//!                                 │ poll / persist
//! ┌───────────────────────────────┼─────────────────────────────────┐
//! │                        STUDENT AGENTS                            │
//! │                                                                  │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │ Buy & Hold   │   │ Rebalancer   │   │ Momentum ... │         │
//! │  └──────┬───────┘   └──────┬───────┘   └──────┬───────┘         │
//! │         │ actions          │                  │                  │
//! │         └──────────────────┼──────────────────┘                  │
//! │                            ▼                                     │
//! │               StudentClient (trade engine + reconciler)          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod agent;
pub mod bootstrap;
pub mod error;
pub mod simulation;
pub mod strategy;

// Re-export main types
pub use agent::{AgentReport, AgentRunner};
pub use bootstrap::{ClassroomBootstrap, ClassroomConfig, StudentProfile, StudentSeat};
pub use error::{Result, RunnerError};
pub use simulation::{ClassroomSimulation, SimulationResults, run_classroom};
pub use strategy::{
    Action, BuyAndHold, CashHolder, Momentum, Rebalancer, StrategyContext, StrategyKind,
    StudentStrategy,
};
