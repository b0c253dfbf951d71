//! The bounded research → filter → critique loop.
//!
//! ```text
//! PendingResearch ─► Researched ─► Filtered ─► Critiquing ─┬─► Approved
//!        ▲                                                  │
//!        └──────────── (rejections <= max) ◄── Rejected ◄──┘
//!                                                  │
//!                           (rejections > max) ────┴─► MaxIterExceeded
//! ```
//!
//! Only the most recent rejection feedback is attached to the next research
//! attempt, unmodified.

use async_trait::async_trait;
use serde::Serialize;
use starter_common::{CritiqueVerdict, Feedback, Result, StarterError};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CritiqueState {
    PendingResearch,
    Researched,
    Filtered,
    Critiquing,
    Approved,
    Rejected,
    MaxIterExceeded,
}

impl CritiqueState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CritiqueState::Approved | CritiqueState::MaxIterExceeded)
    }

    pub fn can_transition_to(self, next: CritiqueState) -> bool {
        use CritiqueState::*;
        matches!(
            (self, next),
            (PendingResearch, Researched)
                | (Researched, Filtered)
                | (Filtered, Critiquing)
                | (Critiquing, Approved)
                | (Critiquing, Rejected)
                | (Rejected, PendingResearch)
                | (Rejected, MaxIterExceeded)
        )
    }
}

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CritiqueStatus {
    Approved,
    /// Rejections ran out; the last filtered result is used anyway.
    Exhausted,
}

/// One critic answer: the raw text and its parsed verdict.
#[derive(Debug, Clone)]
pub struct Critique {
    pub text: String,
    pub verdict: CritiqueVerdict,
}

/// The three steps the loop drives. The coordinator implements this with
/// real agents; tests implement it with scripted answers.
#[async_trait]
pub trait CycleSteps: Send {
    async fn research(&mut self, attempt: u32, feedback: Option<&Feedback>) -> Result<String>;

    async fn filter(&mut self, attempt: u32, research: &str) -> Result<String>;

    async fn critique(&mut self, attempt: u32, filtered: &str) -> Result<Critique>;
}

#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub status: CritiqueStatus,
    /// Research executions, initial attempt included.
    pub attempts: u32,
    pub research: String,
    pub filtered: String,
    /// Raw text of the last critique.
    pub critique: String,
    /// Every rejection, in order.
    pub feedback: Vec<Feedback>,
    pub transitions: Vec<CritiqueState>,
}

/// State machine over one critique cycle.
#[derive(Debug)]
pub struct CritiqueLoop {
    max_iterations: u32,
    state: CritiqueState,
    rejections: u32,
    history: Vec<CritiqueState>,
}

impl CritiqueLoop {
    /// `max_iterations` bounds the re-delegations: research runs at most
    /// `max_iterations + 1` times.
    pub fn new(max_iterations: u32) -> Self {
        Self {
            max_iterations,
            state: CritiqueState::PendingResearch,
            rejections: 0,
            history: vec![CritiqueState::PendingResearch],
        }
    }

    pub fn state(&self) -> CritiqueState {
        self.state
    }

    pub fn history(&self) -> &[CritiqueState] {
        &self.history
    }

    fn advance(&mut self, next: CritiqueState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(StarterError::Critique(format!(
                "invalid critique transition {:?} -> {:?}",
                self.state, next
            )));
        }
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    pub async fn run(mut self, steps: &mut dyn CycleSteps) -> Result<CycleOutcome> {
        let mut attempt = 1;
        let mut latest: Option<Feedback> = None;
        let mut feedback = Vec::new();

        loop {
            info!(attempt, max_iterations = self.max_iterations, "Critique cycle attempt");

            let research = steps.research(attempt, latest.as_ref()).await?;
            self.advance(CritiqueState::Researched)?;

            let filtered = steps.filter(attempt, &research).await?;
            self.advance(CritiqueState::Filtered)?;

            self.advance(CritiqueState::Critiquing)?;
            let critique = steps.critique(attempt, &filtered).await?;

            match critique.verdict {
                CritiqueVerdict::Approved { .. } => {
                    self.advance(CritiqueState::Approved)?;
                    info!(attempt, "Critique approved research");
                    return Ok(self.finish(
                        CritiqueStatus::Approved,
                        attempt,
                        research,
                        filtered,
                        critique.text,
                        feedback,
                    ));
                }
                CritiqueVerdict::Rejected { feedback: rejection } => {
                    self.advance(CritiqueState::Rejected)?;
                    self.rejections += 1;
                    info!(
                        attempt,
                        iteration = self.rejections,
                        feedback_len = rejection.as_str().len(),
                        "Critique rejected research"
                    );
                    feedback.push(rejection.clone());

                    if self.rejections > self.max_iterations {
                        self.advance(CritiqueState::MaxIterExceeded)?;
                        warn!(
                            attempts = attempt,
                            max_iterations = self.max_iterations,
                            "Critique iterations exhausted; continuing with last filtered research"
                        );
                        return Ok(self.finish(
                            CritiqueStatus::Exhausted,
                            attempt,
                            research,
                            filtered,
                            critique.text,
                            feedback,
                        ));
                    }

                    self.advance(CritiqueState::PendingResearch)?;
                    latest = Some(rejection);
                    attempt += 1;
                }
            }
        }
    }

    fn finish(
        self,
        status: CritiqueStatus,
        attempts: u32,
        research: String,
        filtered: String,
        critique: String,
        feedback: Vec<Feedback>,
    ) -> CycleOutcome {
        CycleOutcome {
            status,
            attempts,
            research,
            filtered,
            critique,
            feedback,
            transitions: self.history,
        }
    }
}
