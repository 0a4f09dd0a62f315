//! Scripted meeting scenarios.
//!
//! Each scenario is a fixed composition of orchestration primitives with
//! its own transcript destination. Scenarios are code, not data; there is
//! no scenario engine.

use crate::error::MeetingError;
use crate::meeting::{
    DEFAULT_MAX_RESPONSES, DEFAULT_TRANSCRIPT_PATH, MeetingEvent, MeetingSession,
};

/// The numbered meeting scenarios selectable from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// The standard quarterly strategy meeting.
    QuarterlyStrategy,
    /// Innovation priorities and build-vs-buy-vs-partner.
    InnovationSummit,
    /// Go-to-market strategy for new regions.
    MarketExpansion,
    /// Cutting operational cost without hurting revenue.
    CostOptimization,
    /// Incident response to a critical product vulnerability.
    CrisisResponse,
    /// A focused CEO-vs-CFO debate on growth versus profitability.
    ExecutiveDebate,
}

impl Scenario {
    /// Resolve a scenario from its CLI number.
    pub fn from_number(n: u32) -> Result<Self, MeetingError> {
        match n {
            1 => Ok(Self::QuarterlyStrategy),
            2 => Ok(Self::InnovationSummit),
            3 => Ok(Self::MarketExpansion),
            4 => Ok(Self::CostOptimization),
            5 => Ok(Self::CrisisResponse),
            6 => Ok(Self::ExecutiveDebate),
            _ => Err(MeetingError::UnknownScenario(n.to_string())),
        }
    }

    pub fn number(&self) -> u32 {
        match self {
            Self::QuarterlyStrategy => 1,
            Self::InnovationSummit => 2,
            Self::MarketExpansion => 3,
            Self::CostOptimization => 4,
            Self::CrisisResponse => 5,
            Self::ExecutiveDebate => 6,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::QuarterlyStrategy => "Standard Quarterly Strategy Meeting",
            Self::InnovationSummit => "Innovation & Digital Transformation Summit",
            Self::MarketExpansion => "Market Expansion & Go-to-Market Strategy",
            Self::CostOptimization => "Cost Optimization & Operational Efficiency",
            Self::CrisisResponse => "Crisis Response & Business Continuity",
            Self::ExecutiveDebate => "Growth vs. Profitability Debate",
        }
    }

    /// Where this scenario writes its transcript.
    pub fn transcript_path(&self) -> &'static str {
        match self {
            Self::QuarterlyStrategy => DEFAULT_TRANSCRIPT_PATH,
            Self::InnovationSummit => "innovation_meeting.txt",
            Self::MarketExpansion => "expansion_meeting.txt",
            Self::CostOptimization => "cost_optimization_meeting.txt",
            Self::CrisisResponse => "crisis_response_meeting.txt",
            Self::ExecutiveDebate => "growth_vs_profitability_debate.txt",
        }
    }

    /// Run the scripted agenda against the given session. Generation
    /// failures abort the run; the transcript written so far is dropped
    /// with the session.
    pub async fn run(&self, meeting: &mut MeetingSession) -> Result<(), MeetingError> {
        match self {
            // Saves its own transcript and concludes the meeting
            Self::QuarterlyStrategy => return meeting.run_full_meeting().await,

            Self::InnovationSummit => {
                meeting.open_meeting().await?;
                meeting
                    .round_table_discussion(
                        "What should be our innovation priorities for the next 12 months? \
                         AI/ML, blockchain, IoT, or something else?",
                    )
                    .await?;
                meeting
                    .facilitate_debate(
                        "Should we build AI capabilities in-house, acquire a specialized \
                         AI company, or partner with AI providers?",
                        "cto",
                        "cfo",
                    )
                    .await?;
                meeting
                    .discuss_topic(
                        "How much should we allocate from our budget to innovation \
                         initiatives versus core operations?",
                        "ceo",
                        DEFAULT_MAX_RESPONSES,
                    )
                    .await?;
                meeting.closing_remarks().await?;
            }

            Self::MarketExpansion => {
                meeting.open_meeting().await?;
                meeting
                    .discuss_topic(
                        "We're considering expansion into Asian markets. What are the \
                         key considerations?",
                        "ceo",
                        DEFAULT_MAX_RESPONSES,
                    )
                    .await?;
                meeting
                    .facilitate_debate(
                        "Should we expand through organic growth (new offices) or \
                         acquisitions (buying local companies)?",
                        "marketing",
                        "cfo",
                    )
                    .await?;
                meeting
                    .round_table_discussion(
                        "What are the biggest operational challenges in executing a \
                         multi-market strategy?",
                    )
                    .await?;
                meeting.closing_remarks().await?;
            }

            Self::CostOptimization => {
                meeting.open_meeting().await?;
                meeting
                    .discuss_topic(
                        "We need to reduce operational costs by 15% without impacting \
                         revenue. How?",
                        "cfo",
                        DEFAULT_MAX_RESPONSES,
                    )
                    .await?;
                meeting
                    .facilitate_debate(
                        "Should we prioritize cost reduction or strategic investments \
                         in technology and talent?",
                        "cfo",
                        "cto",
                    )
                    .await?;
                meeting
                    .discuss_topic(
                        "What are the operational levers we can pull to achieve \
                         efficiency gains?",
                        "coo",
                        DEFAULT_MAX_RESPONSES,
                    )
                    .await?;
                meeting.closing_remarks().await?;
            }

            Self::CrisisResponse => {
                // No formal opening: the chair goes straight to the incident
                meeting
                    .discuss_topic(
                        "Our main product has a critical security vulnerability \
                         discovered. How do we respond to protect customers and \
                         the company?",
                        "ceo",
                        0,
                    )
                    .await?;
                meeting
                    .round_table_discussion(
                        "What are the immediate actions we need to take in the first \
                         24 hours?",
                    )
                    .await?;
                meeting
                    .discuss_topic(
                        "What's the technical solution and timeline to fix this \
                         vulnerability?",
                        "cto",
                        DEFAULT_MAX_RESPONSES,
                    )
                    .await?;
                meeting
                    .discuss_topic(
                        "How do we communicate with customers and stakeholders about \
                         this issue?",
                        "marketing",
                        DEFAULT_MAX_RESPONSES,
                    )
                    .await?;
                meeting.closing_remarks().await?;
            }

            Self::ExecutiveDebate => {
                meeting
                    .facilitate_debate(
                        "Should we prioritize rapid growth with near-term losses or \
                         slower growth with profitability?",
                        "ceo",
                        "cfo",
                    )
                    .await?;
                meeting
                    .discuss_topic(
                        "What's the operational impact of each strategy on our team \
                         and systems?",
                        "coo",
                        DEFAULT_MAX_RESPONSES,
                    )
                    .await?;
            }
        }

        meeting.save_transcript(self.transcript_path())?;
        meeting.emit(MeetingEvent::MeetingEnd);
        Ok(())
    }
}

/// All scenarios in menu order.
pub fn available_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::QuarterlyStrategy,
        Scenario::InnovationSummit,
        Scenario::MarketExpansion,
        Scenario::CostOptimization,
        Scenario::CrisisResponse,
        Scenario::ExecutiveDebate,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_trip() {
        for scenario in available_scenarios() {
            assert_eq!(Scenario::from_number(scenario.number()).unwrap(), scenario);
        }
    }

    #[test]
    fn unknown_numbers_are_rejected() {
        assert!(matches!(
            Scenario::from_number(0),
            Err(MeetingError::UnknownScenario(_))
        ));
        assert!(matches!(
            Scenario::from_number(7),
            Err(MeetingError::UnknownScenario(_))
        ));
    }

    #[test]
    fn transcript_destinations_are_distinct() {
        let scenarios = available_scenarios();
        for a in &scenarios {
            for b in &scenarios {
                if a != b {
                    assert_ne!(a.transcript_path(), b.transcript_path());
                }
            }
        }
    }

    #[test]
    fn standard_meeting_uses_the_default_destination() {
        assert_eq!(
            Scenario::QuarterlyStrategy.transcript_path(),
            DEFAULT_TRANSCRIPT_PATH
        );
    }
}
