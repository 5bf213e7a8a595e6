//! Stats command for Kalike.
//!
//! Displays the learner's level, answer counters and, in detailed mode, the
//! expertise breakdown. The `level` command is the one-line version.

use serde::Serialize;

use crate::cli::format_score;
use crate::core::LearnerSession;
use crate::stats::{ExpertiseSummary, LevelResult};
use crate::storage::StatsStore;

/// Options for the stats command.
#[derive(Debug, Clone, Default)]
pub struct StatsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Show the expertise breakdown.
    pub detailed: bool,
    /// Only report the level.
    pub level_only: bool,
}

/// Output format for the stats command.
#[derive(Debug, Clone, Serialize)]
pub struct StatsOutput {
    /// Whether stats were computed successfully.
    pub success: bool,
    /// Name of the learner.
    pub learner: String,
    /// Whether the learner is not signed in.
    pub guest: bool,
    pub games_played: u64,
    pub total_answers: u64,
    pub correct_answers: u64,
    /// Lifetime accuracy percentage.
    pub accuracy: u32,
    /// Words with stored guesses.
    pub words_attempted: usize,
    /// Vocabulary size used for coverage.
    pub vocabulary_size: usize,
    pub level: LevelResult,
    /// Expertise breakdown (detailed mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ExpertiseSummary>,
}

/// The stats command implementation.
pub struct StatsCommand<'a, S: StatsStore> {
    session: &'a LearnerSession<S>,
    vocabulary_size: usize,
}

impl<'a, S: StatsStore> StatsCommand<'a, S> {
    /// Create a new stats command.
    pub fn new(session: &'a LearnerSession<S>, vocabulary_size: usize) -> Self {
        Self {
            session,
            vocabulary_size,
        }
    }

    /// Run the stats command.
    pub fn run(&self, options: &StatsOptions) -> StatsOutput {
        let user_stats = self.session.stats();
        let stats = user_stats.stats();

        StatsOutput {
            success: true,
            learner: self.session.principal().display_name().to_string(),
            guest: self.session.principal().is_guest(),
            games_played: stats.games_played,
            total_answers: stats.total_answers,
            correct_answers: stats.correct_answers,
            accuracy: user_stats.accuracy(),
            words_attempted: stats.word_guesses.len(),
            vocabulary_size: self.vocabulary_size,
            level: user_stats.expertise_level(self.vocabulary_size),
            summary: options
                .detailed
                .then(|| user_stats.expertise_summary(self.vocabulary_size)),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StatsOutput, options: &StatsOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            let rendered = if options.level_only {
                serde_json::to_string_pretty(&output.level)
            } else {
                serde_json::to_string_pretty(output)
            };
            rendered.unwrap_or_else(|_| "{}".to_string())
        } else if options.level_only {
            output.level.describe()
        } else {
            Self::format_human_readable(output)
        }
    }

    fn format_human_readable(output: &StatsOutput) -> String {
        let mut lines = Vec::new();
        lines.push(format!("=== Kalike Progress: {} ===", output.learner));
        if output.guest {
            lines.push("(not signed in, stats are kept on this device only)".to_string());
        }
        lines.push(String::new());

        lines.push(format!("Level {}: {}", output.level.level, output.level.describe()));
        lines.push(format!(
            "   Overall expertise: {}",
            format_score(output.level.overall_expertise)
        ));
        lines.push(format!(
            "   Words attempted: {} of {}\n",
            output.words_attempted, output.vocabulary_size
        ));

        lines.push("Answers".to_string());
        lines.push(format!(
            "   Correct: {} | Total: {} | Accuracy: {}%",
            output.correct_answers, output.total_answers, output.accuracy
        ));
        lines.push(format!("   Games played: {}", output.games_played));

        if let Some(summary) = &output.summary {
            lines.push(String::new());
            lines.push("Expertise".to_string());
            lines.push(format!(
                "   Coverage: {} ({})",
                format_score(summary.coverage_ratio),
                summary.coverage_stage.display_name()
            ));
            lines.push(format!(
                "   Average attempted mastery: {}",
                format_score(summary.average_attempted_expertise)
            ));
            let d = &summary.distribution;
            lines.push(format!(
                "   Novice: {} | Learning: {} | Proficient: {} | Expert: {}",
                d.novice, d.learning, d.proficient, d.expert
            ));
        }

        lines.join("\n")
    }
}
