//! Console output formatter for consultation reports and lifecycle runs

use agora_domain::{
    AgentRecord, ConsensusBuckets, ConsensusItem, ConsultationReport, Query, RoleAgent,
    RoleStatus, TransitionRecord,
};
use agora_domain::core::string::truncate;
use colored::Colorize;
use std::sync::Arc;

/// Formats reports and records for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete report
    pub fn format(report: &ConsultationReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Consultation Report"));
        output.push('\n');
        output.push_str(&Self::preamble(report));

        // Roles
        output.push_str(&Self::section_header("Roles"));
        for attribution in &report.attributions {
            let result = &attribution.result;
            let label = format!("── {} ({}) ──", attribution.title, result.role);
            if result.is_success() {
                output.push_str(&format!(
                    "\n{}  {}\n{}\n",
                    label.yellow().bold(),
                    format!("confidence {:.2}", result.confidence).dimmed(),
                    attribution.final_position.as_deref().unwrap_or(&result.content)
                ));
            } else {
                output.push_str(&format!(
                    "\n{}  {}\n{}\n",
                    label.red().bold(),
                    result.status.as_str().red(),
                    attribution.annotation.as_deref().unwrap_or("pending review")
                ));
            }
        }

        // Rounds
        if !report.rounds.is_empty() {
            output.push_str(&Self::section_header("Synthesis Rounds"));
            for round in &report.rounds {
                let refined = round.contributions.iter().filter(|c| c.is_success()).count();
                output.push_str(&format!(
                    "  Round {}: {}/{} roles refined",
                    round.round,
                    refined,
                    round.contributions.len()
                ));
                let failed: Vec<String> = round
                    .contributions
                    .iter()
                    .filter_map(|c| c.failure.as_ref().map(|f| format!("{} ({})", c.role, f)))
                    .collect();
                if !failed.is_empty() {
                    output.push_str(&format!("; dropped {}", failed.join(", ")));
                }
                output.push('\n');
                for contribution in &round.contributions {
                    if let Some(critique) = &contribution.critique {
                        let preview = truncate(&critique.replace('\n', " "), 100);
                        output.push_str(&format!(
                            "    {} {}\n",
                            format!("{}:", contribution.role).dimmed(),
                            preview
                        ));
                    }
                }
            }
        }

        output.push_str(&Self::section_header("Consensus"));
        output.push_str(&Self::format_buckets(&report.consensus));

        output.push_str(&Self::section_header("Synthesis"));
        if let Some(moderator) = &report.moderator {
            output.push_str(&format!("{}\n", format!("Moderator: {}", moderator).yellow().bold()));
        }
        output.push_str(&format!("\n{}\n", report.narrative));

        output.push_str(&Self::footer());
        output
    }

    /// Format consensus and narrative only (concise output)
    pub fn format_summary(report: &ConsultationReport) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n\n", "=== Consultation Summary ===".cyan().bold()));
        output.push_str(&Self::preamble(report));
        output.push_str(&Self::format_buckets(&report.consensus));
        output.push('\n');
        output.push_str(&report.narrative);
        output.push('\n');

        output
    }

    /// Format as JSON
    pub fn format_json(report: &ConsultationReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the role list, with relevance scores when a query is given
    pub fn format_roles(roles: &[Arc<RoleAgent>], query: Option<&Query>) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Available roles:".cyan().bold()));

        for role in roles {
            let score = query
                .map(|q| format!("  score {:.2}", role.can_handle(q)))
                .unwrap_or_default();
            output.push_str(&format!(
                "  {:<12} {}{}\n",
                role.id.as_str().bold(),
                role.title,
                score.dimmed()
            ));
            if !role.capabilities.is_empty() {
                output.push_str(&format!(
                    "  {:<12} {}\n",
                    "",
                    role.capabilities.join(", ").dimmed()
                ));
            }
        }

        output
    }

    /// One line per committed transition
    pub fn format_transition(record: &TransitionRecord) -> String {
        let target = if record.to == record.requested {
            record.to.as_str().green().to_string()
        } else {
            format!(
                "{} {}",
                record.to.as_str().yellow(),
                format!("(requested {})", record.requested).dimmed()
            )
        };
        let mut line = format!(
            "  {:<12} -> {}  energy {:.2} -> {:.2}",
            record.from.as_str(),
            target,
            record.energy_before,
            record.energy_after
        );
        if !record.overrides.is_empty() {
            let names: Vec<&str> = record.overrides.iter().map(|o| o.as_str()).collect();
            line.push_str(&format!("  [{}]", names.join(", ").yellow()));
        }
        line
    }

    /// Summary of an agent record
    pub fn format_agent(record: &AgentRecord) -> String {
        format!(
            "{} {} ({})  state {}  energy {:.2}  fracture {:.2}",
            "Agent".cyan().bold(),
            record.id,
            record.agent_type,
            record.state.as_str().bold(),
            record.energy(),
            record.fracture()
        )
    }

    fn preamble(report: &ConsultationReport) -> String {
        let status = match report.degraded_reason {
            Some(reason) => format!("degraded ({})", reason).yellow().to_string(),
            None => "complete".green().to_string(),
        };
        format!(
            "{} {}\n{} {}  {} {}  {} {}/{} roles, {} round(s)\n\n",
            "Query:".cyan().bold(),
            report.query,
            "Session:".cyan().bold(),
            report.session_id,
            "Status:".cyan().bold(),
            status,
            "Participation:".cyan().bold(),
            report.count(RoleStatus::Success),
            report.attributions.len(),
            report.rounds_completed
        )
    }

    fn format_buckets(buckets: &ConsensusBuckets) -> String {
        if buckets.is_empty() {
            return format!("{}\n", "No positions to compare.".dimmed());
        }

        let mut output = String::new();
        let sections = [
            ("Unanimous", &buckets.unanimous),
            ("Majority", &buckets.majority),
            ("Dissent", &buckets.dissent),
            ("Open", &buckets.open),
        ];
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            let heading = match title {
                "Unanimous" | "Majority" => title.green().bold(),
                "Dissent" => title.yellow().bold(),
                _ => title.normal().bold(),
            };
            output.push_str(&format!("{}\n", heading));
            for item in items {
                output.push_str(&Self::format_item(item));
            }
        }
        output
    }

    fn format_item(item: &ConsensusItem) -> String {
        let who: Vec<&str> = item.supporters.iter().map(|r| r.as_str()).collect();
        let who = format!("[{}]", who.join(", "));
        if item.topic == item.stance {
            format!("  * {} {}\n", item.stance, who.dimmed())
        } else {
            format!("  * {}: {} {}\n", item.topic.bold(), item.stance, who.dimmed())
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
