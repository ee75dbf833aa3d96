//! Prompt templates for the consultation flow

/// Response format every role is asked to follow, so positions and
/// confidence can be extracted deterministically.
const RESPONSE_FORMAT: &str = r#"Finish your answer with your positions, one per line, in this exact form:
POSITION [short topic]: your stance in one sentence
Then add a final line:
CONFIDENCE: a number between 0 and 1"#;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// User prompt for the initial dispatch of a role
    pub fn dispatch_prompt(query: &str) -> String {
        format!(
            r#"You are consulted on the following question:

{}

Answer from your own specialty. Be concrete and brief.

{}"#,
            query, RESPONSE_FORMAT
        )
    }

    /// User prompt asking a role to critique its peers' current positions
    pub fn critique_prompt(query: &str, own: &str, peers: &[(String, String)]) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Your current position:
{}

Positions of the other consultants:
"#,
            query, own
        );

        for (role, content) in peers {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", role, content));
        }

        prompt.push_str(
            r#"
Critique these positions from your specialty. Name concrete weaknesses,
points you agree with, and anything that should change your own view.
Do not restate your own position yet."#,
        );

        prompt
    }

    /// User prompt asking a role to refine its position after critiquing
    pub fn refine_prompt(query: &str, own: &str, critique: &str) -> String {
        format!(
            r#"Original question: {}

Your previous position:
{}

Your critique of the other consultants:
{}

Give your refined position. Keep what still holds, adopt better ideas
from others where you agreed with them, and keep topic names consistent
with the discussion so far.

{}"#,
            query, own, critique, RESPONSE_FORMAT
        )
    }

    /// System prompt for the optional moderator narrative
    pub fn moderator_system() -> &'static str {
        r#"You are a moderator summarizing a consultation between specialists.
Report what they agreed on, what the majority favored and which minority
alternatives remain, and what is still open. Do not invent positions."#
    }

    /// User prompt for the moderator narrative
    pub fn moderator_prompt(query: &str, positions: &[(String, String)], buckets: &str) -> String {
        let mut prompt = format!("Original question: {}\n\nFinal positions:\n", query);
        for (role, content) in positions {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", role, content));
        }
        prompt.push_str(&format!(
            "\nComputed consensus:\n{}\n\nWrite a short synthesis narrative for the requester.",
            buckets
        ));
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_prompt_asks_for_positions() {
        let prompt = PromptTemplate::dispatch_prompt("Which queue?");
        assert!(prompt.contains("Which queue?"));
        assert!(prompt.contains("POSITION [short topic]"));
        assert!(prompt.contains("CONFIDENCE"));
    }

    #[test]
    fn test_critique_prompt_lists_peers() {
        let peers = vec![
            ("security".to_string(), "POSITION [auth]: rotate keys".to_string()),
            ("ux".to_string(), "POSITION [auth]: use passkeys".to_string()),
        ];
        let prompt = PromptTemplate::critique_prompt("q", "mine", &peers);
        assert!(prompt.contains("--- security ---"));
        assert!(prompt.contains("use passkeys"));
        assert!(prompt.contains("mine"));
    }

    #[test]
    fn test_refine_prompt_includes_critique() {
        let prompt = PromptTemplate::refine_prompt("q", "old", "too slow");
        assert!(prompt.contains("too slow"));
        assert!(prompt.contains("POSITION [short topic]"));
    }
}
