//! Task prompt assembly shared by every role.

use starter_common::{AgentMessage, AgentRole, Result, StarterError, Target, Task};
use starter_llm::{LlmClient, LlmRequest};
use tracing::debug;

/// Heading that introduces critic feedback in a research retry.
pub const FEEDBACK_HEADING: &str = "## Feedback from the previous review";

/// Identity hints for the target, or `None` when neither hint is set.
///
/// `strict` adds the instruction the evidence filter needs: facts that do
/// not match the hints are removed, not just deprioritized.
pub fn disambiguation_note(target: &Target, strict: bool) -> Option<String> {
    let identity = match (target.name.as_deref(), target.current_work.as_deref()) {
        (Some(name), Some(work)) => format!(
            "The person's name is {name} and they currently work as/at {work}. Only use \
             information that clearly refers to this person."
        ),
        (Some(name), None) => format!(
            "The person's name is {name}. Only use information that clearly refers to this \
             person; others may share the name."
        ),
        (None, Some(work)) => format!(
            "The person currently works as/at {work}. Only use information that matches this \
             role or company."
        ),
        (None, None) => return None,
    };

    if strict {
        Some(format!(
            "{identity} Remove any fact that matches neither the profile nor these details."
        ))
    } else {
        Some(identity)
    }
}

/// Render the user prompt for one task execution.
pub fn render_task(task: &Task, strict_identity: bool) -> String {
    let mut out = String::new();

    out.push_str(&format!("Target profile: {}\n", task.target.profile_url));
    if let Some(note) = disambiguation_note(&task.target, strict_identity) {
        out.push_str(&note);
        out.push('\n');
    }

    out.push_str("\n## Task\n");
    out.push_str(task.description.trim());
    out.push_str("\n\n## Expected output\n");
    out.push_str(task.expected_output.trim());
    out.push('\n');

    for upstream in &task.upstream {
        out.push_str(&format!(
            "\n## Result of `{}`\n{}\n",
            upstream.task_id,
            upstream.content.trim_end()
        ));
    }

    if let Some(feedback) = &task.feedback {
        out.push_str(&format!(
            "\n{FEEDBACK_HEADING}\nYour previous research was rejected. Address every point \
             below in this attempt.\n\n{}\n",
            feedback.as_str()
        ));
    }

    out
}

/// Send one prompt through the role's model and wrap the answer.
///
/// An empty answer is an error: downstream tasks cannot work with it.
pub async fn ask(
    llm: &dyn LlmClient,
    role: &AgentRole,
    task: &Task,
    prompt: String,
) -> Result<String> {
    debug!(
        agent = %role.id,
        task_id = %task.id,
        model = %llm.model_name(),
        prompt_len = prompt.len(),
        "Sending task prompt"
    );

    let response = llm
        .complete(LlmRequest::single_turn(role.system_prompt(), prompt))
        .await?;

    if response.content.trim().is_empty() {
        return Err(StarterError::Agent(format!(
            "{} returned an empty answer for {}",
            role.title, task.id
        )));
    }
    Ok(response.content)
}

pub fn reply(role: &AgentRole, task: &Task, content: impl Into<String>) -> AgentMessage {
    AgentMessage::from_agent(role.id.clone(), content).for_task(task.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use starter_common::{Feedback, TaskSpec};

    fn target(name: Option<&str>, work: Option<&str>) -> Target {
        Target::new("https://example.com/in/jdoe")
            .with_name(name)
            .with_current_work(work)
    }

    #[test]
    fn no_hints_no_note() {
        assert!(disambiguation_note(&target(None, None), false).is_none());
        assert!(disambiguation_note(&target(None, None), true).is_none());
    }

    #[test]
    fn note_variants() {
        let both = disambiguation_note(&target(Some("Jane Doe"), Some("Acme")), false).unwrap();
        assert!(both.contains("Jane Doe") && both.contains("Acme"));

        let name_only = disambiguation_note(&target(Some("Jane Doe"), None), false).unwrap();
        assert!(name_only.contains("Jane Doe"));
        assert!(!name_only.contains("works as/at"));

        let work_only = disambiguation_note(&target(None, Some("Acme")), false).unwrap();
        assert!(work_only.contains("Acme"));
        assert!(!work_only.contains("name is"));
    }

    #[test]
    fn strict_note_asks_for_removal() {
        let note = disambiguation_note(&target(Some("Jane Doe"), None), true).unwrap();
        assert!(note.contains("Remove any fact"));
    }

    #[test]
    fn render_includes_upstream_and_feedback() {
        let spec = TaskSpec::new("critique", "review_critique")
            .with_description("Judge it.")
            .with_expected_output("A verdict.");
        let feedback = Feedback::new("Cite the 2023 keynote.\nDrop the funding numbers.").unwrap();
        let task = Task::from_spec(&spec, target(None, None))
            .with_upstream("evidence_filter", "filtered text")
            .with_feedback(feedback);

        let prompt = render_task(&task, false);
        assert!(prompt.contains("Target profile: https://example.com/in/jdoe"));
        assert!(prompt.contains("## Task\nJudge it."));
        assert!(prompt.contains("## Result of `evidence_filter`\nfiltered text"));
        assert!(prompt.contains(FEEDBACK_HEADING));
        assert!(prompt.contains("Cite the 2023 keynote.\nDrop the funding numbers."));
    }

    #[test]
    fn first_attempt_has_no_feedback_section() {
        let spec = TaskSpec::new("research", "web_researcher");
        let task = Task::from_spec(&spec, target(Some("Jane"), None));
        assert!(!render_task(&task, false).contains(FEEDBACK_HEADING));
    }
}
