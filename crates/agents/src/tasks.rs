//! The five pipeline task definitions.

use starter_common::TaskSpec;

use crate::roles;

pub const RESEARCH: &str = "research";
pub const CONTEXT_SYNC: &str = "context_sync";
pub const EVIDENCE_FILTER: &str = "evidence_filter";
pub const CRITIQUE: &str = "critique";
pub const OUTPUT: &str = "output";

pub fn research() -> TaskSpec {
    TaskSpec::new(RESEARCH, roles::RESEARCHER)
        .with_description(
            "Produce a summary of this person's career vibe, key achievements, and non-obvious \
             interests. Treat the profile lookup result (headline, experience, education) as the \
             source of truth for job titles, companies, and dates. Use the web search results \
             only to add information (talks, articles, side projects) that clearly refers to this \
             person; do not let web snippets contradict or replace profile facts. If the profile \
             lookup is not configured or unavailable, rely on web search only and say so.\n\n\
             CRITICAL: Only include facts that appear in the tool results. Do not infer, assume, \
             or invent any details (e.g. numbers, titles, achievements). If a claim is not \
             clearly stated in the tool output, omit it. Prefer saying 'not found' over guessing.",
        )
        .with_expected_output(
            "A structured summary: (1) Career vibe in 2-3 sentences, (2) Key achievements \
             (bullets), (3) Non-obvious interests or angles (bullets). For each fact from web \
             search, include the source URL (e.g. 'Source: https://...') so the Evidence Filter \
             can verify the result refers to this person.",
        )
}

pub fn context_sync() -> TaskSpec {
    TaskSpec::new(CONTEXT_SYNC, roles::PERSONAL_CONTEXT)
        .with_description(
            "Read the user's interests file and extract their current focus areas, interests, \
             and expertise. Provide a concise summary that can be used to validate research \
             quality and to craft personalized questions and conversation starters.",
        )
        .with_expected_output(
            "A short summary of: current focus areas, interests list, and expertise. Keep it \
             scannable so the Critique and Question Architect can use it.",
        )
}

pub fn evidence_filter() -> TaskSpec {
    TaskSpec::new(EVIDENCE_FILTER, roles::EVIDENCE_FILTER)
        .with_description(
            "You receive the Web Researcher's summary. Filter out any fact or web search result \
             that does NOT have concrete evidence it refers to this specific person. Keep only: \
             (1) facts from the profile lookup; (2) web results where the source explicitly names \
             the person AND matches their company/role, or the URL clearly identifies them. \
             Remove generic claims, results that could be about another person with the same \
             name, and any fact whose source does not clearly identify the target person. Do not \
             add new information. If in doubt, exclude the fact.",
        )
        .with_expected_output(
            "First a 'Removed' list with one line per removed item and the reason, then the \
             filtered research summary with the same structure (career vibe, key achievements, \
             interests) containing only the facts that passed.",
        )
        .depends_on(RESEARCH)
}

pub fn critique() -> TaskSpec {
    TaskSpec::new(CRITIQUE, roles::CRITIC)
        .with_description(
            "Evaluate the FILTERED research on two dimensions: (1) depth and relevance to the \
             user's interests (personal context); (2) factual grounding: every claim about the \
             person must be explicitly supported by the filtered research. Reject if the research \
             is generic, empty, lacks concrete hooks, or contains unsupported details such as \
             exact figures that are not in the filtered research. Approve only when the filtered \
             summary is both substantive and grounded.",
        )
        .with_expected_output(
            "The first line must be exactly 'VERDICT: APPROVED' or 'VERDICT: REJECTED'. After an \
             approval, add a one-sentence handoff to the Question Architect. After a rejection, \
             add specific, actionable instructions for the Web Researcher; a rejection without \
             instructions is invalid.",
        )
        .depends_on(EVIDENCE_FILTER)
        .depends_on(CONTEXT_SYNC)
}

pub fn output() -> TaskSpec {
    TaskSpec::new(OUTPUT, roles::REPORT_WRITER)
        .with_description(
            "Produce a Markdown report for the user with: (1) a brief recap of the person's \
             career narrative and key points; (2) five Pointed Questions that bridge their \
             background with the user's current state; (3) three Conversation Starters that \
             connect their experience to the user's interests. Base the recap and all questions \
             and starters only on the FILTERED research. Do not add any fact about the person \
             that is not in it. If the research is sparse, keep the recap and questions \
             conservative; prefer generic but accurate openers over specific but unsupported \
             ones. If the person has expertise the user does not yet have, add a 'What I can \
             learn from them' section and, for each genuinely new interest worth recording, add \
             a line of the form 'NEW_INTEREST: <short interest>' at the very end.",
        )
        .with_expected_output(
            "A Markdown report with the sections '## Career Narrative', '## 5 Pointed Questions' \
             (numbered 1-5), '## 3 Conversation Starters' (numbered 1-3) and optionally \
             '## What I Can Learn From Them', followed by zero or more NEW_INTEREST lines.",
        )
        .depends_on(EVIDENCE_FILTER)
        .depends_on(CONTEXT_SYNC)
        .depends_on(CRITIQUE)
}

/// All five specs, in declaration order.
pub fn pipeline_tasks() -> Vec<TaskSpec> {
    vec![
        research(),
        context_sync(),
        evidence_filter(),
        critique(),
        output(),
    ]
}
