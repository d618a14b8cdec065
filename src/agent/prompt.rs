const CITATION_INSTRUCTION: &str =
    "Use only the following sources and cite them inline as [1], [2], etc.";

const REQUIREMENTS: &str = "Requirements:\n\
- Be factual\n\
- Cite sources using [n]\n\
- Include a 'Sources' section with title and URL\n";

/// Builds the single instruction string sent to the model. Pure function of
/// its inputs.
pub fn compose_prompt(question: &str, context: &str) -> String {
    format!(
        "Answer the question: {}\n\n{}\n\n{}\n\n{}",
        question, CITATION_INSTRUCTION, context, REQUIREMENTS
    )
}
