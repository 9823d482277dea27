//! Prompt template for retrieval-augmented answers

/// Literal marker the model is instructed to return when the retrieved
/// context does not contain the answer.
pub const NOT_AVAILABLE: &str = "Information not available";

/// Prompt builder for the query service
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the synthesis prompt from the retrieved paragraph and table
    /// texts. The model is told to answer only from the supplied context and
    /// to reply with the not-available marker otherwise.
    pub fn build_search_prompt(query: &str, paragraphs: &[String], tables: &[String]) -> String {
        format!(
            "You are an expert assistant. Carefully use the context documents provided below \
             to answer the user's query. Do not fabricate information. If the answer is not \
             contained in the context, respond with '{marker}'.\n\n\
             Paragraphs:\n{paragraphs}\n\n\
             Tables:\n{tables}\n\n\
             User query:\n{query}\n\n\
             Infer which source (paragraphs or tables) is most relevant and answer clearly \
             and concisely based only on the provided context.",
            marker = NOT_AVAILABLE,
            paragraphs = format_section(paragraphs),
            tables = format_section(tables),
            query = query,
        )
    }
}

fn format_section(texts: &[String]) -> String {
    if texts.is_empty() {
        return "(none)".to_string();
    }
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| format!("[{}] {}", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
