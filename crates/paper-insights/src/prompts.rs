//! Fixed prompt templates sent to the chat-completion model

/// KPI items the comparison answer must follow, in order
pub const KPI_ITEMS: [&str; 7] = [
    "Domain Similarity (Yes/No + Explanation)",
    "Research Aspect Overlap (Yes/No + What aspects are common)",
    "Innovation Uniqueness Score (1-10 with justification)",
    "Content Similarity Index (0-100% estimation)",
    "Theme Summary (1-2 lines for each paper)",
    "Gap Analysis (What one covers that other doesn't)",
    "Best Use Case for Each Paper (brief description)",
];

/// Prompt asking for the seven-item KPI comparison of two papers.
///
/// Both texts are embedded verbatim.
pub fn kpi_prompt(text1: &str, text2: &str) -> String {
    let items = KPI_ITEMS
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\nCompare these two research papers and answer ONLY in the following KPI format:\n\n\
         {items}\n\n\
         --- Paper 1 ---\n{text1}\n\n\
         --- Paper 2 ---\n{text2}\n"
    )
}

/// Prompt asking for three bullet-point highlights of one paper
pub fn highlights_prompt(text: &str) -> String {
    format!(
        "Give 3 important bullet-point highlights of the following research paper:\n\n{}\n\n",
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kpi_prompt_lists_items_in_order() {
        let prompt = kpi_prompt("alpha", "beta");
        let mut last = 0;
        for (i, item) in KPI_ITEMS.iter().enumerate() {
            let line = format!("{}. {}", i + 1, item);
            let pos = prompt.find(&line).expect("item missing from prompt");
            assert!(pos >= last);
            last = pos;
        }
    }

    #[test]
    fn test_kpi_prompt_embeds_both_papers() {
        let prompt = kpi_prompt("first paper body", "second paper body");
        let p1 = prompt.find("--- Paper 1 ---\nfirst paper body").unwrap();
        let p2 = prompt.find("--- Paper 2 ---\nsecond paper body").unwrap();
        assert!(p1 < p2);
        assert!(prompt.contains("answer ONLY in the following KPI format"));
    }

    #[test]
    fn test_highlights_prompt() {
        assert_eq!(
            highlights_prompt("body"),
            "Give 3 important bullet-point highlights of the following research paper:\n\nbody\n\n"
        );
    }
}
