//! Prompt construction for research and completion backends.

use crate::models::SummaryRequest;

/// Sections every analysis is asked to cover, in order.
pub const SECTIONS: [&str; 6] = [
    "Summary",
    "Character Analysis",
    "Thematic Exploration",
    "Literary Analysis",
    "Key Quotes",
    "Discussion Points",
];

/// One-line query identifying the book.
pub fn research_query(request: &SummaryRequest) -> String {
    format!(
        "Comprehensive literary analysis of \"{}\" by {} (published {})",
        request.book_name, request.author, request.publication_date
    )
}

/// Full instruction prompt shared by the research backend and the completion fallback.
pub fn research_prompt(request: &SummaryRequest) -> String {
    let mut prompt = format!(
        "Write a comprehensive analysis of the book \"{}\" by {}, published {}.\n\n\
         Organise the analysis under the following headings:\n",
        request.book_name, request.author, request.publication_date
    );

    for (i, section) in SECTIONS.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, section));
    }

    prompt.push_str(
        "\nBase the analysis on the text itself and on established criticism. \
         Quote accurately and say so when a detail is uncertain.",
    );
    prompt
}
