//! Canned queries and autocomplete terms served to the UI.

pub const MAX_SUGGESTIONS: usize = 10;

pub const SAMPLE_QUERIES: [&str; 20] = [
    "artificial intelligence machine learning",
    "climate change environmental impact",
    "space exploration mars mission",
    "quantum computing algorithms",
    "biotechnology genetic engineering",
    "renewable energy solar power",
    "cybersecurity data protection",
    "blockchain cryptocurrency technology",
    "medical research drug discovery",
    "robotics automation industry",
    "neural networks deep learning",
    "sustainable development goals",
    "satellite communication systems",
    "quantum entanglement physics",
    "CRISPR gene editing technology",
    "wind energy turbine design",
    "network security protocols",
    "digital currency economics",
    "cancer treatment research",
    "autonomous vehicle technology",
];

const SUGGESTION_TERMS: [&str; 30] = [
    "artificial intelligence",
    "machine learning",
    "deep learning",
    "climate change",
    "environmental science",
    "global warming",
    "space exploration",
    "mars mission",
    "astronomy",
    "quantum computing",
    "quantum physics",
    "quantum algorithms",
    "biotechnology",
    "genetic engineering",
    "CRISPR",
    "renewable energy",
    "solar power",
    "wind energy",
    "cybersecurity",
    "data protection",
    "network security",
    "blockchain",
    "cryptocurrency",
    "digital currency",
    "medical research",
    "drug discovery",
    "cancer treatment",
    "robotics",
    "automation",
    "autonomous vehicles",
];

/// Case-insensitive prefix matches for `partial`. Fewer than two characters yields nothing.
pub fn suggestions(partial: &str) -> Vec<&'static str> {
    let needle = partial.trim().to_lowercase();
    if needle.chars().count() < 2 {
        return Vec::new();
    }

    SUGGESTION_TERMS
        .iter()
        .copied()
        .filter(|term| term.to_lowercase().starts_with(&needle))
        .take(MAX_SUGGESTIONS)
        .collect()
}
