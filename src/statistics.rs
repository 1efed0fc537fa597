//! Background diabetes statistics shown alongside the calculator

pub const TITLE: &str = "SaluSite – Diabetes Risk Calculator";

pub const BACKGROUND: &str = "Welcome to Salusite - Diabetes Risk Calculator. \
This application is designed to help assess the risk of diabetes based on various factors.";

/// Headline statistics, in display order
pub const DIABETES_STATISTICS: [(&str, &str); 3] = [
    ("Prevalence", "9.3% of the US population have diabetes"),
    (
        "Type 2 Diabetes",
        "Most common type, comprising 90-95% of all diabetes cases",
    ),
    (
        "Risk Factors",
        "Family history, obesity, sedentary lifestyle, etc.",
    ),
];

/// Render the title and background information block.
pub fn render_background() -> String {
    format!("{}\n\nBackground Information\n{}", TITLE, BACKGROUND)
}

/// Render the statistics as a bulleted list, one line per entry.
pub fn render() -> String {
    DIABETES_STATISTICS
        .iter()
        .map(|(stat, value)| format!("- {}: {}", stat, value))
        .collect::<Vec<_>>()
        .join("\n")
}
