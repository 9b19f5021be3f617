use scraper::{Html, Selector};

use crate::model::{InstructionStep, RecipeDetail};

impl RecipeDetail {
    /// Steps to show, in order
    ///
    /// Uses the analysed instruction groups when the catalog has them and
    /// otherwise splits the HTML `raw_instructions` into numbered steps.
    pub fn instruction_steps(&self) -> Vec<InstructionStep> {
        if !self.uses_raw_instructions() {
            return self
                .instruction_groups
                .iter()
                .flat_map(|group| group.steps.iter().cloned())
                .collect();
        }

        raw_instruction_lines(&self.raw_instructions)
            .into_iter()
            .zip(1..)
            .map(|(text, number)| InstructionStep { number, text })
            .collect()
    }
}

/// Plain-text lines from an HTML instruction blob
///
/// List items win over paragraphs; with neither, the text is split on line
/// breaks.
pub fn raw_instruction_lines(html: &str) -> Vec<String> {
    if html.trim().is_empty() {
        return Vec::new();
    }

    let fragment = Html::parse_fragment(html);
    for css in ["li", "p"] {
        let lines = select_texts(&fragment, css);
        if !lines.is_empty() {
            return lines;
        }
    }

    fragment
        .root_element()
        .text()
        .collect::<String>()
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect()
}

fn select_texts(fragment: &Html, css: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };
    fragment
        .select(&selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InstructionGroup;

    fn detail(groups: Vec<InstructionGroup>, raw: &str) -> RecipeDetail {
        RecipeDetail {
            id: 42,
            title: "Chili".to_string(),
            image_url: String::new(),
            servings: 4,
            ready_in_minutes: 45,
            ingredients: Vec::new(),
            instruction_groups: groups,
            raw_instructions: raw.to_string(),
        }
    }

    #[test]
    fn test_list_items() {
        let lines = raw_instruction_lines(
            "<ol><li>Brown the   beef.</li><li>Add <b>beans</b> &amp; simmer.</li></ol>",
        );
        assert_eq!(lines, vec!["Brown the beef.", "Add beans & simmer."]);
    }

    #[test]
    fn test_paragraphs() {
        let lines = raw_instruction_lines("<p>Preheat the oven.</p><p></p><p>Bake.</p>");
        assert_eq!(lines, vec!["Preheat the oven.", "Bake."]);
    }

    #[test]
    fn test_plain_text() {
        let lines = raw_instruction_lines("Chop onions.\n\n  Fry them.  ");
        assert_eq!(lines, vec!["Chop onions.", "Fry them."]);
        assert!(raw_instruction_lines("  ").is_empty());
    }

    #[test]
    fn test_analyzed_groups_take_priority() {
        let groups = vec![
            InstructionGroup {
                name: String::new(),
                steps: vec![InstructionStep {
                    number: 1,
                    text: "Brown the beef.".to_string(),
                }],
            },
            InstructionGroup {
                name: "Sauce".to_string(),
                steps: vec![InstructionStep {
                    number: 1,
                    text: "Whisk.".to_string(),
                }],
            },
        ];
        let steps = detail(groups, "<p>ignored</p>").instruction_steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].text, "Whisk.");
    }

    #[test]
    fn test_raw_fallback_is_numbered() {
        let steps = detail(Vec::new(), "<ol><li>One</li><li>Two</li></ol>").instruction_steps();
        assert_eq!(steps[0].number, 1);
        assert_eq!(steps[1].number, 2);
        assert_eq!(steps[1].text, "Two");
    }
}
