//! Prompt text for category suggestion.

use spendtag_core::Label;

const FEW_SHOT: &[(&str, &str, Label)] = &[
    ("Weekly shop", "milk, eggs, bread", Label::Grocery),
    ("Uber to airport", "", Label::Transit),
    ("Cinema night", "two tickets", Label::Entertainment),
    ("Electricity bill", "March", Label::Utilities),
    ("Textbook", "semester 2", Label::Education),
    ("Birthday gift", "", Label::Misc),
];

/// System instruction: the exact label set plus a few worked examples.
pub fn system_prompt() -> String {
    let labels: Vec<&str> = Label::ALL.iter().map(Label::as_str).collect();

    let mut prompt = format!(
        "You categorise personal expenses.\n\
         Reply with exactly one category from this list and nothing else: {}.\n\
         If nothing fits, reply \"misc\".\n\nExamples:\n",
        labels.join(", ")
    );
    for (title, notes, label) in FEW_SHOT {
        prompt.push_str(&format!(
            "Title: \"{title}\" Notes: \"{notes}\" -> {}\n",
            label.as_str()
        ));
    }
    prompt
}

/// User message carrying the expense fields.
pub fn user_prompt(title: &str, notes: &str) -> String {
    format!(
        "Title: \"{}\" Notes: \"{}\" ->",
        clean_field(title),
        clean_field(notes)
    )
}

/// Flatten newlines and escape double quotes so a field cannot break out of
/// its quoted slot in the prompt.
fn clean_field(raw: &str) -> String {
    raw.replace(['\r', '\n'], " ")
        .trim()
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_lists_every_label() {
        let prompt = system_prompt();
        for label in Label::ALL {
            assert!(prompt.contains(label.as_str()), "missing {label}");
        }
        assert!(prompt.contains("electronics, grocery, treat"));
        assert!(prompt.contains("-> transit"));
    }

    #[test]
    fn user_prompt_flattens_and_escapes() {
        let prompt = user_prompt("  Coffee\nbeans ", "said \"thanks\"\r\n");
        assert_eq!(
            prompt,
            r#"Title: "Coffee beans" Notes: "said \"thanks\"" ->"#
        );
    }

    #[test]
    fn empty_fields() {
        assert_eq!(user_prompt("", ""), r#"Title: "" Notes: "" ->"#);
    }
}
