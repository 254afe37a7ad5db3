//! UiSelector / UiScrollable expression builders.
//!
//! The Appium UiAutomator2 driver evaluates `-android uiautomator` locators
//! as Java snippets. These helpers build the scroll-into-view snippets used by
//! [`ScrollsTo`](crate::driver::ScrollsTo): each search is two
//! `UiScrollable` statements concatenated, one matching the content
//! description and one matching the text, so the server tries both.
//!
//! Caller text is embedded as a Java string literal with `\` and `"`
//! escaped. Text containing neither character produces the same expression
//! as plain concatenation.

/// Escapes `value` for embedding inside a double-quoted Java string literal.
pub fn escape_java_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Wraps `selector` in a `UiScrollable` over the first scrollable view.
pub fn ui_scrollable(selector: &str) -> String {
    format!(
        "new UiScrollable(new UiSelector().scrollable(true).instance(0)).scrollIntoView({selector}.instance(0));"
    )
}

/// Wraps `selector` in a `UiScrollable` over the scrollable view with the
/// given resource id.
pub fn ui_scrollable_in(selector: &str, resource_id: &str) -> String {
    format!(
        "new UiScrollable(new UiSelector().scrollable(true).resourceId(\"{}\")).scrollIntoView({selector}.instance(0));",
        escape_java_string(resource_id)
    )
}

fn selector_clause(method: &str, text: &str) -> String {
    format!("new UiSelector().{method}(\"{}\")", escape_java_string(text))
}

fn scrollable(selector: &str, resource_id: Option<&str>) -> String {
    match resource_id {
        Some(id) => ui_scrollable_in(selector, id),
        None => ui_scrollable(selector),
    }
}

/// Scroll expression finding an element whose description or text contains
/// `text`.
pub fn scroll_to_text(text: &str, resource_id: Option<&str>) -> String {
    let mut expression = scrollable(&selector_clause("descriptionContains", text), resource_id);
    expression.push_str(&scrollable(&selector_clause("textContains", text), resource_id));
    expression
}

/// Scroll expression finding an element whose description or text equals
/// `text`.
pub fn scroll_to_exact_text(text: &str, resource_id: Option<&str>) -> String {
    let mut expression = scrollable(&selector_clause("description", text), resource_id);
    expression.push_str(&scrollable(&selector_clause("text", text), resource_id));
    expression
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_to_first_scrollable() {
        assert_eq!(
            scroll_to_text("Settings", None),
            "new UiScrollable(new UiSelector().scrollable(true).instance(0))\
             .scrollIntoView(new UiSelector().descriptionContains(\"Settings\").instance(0));\
             new UiScrollable(new UiSelector().scrollable(true).instance(0))\
             .scrollIntoView(new UiSelector().textContains(\"Settings\").instance(0));"
        );
    }

    #[test]
    fn scroll_to_with_resource_id() {
        let expression = scroll_to_text("Settings", Some("android:id/list"));
        assert_eq!(
            expression,
            "new UiScrollable(new UiSelector().scrollable(true).resourceId(\"android:id/list\"))\
             .scrollIntoView(new UiSelector().descriptionContains(\"Settings\").instance(0));\
             new UiScrollable(new UiSelector().scrollable(true).resourceId(\"android:id/list\"))\
             .scrollIntoView(new UiSelector().textContains(\"Settings\").instance(0));"
        );
        assert_eq!(expression.matches("resourceId(\"android:id/list\")").count(), 2);
    }

    #[test]
    fn scroll_to_exact_uses_exact_matchers() {
        let expression = scroll_to_exact_text("Wi-Fi", None);
        assert!(expression.contains("new UiSelector().description(\"Wi-Fi\").instance(0)"));
        assert!(expression.contains("new UiSelector().text(\"Wi-Fi\").instance(0)"));
        assert!(!expression.contains("Contains"));
    }

    #[test]
    fn quotes_and_backslashes_are_escaped() {
        assert_eq!(escape_java_string(r#"say "hi" \o/"#), r#"say \"hi\" \\o/"#);

        let expression = scroll_to_text(r#"5" screen"#, None);
        assert!(expression.contains(r#"descriptionContains("5\" screen")"#));
    }

    #[test]
    fn plain_text_is_unchanged_by_escaping() {
        assert_eq!(escape_java_string("Display & Brightness"), "Display & Brightness");
    }
}
