/// Title-case an ingredient name for display: "olive oil" -> "Olive Oil".
/// The API returns ingredient names lowercased; every word is capitalized
/// the way the suggestion list and detail view present them.
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Capitalize the first character of a string, leaving the rest unchanged.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a cook time in minutes for display
pub fn format_cook_time(minutes: Option<u32>) -> String {
    match minutes {
        Some(m) => format!("{} mins", m),
        None => "–".to_string(),
    }
}

/// Format an ingredient amount in grams, rounded to the nearest whole gram
pub fn format_grams(amount: f64) -> String {
    format!("{}g", amount.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("egg"), "Egg");
        assert_eq!(title_case("flour"), "Flour");
        assert_eq!(title_case("olive oil"), "Olive Oil");
        assert_eq!(title_case("all-purpose flour"), "All-purpose Flour");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("beef"), "Beef");
        assert_eq!(capitalize_first("Beef"), "Beef");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_format_cook_time() {
        assert_eq!(format_cook_time(Some(20)), "20 mins");
        assert_eq!(format_cook_time(None), "–");
    }

    #[test]
    fn test_format_grams() {
        assert_eq!(format_grams(150.0), "150g");
        assert_eq!(format_grams(66.6), "67g");
        assert_eq!(format_grams(66.4), "66g");
    }
}
