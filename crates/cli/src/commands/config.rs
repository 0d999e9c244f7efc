use parley_core::config::{AppConfig, LoadOptions};

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let mut lines =
        vec!["effective config (source precedence: overrides > env > file > default):".to_string()];

    lines.push(render_line("data.dir", &config.data.dir.display().to_string()));
    lines.push(render_line(
        "conversation.max_rounds",
        &config.conversation.max_rounds.to_string(),
    ));
    lines.push(render_line(
        "conversation.verification_max_attempts",
        &config.conversation.verification_max_attempts.to_string(),
    ));
    lines.push(render_line(
        "conversation.cancel_keywords",
        &config.conversation.cancel_keywords.join(", "),
    ));
    lines.push(render_line("llm.model", &config.llm.model));
    lines.push(render_line("llm.api_key", config.display_api_key()));
    lines.push(render_line("logging.level", &config.logging.level));
    lines.push(render_line("logging.format", &format!("{:?}", config.logging.format)));

    lines.join("\n")
}

fn render_line(field: &str, value: &str) -> String {
    format!("  {field} = {value}")
}

#[cfg(test)]
mod tests {
    use super::render_line;

    #[test]
    fn rendered_lines_are_indented_key_value_pairs() {
        assert_eq!(render_line("llm.model", "gemini-2.0-flash"), "  llm.model = gemini-2.0-flash");
    }
}
