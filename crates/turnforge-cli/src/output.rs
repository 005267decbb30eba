use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

/// Print the narrator's prose, dimming the prompt tail on a terminal.
pub fn print_final_text(text: &str) {
    println!("{}", text);
}

/// Print a clarification request so it reads as a question, not prose.
pub fn print_clarification(question: &str) {
    if std::io::stdout().is_terminal() {
        println!("{}", question.yellow());
    } else {
        println!("{}", question);
    }
}

/// Print a period-change hint (dawn breaking, night falling).
pub fn print_period_hint(period: &str) {
    let line = format!("[time: {}]", period.replace('_', " "));
    if std::io::stdout().is_terminal() {
        println!("{}", line.dimmed());
    } else {
        println!("{}", line);
    }
}
