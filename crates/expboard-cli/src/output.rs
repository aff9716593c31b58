//! Terminal output formatting.

use colored::{ColoredString, Colorize};
use expboard_core::board::{Board, Column};
use expboard_core::experiment::model::{Experiment, ExperimentStatus};
use unicode_width::UnicodeWidthStr;

/// Status text colored by column.
pub fn status_colored(status: ExperimentStatus) -> ColoredString {
    let text = status.as_str();
    match status {
        ExperimentStatus::Todo => text.blue(),
        ExperimentStatus::InProgress => text.yellow(),
        ExperimentStatus::Review => text.magenta(),
        ExperimentStatus::Done => text.green(),
    }
}

/// Print a single experiment.
pub fn print_experiment(exp: &Experiment) {
    println!("{} {}", exp.name.cyan().bold(), format!("(#{})", exp.id).dimmed());
    println!();

    if let Some(desc) = &exp.description {
        println!("{}", desc);
        println!();
    }

    println!("{}: {}", "Status".bold(), status_colored(exp.status));

    let fields = [
        ("Owner", &exp.owner),
        ("Start", &exp.start_date),
        ("End", &exp.end_date),
        ("Revenue signal", &exp.revenue_signal),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{}: {}", label.bold(), value);
        }
    }

    println!();
    println!("{}", format!("created {} · updated {}", exp.created_at, exp.updated_at).dimmed());
}

/// Print experiments as a table.
pub fn print_experiments_table(experiments: &[Experiment]) {
    if experiments.is_empty() {
        println!("{}", "No experiments found.".dimmed());
        return;
    }

    println!(
        "{:<6} {:<30} {:<12} {:<16} {:<20}",
        "ID", "Name", "Status", "Owner", "Revenue signal"
    );
    println!("{}", "─".repeat(86));

    for exp in experiments {
        // Pad before coloring so ANSI codes do not skew the columns
        let status = status_colored_padded(exp.status, 12);
        println!(
            "{:<6} {} {} {} {}",
            exp.id,
            pad_right(&truncate_visual(&exp.name, 30), 30),
            status,
            pad_right(&truncate_visual(exp.owner.as_deref().unwrap_or("-"), 16), 16),
            truncate_visual(exp.revenue_signal.as_deref().unwrap_or("-"), 20)
        );
    }

    println!();
    println!("{} experiment(s) total", experiments.len());
}

fn status_colored_padded(status: ExperimentStatus, width: usize) -> ColoredString {
    let padded = pad_right(status.as_str(), width);
    match status {
        ExperimentStatus::Todo => padded.blue(),
        ExperimentStatus::InProgress => padded.yellow(),
        ExperimentStatus::Review => padded.magenta(),
        ExperimentStatus::Done => padded.green(),
    }
}

/// Get terminal width, defaulting to 80.
fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Pad a plain string to a given visual width (right-padded).
fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}

/// Column header text (plain, for width calculation).
fn column_header_plain(col: &Column, max_width: usize) -> String {
    let full = format!("{} {}", col.label.to_uppercase(), col.experiments.len());
    truncate_visual(&full, max_width)
}

fn column_header_colored(col: &Column, max_width: usize) -> ColoredString {
    let label = column_header_plain(col, max_width);
    match col.status {
        ExperimentStatus::Todo => label.blue().bold(),
        ExperimentStatus::InProgress => label.yellow().bold(),
        ExperimentStatus::Review => label.magenta().bold(),
        ExperimentStatus::Done => label.green().bold(),
    }
}

/// A card cell in the wide layout, padded to exactly `width` columns.
fn format_card(exp: &Experiment, status: ExperimentStatus, width: usize) -> String {
    // 2 chars for marker + 1 space + name
    let name_width = if width > 4 { width - 3 } else { 1 };
    let name = pad_right(&truncate_visual(&exp.name, name_width), name_width);
    match status {
        ExperimentStatus::Todo => format!("{} {}", "· ".dimmed(), name),
        ExperimentStatus::InProgress => format!("{} {}", "▸ ".yellow(), name.yellow()),
        ExperimentStatus::Review => format!("{} {}", "? ".magenta(), name.magenta()),
        ExperimentStatus::Done => format!("{} {}", "✓ ".green(), name.green().dimmed()),
    }
}

/// Print the kanban board.
pub fn print_board(board: &Board) {
    if board.total() == 0 {
        println!(
            "{}",
            "No experiments found. Create one with 'expboard experiment create <name>'.".dimmed()
        );
        return;
    }

    let width = term_width();

    if width < 60 {
        print_board_compact(board);
    } else {
        print_board_wide(board, width);
    }
}

/// Horizontal rule for the wide layout: `left ─── mid ─── right`.
fn print_rule(left: &str, mid: &str, right: &str, num_cols: usize, col_width: usize) {
    print!("{}", left.dimmed());
    for i in 0..num_cols {
        print!("{}", "─".repeat(col_width).dimmed());
        if i < num_cols - 1 {
            print!("{}", mid.dimmed());
        }
    }
    println!("{}", right.dimmed());
}

/// Wide board layout with the four columns side-by-side.
fn print_board_wide(board: &Board, term_w: usize) {
    let num_cols = board.columns.len();
    if num_cols == 0 {
        return;
    }

    // Subtract borders (num_cols + 1 border chars)
    let available = term_w.saturating_sub(num_cols + 1);
    let col_width = (available / num_cols).clamp(12, 35);

    print_rule("┌", "┬", "┐", num_cols, col_width);

    print!("{}", "│".dimmed());
    for (i, col) in board.columns.iter().enumerate() {
        let header_plain = column_header_plain(col, col_width);
        let padding = col_width.saturating_sub(UnicodeWidthStr::width(header_plain.as_str()));
        let left_pad = padding / 2;
        print!(
            "{}{}{}",
            " ".repeat(left_pad),
            column_header_colored(col, col_width),
            " ".repeat(padding - left_pad)
        );
        if i < num_cols - 1 {
            print!("{}", "│".dimmed());
        }
    }
    println!("{}", "│".dimmed());

    print_rule("├", "┼", "┤", num_cols, col_width);

    let max_rows = board
        .columns
        .iter()
        .map(|c| c.experiments.len())
        .max()
        .unwrap_or(0);

    for row in 0..max_rows {
        print!("{}", "│".dimmed());
        for (ci, col) in board.columns.iter().enumerate() {
            match col.experiments.get(row) {
                Some(exp) => print!("{}", format_card(exp, col.status, col_width)),
                None => print!("{}", " ".repeat(col_width)),
            }
            if ci < num_cols - 1 {
                print!("{}", "│".dimmed());
            }
        }
        println!("{}", "│".dimmed());
    }

    print_rule("└", "┴", "┘", num_cols, col_width);

    let total = board.total();
    let done = board
        .column(ExperimentStatus::Done)
        .map(|c| c.experiments.len())
        .unwrap_or(0);
    println!(
        " {} {} experiments {} {} done ({}%)",
        "■".cyan(),
        total.to_string().bold(),
        "·".dimmed(),
        done.to_string().green(),
        (done * 100) / total
    );
}

/// Compact vertical board layout for narrow terminals.
fn print_board_compact(board: &Board) {
    println!("{}", " EXPERIMENT BOARD ".on_blue().white().bold());
    println!();

    for col in &board.columns {
        if col.experiments.is_empty() {
            continue;
        }

        println!(" {} {}", "▸".dimmed(), column_header_colored(col, 30));

        for exp in &col.experiments {
            let owner = exp
                .owner
                .as_deref()
                .map(|o| format!("@{}", o))
                .unwrap_or_default();
            println!(
                "   {} {} {}",
                format!("#{}", exp.id).dimmed(),
                exp.name,
                owner.dimmed()
            );
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_right() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_right("abcdef", 4), "abcdef");
        assert_eq!(UnicodeWidthStr::width(pad_right("日本", 6).as_str()), 6);
    }

    #[test]
    fn test_truncate_visual() {
        assert_eq!(truncate_visual("short", 10), "short");
        assert_eq!(truncate_visual("a long experiment name", 10), "a long e..");
        assert_eq!(truncate_visual("abcdef", 3), "...");
        assert!(UnicodeWidthStr::width(truncate_visual("日本語のテキスト", 7).as_str()) <= 7);
    }

    #[test]
    fn test_column_header_counts() {
        let board = Board::empty();
        let col = board.column(ExperimentStatus::InProgress).unwrap();
        assert_eq!(column_header_plain(col, 30), "IN PROGRESS 0");
        assert_eq!(column_header_plain(col, 8), "IN PRO..");
    }
}
