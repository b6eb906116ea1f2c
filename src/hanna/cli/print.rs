use chrono::{DateTime, Utc};
use colored::Colorize;
use hanna::commands::{CmdMessage, MessageLevel, Prepared};
use hanna::config::{HannaConfig, CONFIG_KEYS};
use hanna::model::Snippet;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const ID_WIDTH: usize = 6;
const KIND_WIDTH: usize = 6;
const NOT_CONSUMING_MARKER: &str = "⤳";

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub fn print_snippets(snippets: &[Snippet]) {
    if snippets.is_empty() {
        println!("No hanna codes found.");
        return;
    }

    for snippet in snippets {
        let id_str = format!("{:>width$}. ", snippet.id, width = ID_WIDTH - 2);
        let kind_str = format!("{:<width$}", snippet.type_name(), width = KIND_WIDTH);
        let marker = if snippet.is_not_consuming() {
            format!("{} ", NOT_CONSUMING_MARKER)
        } else {
            "  ".to_string()
        };

        let preview: String = snippet
            .code
            .chars()
            .take(50)
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        let name_preview = if preview.trim().is_empty() {
            snippet.name.clone()
        } else {
            format!("{} {}", snippet.name, preview.trim())
        };

        let fixed_width = id_str.width() + kind_str.width() + marker.width() + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let display = truncate_to_width(&name_preview, available);
        let padding = available.saturating_sub(display.width());

        let kind_colored = if snippet.is_program() {
            kind_str.magenta()
        } else if snippet.is_script() {
            kind_str.cyan()
        } else {
            kind_str.normal()
        };

        println!(
            "{}{}{}{}{}{}",
            id_str.yellow(),
            kind_colored,
            display,
            " ".repeat(padding),
            marker,
            format_time_ago(snippet.modified).dimmed()
        );
    }
}

pub fn print_full_snippets(snippets: &[Snippet]) {
    for (i, snippet) in snippets.iter().enumerate() {
        if i > 0 {
            println!("\n================================\n");
        }
        println!(
            "{} {} {}",
            format!("{}.", snippet.id).yellow(),
            snippet.name.bold(),
            format!("[{}]", type_label(snippet)).dimmed()
        );
        for (name, value) in snippet.attrs().iter() {
            if value.is_empty() {
                println!("  {}", name.cyan());
            } else {
                println!("  {}={}", name.cyan(), value);
            }
        }
        println!("--------------------------------");
        println!("{}", snippet.code);
    }
}

pub fn print_prepared(prepared: &Prepared) {
    println!(
        "{} {}",
        prepared.snippet.name.bold(),
        format!("[{}]", type_label(&prepared.snippet)).dimmed()
    );
    for (name, value) in prepared.attrs.iter() {
        println!("  {}={}", name.cyan(), value);
    }
    println!("--------------------------------");
    println!("{}", prepared.snippet.code);
}

/// Segments go to stdout undecorated so they can be piped into `import`.
pub fn print_exported(segments: &[String]) {
    for segment in segments {
        println!("{}", segment);
    }
}

pub fn print_config(config: &HannaConfig) {
    for key in CONFIG_KEYS {
        let value = config.get(key).unwrap_or_default();
        println!("{} = {}", key.cyan(), value);
    }
}

fn type_label(snippet: &Snippet) -> String {
    if snippet.is_not_consuming() {
        format!("{}, not consuming", snippet.type_name())
    } else {
        snippet.type_name().to_string()
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: i64) -> String {
    let time_str = match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(at) if timestamp > 0 => {
            let duration = Utc::now().signed_duration_since(at);
            Formatter::new().convert(duration.to_std().unwrap_or_default())
        }
        _ => "never".to_string(),
    };
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
