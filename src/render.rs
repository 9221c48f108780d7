use crossterm::style::{Color, Stylize};

use crate::models::AliasRecord;

const EXAMPLE_ROWS: [(&str, &str, &str); 7] = [
    ("c,conn,connect ALIAS", "Connect to a configured alias", "conn server1"),
    ("a,add ALIAS", "Add an alias to use for connections", "add server1"),
    ("e,edit ALIAS", "Edit an already configured alias", "edit server1"),
    ("d,del,delete,rm ALIAS", "Remove an alias from the connection list", "del server1"),
    ("l,ls,list", "List all the configured alias connections", "ls"),
    ("q,exit,quit", "Exit the program", "exit"),
    ("h,help", "Display this help screen", "help"),
];

/// Turns structured data into terminal text. Color is decided once, up front.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.with(Color::Magenta).underlined().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn banner(&self, version: &str) -> String {
        let art = [
            "  ____ ____ _  _    ____ _    _ ____ ____",
            "  [__  [__  |__|    |__| |    | |__| [__ ",
            "  ___] ___] |  |    |  | |___ | |  | ___]",
        ];
        let mut out = String::new();
        for line in art {
            out.push_str(&self.paint(line, Color::Green));
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.paint(&format!("  v{}", version), Color::Blue));
        out.push('\n');
        out.push_str(&"_".repeat(52));
        out.push('\n');
        out
    }

    pub fn help(&self, program: &str) -> String {
        let mut out = format!("\n  {}\n", self.heading("COMMANDS:"));
        for (usage, what, example) in EXAMPLE_ROWS {
            out.push_str(&format!(
                "  {}{}- {}\n",
                self.bold(usage),
                " ".repeat(24usize.saturating_sub(usage.len())),
                what
            ));
            out.push_str(&format!(
                "{:28}+ Example usage: >> {}\n",
                "",
                self.paint(example, Color::Green)
            ));
        }
        out.push_str(&format!("\n  {}\n", self.heading("Quick connect to an alias:")));
        out.push_str(&format!("  Example usage: {} server1\n", program));
        out
    }

    /// Help shown for `-h`/`--help` on the command line.
    pub fn usage(&self, program: &str) -> String {
        format!(
            "\n  Run {} to run these commands within the program.\n{}",
            program,
            self.help(program)
        )
    }

    /// Numbered table of aliases, or `None` when there is nothing to show.
    pub fn alias_table(&self, records: &[AliasRecord]) -> Option<String> {
        if records.is_empty() {
            return None;
        }

        let mut out = format!(
            "\n{}\n",
            self.bold("      #:    ALIAS:       TYPE:        SERVER:")
        );
        for (i, record) in records.iter().enumerate() {
            let number = format!("[{}]", i + 1);
            let alias = record.alias.to_uppercase();
            let kind = format!("[{}]", self.paint(record.kind(), Color::Blue));
            let kind_pad = 11usize.saturating_sub(record.kind().len() + 2);
            let server = format!("{}:{}", record.hostname, record.port);
            out.push_str(&format!(
                "   {:>5}    {}{} {}{} [{}]\n",
                number,
                self.paint(&alias, Color::Yellow),
                " ".repeat(12usize.saturating_sub(alias.chars().count())),
                kind,
                " ".repeat(kind_pad),
                self.paint(&server, Color::Green),
            ));
        }
        Some(out)
    }

    pub fn error(&self, message: &str) -> String {
        self.paint(message, Color::Red)
    }

    pub fn notice(&self, message: &str) -> String {
        self.paint(message, Color::Yellow)
    }

    pub fn success(&self, message: &str) -> String {
        self.paint(message, Color::Green)
    }

    pub fn prompt(&self) -> String {
        if self.color {
            ">> ".green().bold().to_string()
        } else {
            ">> ".to_string()
        }
    }

    pub fn farewell(&self) -> String {
        self.success("<< Goodbye!")
    }
}
