//! Interactive stdin commands.

use portal_core::{ExportFormat, FilterField, FormField, JobId, JobKind, Msg, Page, ReportKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Send(Msg),
    Help,
    Quit,
    /// Store a bearer token.
    Login(String),
    Logout,
    /// Carries the text to show the user.
    Invalid(String),
}

pub fn parse(page: Page, line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "" => return Command::Help,
        "quit" | "exit" | "q" => return Command::Quit,
        "help" | "?" => return Command::Help,
        "ok" | "dismiss" => return Command::Send(Msg::AlertDismissed),
        "login" if !rest.is_empty() => return Command::Login(rest.to_string()),
        "login" => return Command::Invalid("usage: login <token>".to_string()),
        "logout" => return Command::Logout,
        _ => {}
    }

    match page {
        Page::Dashboard => Command::Invalid(format!("unknown command: {word}")),
        Page::Jobs => parse_jobs(word, rest),
        Page::ItemsReport => parse_report(ReportKind::ItemsSold, word, rest),
        Page::SalesSummary => parse_report(ReportKind::SalesSummary, word, rest),
        Page::Lookup => parse_lookup(word, rest),
    }
}

fn parse_jobs(word: &str, rest: &str) -> Command {
    match word {
        "run" if !rest.is_empty() => Command::Send(Msg::RunJobClicked(JobKind::parse(rest))),
        "run" => Command::Invalid("usage: run <job type>".to_string()),
        "logs" if !rest.is_empty() => Command::Send(Msg::ViewLogsClicked(JobId::new(rest))),
        "logs" => Command::Invalid("usage: logs <job id>".to_string()),
        _ => Command::Invalid(format!("unknown command: {word}")),
    }
}

fn parse_report(kind: ReportKind, word: &str, rest: &str) -> Command {
    let filter = |field| {
        Command::Send(Msg::FilterChanged {
            kind,
            field,
            value: rest.to_string(),
        })
    };
    match word {
        "from" | "de" => filter(FilterField::From),
        "to" | "ate" => filter(FilterField::To),
        "top" if kind == ReportKind::ItemsSold => filter(FilterField::Top),
        "search" => Command::Send(Msg::SearchClicked(kind)),
        "export" => match ExportFormat::parse(rest) {
            Some(format) => Command::Send(Msg::ExportClicked { kind, format }),
            None => Command::Invalid(format!("unknown export format: {rest}")),
        },
        _ => Command::Invalid(format!("unknown command: {word}")),
    }
}

fn parse_lookup(word: &str, rest: &str) -> Command {
    match word {
        "cnpj" => Command::Send(Msg::IdentifierChanged(rest.to_string())),
        "lookup" => Command::Send(Msg::LookupClicked),
        "set" => {
            let (name, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            match FormField::parse(name) {
                Some(field) => Command::Send(Msg::FormFieldEdited {
                    field,
                    value: value.trim().to_string(),
                }),
                None => Command::Invalid(format!("unknown field: {name}")),
            }
        }
        _ => Command::Invalid(format!("unknown command: {word}")),
    }
}

pub fn help(page: Page) -> String {
    let page_commands = match page {
        Page::Dashboard => "",
        Page::Jobs => "run <sankhya_demo|full_load_demo>, logs <job id>, ",
        Page::ItemsReport => {
            "from <yyyy-mm-dd>, to <yyyy-mm-dd>, top <n>, search, export <csv|xlsx>, "
        }
        Page::SalesSummary => {
            "from <yyyy-mm-dd>, to <yyyy-mm-dd>, search, export <csv|xlsx|pdf>, "
        }
        Page::Lookup => "cnpj <value>, lookup, set <field> <value>, ",
    };
    format!("commands: {page_commands}login <token>, logout, ok, quit")
}
