use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("LIBRIS_GIT_HASH");
    const COMMIT_DATE: &str = env!("LIBRIS_COMMIT_DATE");
    const IS_RELEASE: &str = env!("LIBRIS_IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "libris",
    bin_name = "libris",
    version = get_version(),
    disable_help_flag = true,
    disable_help_subcommand = true
)]
#[command(about = "A small lending library kept in plain text files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to $LIBRIS_HOME, then the platform data dir)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub home: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Print help
    #[arg(short, long, global = true)]
    pub help: bool,
}

/// Command group definitions for help output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Catalog,
    Lending,
    Misc,
}

impl CommandGroup {
    pub fn heading(&self) -> &'static str {
        match self {
            CommandGroup::Catalog => "Catalog Commands:",
            CommandGroup::Lending => "Lending Commands:",
            CommandGroup::Misc => "Miscellaneous:",
        }
    }

    pub fn for_command(name: &str) -> Option<Self> {
        match name {
            "add" | "delete" | "edit" | "list" | "find" => Some(CommandGroup::Catalog),
            "borrow" | "return" | "extend" | "borrowers" => Some(CommandGroup::Lending),
            "doctor" | "paths" | "config" | "help" => Some(CommandGroup::Misc),
            _ => None,
        }
    }

    pub fn all() -> &'static [CommandGroup] {
        &[
            CommandGroup::Catalog,
            CommandGroup::Lending,
            CommandGroup::Misc,
        ]
    }
}

pub fn get_grouped_help() -> String {
    let mut cmd = Cli::command();
    cmd.build();
    let version = cmd.get_version().unwrap_or("unknown");

    let mut output = String::new();
    output.push_str(&format!("libris {version}\n"));
    output.push_str("A small lending library kept in plain text files\n");
    output.push('\n');
    output.push_str("Usage: libris [OPTIONS] [COMMAND]\n");
    output.push_str("       With no command, lists the inventory.\n");

    for group in CommandGroup::all() {
        let rows: Vec<(String, String)> = cmd
            .get_subcommands()
            .filter(|sc| {
                !sc.is_hide_set() && CommandGroup::for_command(sc.get_name()) == Some(*group)
            })
            .map(|sc| {
                let names: Vec<&str> = std::iter::once(sc.get_name())
                    .chain(sc.get_all_aliases())
                    .collect();
                let about = sc.get_about().map(|s| s.to_string()).unwrap_or_default();
                (names.join(", "), about)
            })
            .collect();

        if !rows.is_empty() {
            output.push('\n');
            output.push_str(&format!("{}\n", group.heading()));
            for (names, about) in rows {
                output.push_str(&format!("  {:<14} {}\n", names, about));
            }
        }
    }

    output.push('\n');
    output.push_str("Options:\n");
    for arg in cmd.get_arguments() {
        if let Some(line) = option_line(arg) {
            output.push_str(&line);
        }
    }

    output.push('\n');
    output.push_str("Items are picked by list position or by title, e.g. `libris borrow 3 --by Ann`.\n");
    output.push_str("Run `libris help <command>` for the arguments of one command.\n");

    output
}

/// One `Options:` row, from the argument's own clap definition.
fn option_line(arg: &clap::Arg) -> Option<String> {
    let long = arg.get_long()?;
    let short = arg
        .get_short()
        .map(|c| format!("-{c}, "))
        .unwrap_or_else(|| "    ".to_string());
    let value = if arg.get_action().takes_values() {
        arg.get_value_names()
            .and_then(|names| names.first())
            .map(|name| format!(" <{name}>"))
            .unwrap_or_default()
    } else {
        String::new()
    };
    let flag = format!("{short}--{long}{value}");
    let help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
    Some(format!("  {:<18} {}\n", flag, help))
}

pub fn print_grouped_help() {
    print!("{}", get_grouped_help());
}

/// Prints help for a specific subcommand using clap's built-in rendering
pub fn print_subcommand_help(command: &Option<Commands>) {
    let name = match command {
        Some(command) => command.name(),
        None => {
            print_grouped_help();
            return;
        }
    };
    print_help_for_command(name);
}

pub fn print_help_for_command(name: &str) {
    let mut cmd = Cli::command();

    for subcmd in cmd.get_subcommands_mut() {
        if subcmd.get_name() == name {
            let help = subcmd.render_help();
            print!("{}", help);
            return;
        }
    }

    eprintln!("Unknown command: {}", name);
    eprintln!();
    print_grouped_help();
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Catalog(CatalogCommands),

    #[command(flatten)]
    Lending(LendingCommands),

    #[command(flatten)]
    Misc(MiscCommands),
}

impl Commands {
    /// The subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Catalog(c) => match c {
                CatalogCommands::Add { .. } => "add",
                CatalogCommands::Delete { .. } => "delete",
                CatalogCommands::Edit { .. } => "edit",
                CatalogCommands::List { .. } => "list",
                CatalogCommands::Find { .. } => "find",
            },
            Commands::Lending(c) => match c {
                LendingCommands::Borrow { .. } => "borrow",
                LendingCommands::Return { .. } => "return",
                LendingCommands::Extend { .. } => "extend",
                LendingCommands::Borrowers => "borrowers",
            },
            Commands::Misc(c) => match c {
                MiscCommands::Doctor => "doctor",
                MiscCommands::Paths => "paths",
                MiscCommands::Config { .. } => "config",
                MiscCommands::Help { .. } => "help",
            },
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// Add copies of a title
    #[command(alias = "a", display_order = 1)]
    Add {
        /// Number of copies
        #[arg(short = 'n', long, default_value_t = 1)]
        quantity: u32,

        /// Title words (joined with spaces)
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        title: Vec<String>,
    },

    /// Remove a title that has no copies on loan
    #[command(alias = "rm", display_order = 2)]
    Delete {
        /// Position (e.g. 3) or title
        #[arg(required = true, num_args = 1..)]
        item: Vec<String>,
    },

    /// Rename the title at a position
    #[command(alias = "e", display_order = 3)]
    Edit {
        /// Position as shown by `list`
        position: usize,

        /// New title words
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        title: Vec<String>,
    },

    /// List the inventory
    #[command(alias = "ls", display_order = 4)]
    List {
        /// Sort order: insertion, alpha or due
        #[arg(short, long, default_value = "insertion")]
        sort: String,
    },

    /// Search titles
    #[command(alias = "f", display_order = 5)]
    Find {
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum LendingCommands {
    /// Lend a copy
    #[command(alias = "b", display_order = 10)]
    Borrow {
        /// Borrower name
        #[arg(long = "by", value_name = "NAME")]
        borrower: String,

        /// Position (e.g. 3) or title
        #[arg(required = true, num_args = 1..)]
        item: Vec<String>,
    },

    /// Take a copy back
    #[command(alias = "r", display_order = 11)]
    Return {
        /// Borrower name
        #[arg(long = "by", value_name = "NAME")]
        borrower: String,

        /// Position (e.g. 3) or title
        #[arg(required = true, num_args = 1..)]
        item: Vec<String>,
    },

    /// Push back the due date of every loan on a title
    #[command(display_order = 12)]
    Extend {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// List borrowers and what they hold
    #[command(display_order = 13)]
    Borrowers,
}

#[derive(Subcommand, Debug)]
pub enum MiscCommands {
    /// Report what was repaired when the stores were loaded
    #[command(display_order = 30)]
    Doctor,

    /// Print the data directory and store locations
    #[command(display_order = 31)]
    Paths,

    /// Get or set configuration
    #[command(display_order = 32)]
    Config {
        /// Configuration key (e.g., loan_days)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Print help for libris or a subcommand
    #[command(display_order = 33)]
    Help {
        /// Subcommand to get help for
        command: Option<String>,
    },
}
