use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hanna", version)]
#[command(about = "Manage named, reusable code snippets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logging to stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the snippet table
    Install,

    /// Drop the snippet table and every snippet in it
    Uninstall,

    /// Create a new hanna code (code is read from stdin when --code is omitted)
    #[command(alias = "n")]
    Create {
        /// Name used in tags, e.g. [hanna name="greeting"]
        name: String,

        /// Kind of code: HTML, JS or PHP (or 0, 1, 2)
        #[arg(short = 't', long = "type", default_value = "HTML")]
        kind: String,

        /// Output is not consumed by the tag
        #[arg(long)]
        not_consuming: bool,

        /// Default attribute, repeatable (e.g. -a first_name=Karena)
        #[arg(short = 'a', long = "attr")]
        attrs: Vec<String>,

        /// Code body
        #[arg(short, long)]
        code: Option<String>,
    },

    /// List hanna codes
    #[command(alias = "ls")]
    List {
        /// Sort key: name, -name, modified, -modified, accessed, -accessed
        #[arg(short, long, allow_hyphen_values = true)]
        sort: Option<String>,
    },

    /// View one or more hanna codes
    #[command(alias = "v")]
    View {
        /// Ids or names
        #[arg(required = true, num_args = 1..)]
        keys: Vec<String>,
    },

    /// Change an existing hanna code
    #[command(alias = "u")]
    Update {
        /// Id or name
        key: String,

        /// New name
        #[arg(long)]
        rename: Option<String>,

        /// New kind: HTML, JS or PHP (keeps the consuming flag)
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// Mark output as consumed
        #[arg(long, conflicts_with = "not_consuming")]
        consuming: bool,

        /// Mark output as not consumed
        #[arg(long)]
        not_consuming: bool,

        /// Replace default attributes, repeatable (e.g. -a color=red)
        #[arg(short = 'a', long = "attr")]
        attrs: Vec<String>,

        /// Remove all default attributes
        #[arg(long, conflicts_with = "attrs")]
        clear_attrs: bool,

        /// New code body
        #[arg(short, long)]
        code: Option<String>,

        /// Raw field assignment, repeatable (e.g. --set type=6)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        fields: Vec<String>,
    },

    /// Mark one or more hanna codes as accessed now
    Touch {
        /// Ids or names
        #[arg(required = true, num_args = 1..)]
        keys: Vec<String>,
    },

    /// Delete one or more hanna codes
    #[command(alias = "rm")]
    Delete {
        /// Ids or names
        #[arg(required = true, num_args = 1..)]
        keys: Vec<String>,
    },

    /// Print export segments (all hanna codes when no keys are given)
    Export {
        /// Ids or names
        keys: Vec<String>,
    },

    /// Import export segments from a file (stdin when omitted)
    Import {
        file: Option<PathBuf>,
    },

    /// Resolve a hanna code and its attributes for a call site
    Prepare {
        /// Name of the hanna code
        name: String,

        /// Call-site attributes (e.g. color=blue)
        pairs: Vec<String>,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (e.g., default_sort)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        #[arg(allow_hyphen_values = true)]
        value: Option<String>,
    },
}
