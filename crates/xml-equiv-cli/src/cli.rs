use clap::Parser;
use xml_equivalence::{Setting, Settings};

#[derive(Parser, Debug)]
#[command(
    name = "xml-equiv",
    about = "Check whether two XML documents are equivalent",
    version
)]
pub struct Cli {
    /// Expected document: a file path or a file:/http(s): URI
    pub expected: String,

    /// Actual document: a file path or a file:/http(s): URI
    pub actual: String,

    /// Enable a setting, e.g. IGNORE_COMMENTS (repeatable)
    #[arg(long = "enable", value_name = "SETTING")]
    pub enable: Vec<Setting>,

    /// Disable a setting (repeatable)
    #[arg(long = "disable", value_name = "SETTING")]
    pub disable: Vec<Setting>,

    /// Start from no settings instead of the lax defaults
    #[arg(long)]
    pub strict: bool,

    /// Only require the documents to be similar
    #[arg(long)]
    pub similar: bool,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// The settings selected by the flags; disabling wins over enabling
    pub fn settings(&self) -> Settings {
        let mut settings = if self.strict {
            Settings::empty()
        } else {
            Settings::defaults()
        };
        settings = settings.with(&self.enable);
        if self.similar {
            settings = settings.with(&[Setting::OnlyCompareSimilarity]);
        }
        settings.without(&self.disable)
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
